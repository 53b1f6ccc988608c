use crate::sprite::StyleDescriptor;

use serde::Serialize;

/// One time range of the scrub bar and the thumbnail shown for it.
///
/// `end` is exclusive: a time `t` belongs to the cue when `start <= t < end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CueDescriptor {
    pub start: u64,
    pub end: u64,
    pub style: StyleDescriptor,
}

impl CueDescriptor {
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start as f64 && time < self.end as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The first line is not a timing line, e.g. the `WEBVTT` header or a `NOTE`.
    NotACue,
    MissingImage,
    /// The `#xywh=` fragment could not be read as four numbers.
    MalformedRegion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedBlock {
    pub block: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    pub cues: Vec<CueDescriptor>,
    pub skipped: Vec<SkippedBlock>,
}

impl ParseOutcome {
    pub fn skipped_because(&self, reason: SkipReason) -> usize {
        self.skipped.iter().filter(|s| s.reason == reason).count()
    }
}
