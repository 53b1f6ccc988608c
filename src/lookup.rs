//! Finding the cue under the playhead and placing the thumbnail on the bar.

use crate::cue::CueDescriptor;
use crate::sprite::StyleDescriptor;

use std::collections::HashSet;

use tracing::debug;

/// Remembers which images have already had a load started.
///
/// Entries are never evicted.
pub trait PreloadCache {
    fn is_seen(&self, url: &str) -> bool;
    fn mark_seen(&mut self, url: &str);
}

impl PreloadCache for HashSet<String> {
    fn is_seen(&self, url: &str) -> bool {
        self.contains(url)
    }

    fn mark_seen(&mut self, url: &str) {
        self.insert(url.to_string());
    }
}

pub struct ImageCache<F> {
    seen: HashSet<String>,
    loader: F,
}

impl<F: FnMut(&str)> ImageCache<F> {
    pub fn new(loader: F) -> Self {
        Self {
            seen: HashSet::new(),
            loader,
        }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl<F: FnMut(&str)> PreloadCache for ImageCache<F> {
    fn is_seen(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    fn mark_seen(&mut self, url: &str) {
        if self.seen.insert(url.to_string()) {
            debug!(url, "preloading thumbnail image");
            (self.loader)(url);
        }
    }
}

/// Returns the index of the first cue, in source order, that contains `time`.
///
/// Marks the cue's sprite sheet in `cache` the first time it is returned.
pub fn active_cue<C: PreloadCache + ?Sized>(
    cues: &[CueDescriptor],
    time: f64,
    cache: &mut C,
) -> Option<usize> {
    let idx = cues.iter().position(|cue| cue.contains(time))?;
    if let Some(url) = cues[idx].style.preload_url() {
        if !cache.is_seen(url) {
            cache.mark_seen(url);
        }
    }
    Some(idx)
}

pub fn style_for_time<'a, C: PreloadCache + ?Sized>(
    cues: &'a [CueDescriptor],
    time: f64,
    cache: &mut C,
) -> Option<&'a StyleDescriptor> {
    active_cue(cues, time, cache).map(|idx| &cues[idx].style)
}

/// Horizontal offset of the thumbnail for a pointer at `percent` of the bar.
///
/// The thumbnail is centred on the pointer unless that would push it past
/// either end of the bar, in which case it is pinned to that end.
pub fn thumbnail_offset(percent: f64, bar_width: f64, thumbnail_width: u32) -> f64 {
    let x_pos = percent * bar_width;
    let half = f64::from(thumbnail_width / 2);
    let margin_left = x_pos - half;
    let margin_right = bar_width - (x_pos + half);

    if margin_left > 0.0 && margin_right > 0.0 {
        x_pos - half
    } else if margin_left <= 0.0 {
        0.0
    } else {
        bar_width - f64::from(thumbnail_width)
    }
}

/// Offset for `style`, using `fallback_width` when the style sets no width.
pub fn offset_for_style(
    style: &StyleDescriptor,
    percent: f64,
    bar_width: f64,
    fallback_width: u32,
) -> f64 {
    let width = style.width().unwrap_or(fallback_width);
    thumbnail_offset(percent, bar_width, width)
}
