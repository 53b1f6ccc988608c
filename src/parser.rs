use crate::cue::{CueDescriptor, ParseOutcome, SkipReason, SkippedBlock};
use crate::error::{Result, ThumbnailError};
use crate::sprite::{SpriteError, SpriteResolver};
use crate::timestamp::parse_timestamp;

use nom::bytes::complete::tag;
use nom::character::complete::{char, digit1, space0};
use nom::combinator::{opt, recognize};
use nom::sequence::{preceded, terminated, tuple};
use nom::IResult;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingImagePolicy {
    Skip,
    Error,
}

impl Default for MissingImagePolicy {
    fn default() -> Self {
        MissingImagePolicy::Skip
    }
}

pub struct Parser {
    policy: MissingImagePolicy,
    blank_lines: Regex,
    sprites: SpriteResolver,
}

impl Parser {
    pub fn new(policy: MissingImagePolicy) -> Result<Self> {
        Ok(Self {
            policy,
            blank_lines: Regex::new(r"\r?\n(?:[ \t]*\r?\n)+")?,
            sprites: SpriteResolver::new()?,
        })
    }

    /// Parses a thumbnail cue file.
    ///
    /// `cue_source` is the address the text was loaded from and `page_base`
    /// the directory of the hosting page; together they decide how relative
    /// image references are resolved. Cues keep their source order and are
    /// neither merged nor checked for overlap.
    pub fn parse(&self, input: &str, cue_source: &str, page_base: &str) -> Result<ParseOutcome> {
        let (input, _) = optional_bom(input).unwrap_or((input, None));
        let input = input.trim_start_matches(|c: char| c == '\r' || c == '\n');

        let mut outcome = ParseOutcome::default();
        let blocks = self
            .blank_lines
            .split(input)
            .filter(|block| !block.trim().is_empty());
        for (idx, block) in blocks.enumerate() {
            match self.cue(idx, block, cue_source, page_base)? {
                Ok(cue) => outcome.cues.push(cue),
                Err(reason) => {
                    debug!(block = idx, ?reason, "skipping cue block");
                    outcome.skipped.push(SkippedBlock { block: idx, reason });
                }
            }
        }
        Ok(outcome)
    }

    fn cue(
        &self,
        idx: usize,
        block: &str,
        cue_source: &str,
        page_base: &str,
    ) -> Result<std::result::Result<CueDescriptor, SkipReason>> {
        let mut lines = block.lines();
        let (start, end) = match lines.next().map(timing_line) {
            Some(Ok((_, times))) => times,
            _ => return Ok(Err(SkipReason::NotACue)),
        };

        let image_ref = match lines.next().map(str::trim) {
            Some(line) if !line.is_empty() => line,
            _ => {
                return match self.policy {
                    MissingImagePolicy::Skip => Ok(Err(SkipReason::MissingImage)),
                    MissingImagePolicy::Error => Err(ThumbnailError::MissingImage { block: idx }),
                }
            }
        };

        match self.sprites.resolve_style(image_ref, cue_source, page_base) {
            Ok(style) => Ok(Ok(CueDescriptor {
                start: parse_timestamp(start),
                end: parse_timestamp(end),
                style,
            })),
            Err(SpriteError::MalformedRegion(reference)) => match self.policy {
                MissingImagePolicy::Skip => Ok(Err(SkipReason::MalformedRegion)),
                MissingImagePolicy::Error => Err(ThumbnailError::MalformedRegion {
                    block: idx,
                    reference,
                }),
            },
        }
    }
}

fn optional_bom(input: &str) -> IResult<&str, Option<&str>> {
    opt(tag("\u{FEFF}"))(input)
}

/// `<start> --> <end>`, also accepting `--!>`. Anything after the end time is ignored.
fn timing_line(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, _) = space0(input)?;
    let (input, start) = clock(input)?;
    let (input, _) = separator(input)?;
    let (input, end) = clock(input)?;
    Ok((input, (start, end)))
}

fn separator(input: &str) -> IResult<&str, &str> {
    recognize(tuple((space0, tag("--"), opt(char('!')), char('>'), space0)))(input)
}

fn clock(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        opt(terminated(digit1, char(':'))),
        opt(terminated(digit1, char(':'))),
        digit1,
        opt(preceded(char('.'), digit1)),
    )))(input)
}
