//! Timestamp codec for cue timing lines.
//!
//! Parsing is deliberately lossy: the result is a whole number of seconds and
//! any fractional part is truncated, so `01:02:03.400` reads as `3723`.

use nom::character::complete::{digit1, space0};
use nom::sequence::preceded;
use nom::IResult;

/// Parses `[[HH:]MM:]SS[.mmm]` into whole seconds.
///
/// Never fails. Fields that do not start with a number count as zero, and
/// missing leading fields default to zero.
pub fn parse_timestamp(text: &str) -> u64 {
    let mut halves = text.splitn(2, '.');
    let clock = halves.next().unwrap_or("");
    let millis = halves.next().map_or(0, leading_number);

    let mut fields = clock.rsplit(':');
    let seconds = fields.next().map_or(0, leading_number);
    let minutes = fields.next().map_or(0, leading_number);
    let hours = fields.next().map_or(0, leading_number);

    let total_millis = hours
        .saturating_mul(3_600_000)
        .saturating_add(minutes.saturating_mul(60_000))
        .saturating_add(seconds.saturating_mul(1000))
        .saturating_add(millis);
    total_millis / 1000
}

/// Formats whole seconds as `HH:MM:SS.000`.
pub fn format_timestamp(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let seconds = seconds % 60;
    format!("{:02}:{:02}:{:02}.000", hours, minutes, seconds)
}

// Reads the leading run of digits, like a lenient integer parse would.
fn leading_number(field: &str) -> u64 {
    let digits: IResult<&str, &str> = preceded(space0, digit1)(field);
    match digits {
        Ok((_, digits)) => digits.parse().unwrap_or(u64::MAX),
        Err(_) => 0,
    }
}
