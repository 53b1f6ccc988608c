//! Scrub-bar thumbnail previews driven by a WebVTT thumbnail cue file.
//!
//! A cue file maps time ranges to images, usually tiles of a sprite sheet:
//!
//! ```text
//! WEBVTT
//!
//! 00:00.000 --> 00:05.000
//! sprite.jpg#xywh=0,0,160,90
//! ```
//!
//! [`Parser`] turns that text into [`CueDescriptor`]s, [`style_for_time`] picks
//! the one under the pointer and [`thumbnail_offset`] keeps the preview inside
//! the bar. [`Overlay`] ties these together for a host player.

pub mod cue;
pub mod error;
pub mod logger;
pub mod lookup;
pub mod overlay;
pub mod parser;
pub mod resolver;
pub mod serialiser;
pub mod sprite;
pub mod timestamp;

pub use cue::{CueDescriptor, ParseOutcome, SkipReason, SkippedBlock};
pub use error::{Result, ThumbnailError};
pub use lookup::{
    active_cue, offset_for_style, style_for_time, thumbnail_offset, ImageCache, PreloadCache,
};
pub use overlay::{BarEvent, Host, ListenerId, Options, Overlay};
pub use parser::{MissingImagePolicy, Parser};
pub use resolver::{resolve, PageLocation};
pub use sprite::StyleDescriptor;
pub use timestamp::parse_timestamp;
