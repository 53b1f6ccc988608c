use crate::cue::CueDescriptor;
use crate::timestamp::format_timestamp;

use std::io::{BufWriter, Write};

use anyhow::{Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// A normalised thumbnail cue file with every reference resolved.
    Vtt,
    /// The cue list with each style as a CSS property map.
    Json,
}

pub fn serialise<W: Write>(cues: &[CueDescriptor], format: Format, output: W) -> Result<()> {
    let mut writer = BufWriter::new(output);
    let written = match format {
        Format::Vtt => write_cues(&mut writer, cues),
        Format::Json => write_json(&mut writer, cues),
    };
    written.context("Failed to write to output.")?;
    writer.flush().context("Failed to write to output.")?;
    Ok(())
}

fn write_cues<W: Write>(buf: &mut W, cues: &[CueDescriptor]) -> Result<()> {
    writeln!(buf, "WEBVTT")?;
    for cue in cues {
        writeln!(buf)?;
        write_cue(buf, cue)?;
    }
    Ok(())
}

fn write_json<W: Write>(buf: &mut W, cues: &[CueDescriptor]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *buf, cues).context("Failed to encode cues as JSON.")?;
    writeln!(buf)?;
    Ok(())
}

fn write_cue<W: Write>(buf: &mut W, cue: &CueDescriptor) -> Result<()> {
    writeln!(
        buf,
        "{} --> {}",
        format_timestamp(cue.start),
        format_timestamp(cue.end)
    )?;
    writeln!(buf, "{}", cue.style.reference())?;
    Ok(())
}
