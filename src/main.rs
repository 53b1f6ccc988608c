use vttthumbs::logger::init_logging;
use vttthumbs::serialiser::{self, Format};
use vttthumbs::{
    offset_for_style, style_for_time, MissingImagePolicy, PageLocation, Parser, StyleDescriptor,
};

use std::collections::HashSet;
use std::io::{self, Read, Write};

use anyhow::{anyhow, Context, Result};
use clap::{Parser as ClapParser, ValueEnum};
use tracing::info;
use url::Url;

fn main() {
    match run() {
        Ok(()) => (),
        Err(err) => {
            eprintln!("An error occurred: {}", err);
            for cause in err.chain().skip(1) {
                eprintln!("    {}", cause);
            }
            std::process::exit(1);
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Vtt,
    Json,
}

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Vtt => Format::Vtt,
            OutputFormat::Json => Format::Json,
        }
    }
}

#[derive(ClapParser)]
#[command(about = "Inspect and normalise WebVTT thumbnail cue files")]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "The cue file to read from. If not supplied, it will be read from standard input.",
        default_value = "-"
    )]
    input: String,
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "The file to write to. If not supplied, output will be written to standard output.",
        default_value = "-"
    )]
    output: String,
    #[arg(
        long,
        value_name = "URL",
        help = "Address the cue file is served from. Relative image references are resolved against it. Defaults to the input path."
    )]
    src: Option<String>,
    #[arg(
        long,
        value_name = "URL",
        help = "Address of the page hosting the player, used when the cue file address is relative."
    )]
    page_url: Option<String>,
    #[arg(
        long,
        help = "Fail on cues without a usable image reference instead of skipping them."
    )]
    strict: bool,
    #[arg(
        short,
        long,
        value_enum,
        default_value = "vtt",
        help = "Output format for the parsed cue list."
    )]
    format: OutputFormat,
    #[arg(
        long,
        value_name = "SECONDS",
        help = "Print the thumbnail style active at this playback time instead of the cue list."
    )]
    at: Option<f64>,
    #[arg(
        long,
        value_name = "FRACTION",
        conflicts_with = "at",
        requires_all = ["duration", "bar_width"],
        help = "Print the style and offset for a pointer at this fraction (0.0 to 1.0) of the progress bar."
    )]
    pointer: Option<f64>,
    #[arg(long, value_name = "SECONDS", help = "Playback duration used with --pointer.")]
    duration: Option<f64>,
    #[arg(long, value_name = "PX", help = "Progress bar width used with --pointer.")]
    bar_width: Option<f64>,
    #[arg(
        long,
        value_name = "PX",
        default_value_t = 160,
        help = "Thumbnail width used with --pointer for cues showing a whole image."
    )]
    holder_width: u32,
    #[arg(short, long, help = "Log every skipped block.")]
    verbose: bool,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let data = if cli.input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(&cli.input)
            .context(format!("Failed to open input file: '{}'", cli.input))?
    };

    let page_base = match &cli.page_url {
        Some(page_url) => {
            let url = Url::parse(page_url)
                .context(format!("Invalid page address: '{}'", page_url))?;
            PageLocation::from_url(&url).base()
        }
        None => String::new(),
    };
    let cue_source = match &cli.src {
        Some(src) => src.clone(),
        None if cli.input != "-" => cli.input.clone(),
        None => String::new(),
    };

    let policy = if cli.strict {
        MissingImagePolicy::Error
    } else {
        MissingImagePolicy::Skip
    };
    let parser = Parser::new(policy)?;
    let outcome = parser
        .parse(&data, &cue_source, &page_base)
        .context(format!("Failed to parse cue file: '{}'", cli.input))?;
    if outcome.cues.is_empty() {
        return Err(anyhow!("You appear to have supplied a file without thumbnail cues."));
    }
    info!(
        cues = outcome.cues.len(),
        skipped = outcome.skipped.len(),
        "parsed cue file"
    );

    let dst: Box<dyn Write> = if cli.output == "-" {
        Box::new(io::stdout())
    } else {
        Box::new(
            std::fs::File::create(&cli.output)
                .context(format!("Failed to create output file: '{}'", cli.output))?,
        )
    };

    let mut cache: HashSet<String> = HashSet::new();
    if let Some(time) = cli.at {
        let style = style_for_time(&outcome.cues, time, &mut cache);
        write_style(dst, style, None)?;
    } else if let (Some(pointer), Some(duration), Some(bar_width)) =
        (cli.pointer, cli.duration, cli.bar_width)
    {
        let style = style_for_time(&outcome.cues, pointer * duration, &mut cache);
        let offset =
            style.map(|style| offset_for_style(style, pointer, bar_width, cli.holder_width));
        write_style(dst, style, offset)?;
    } else {
        serialiser::serialise(&outcome.cues, cli.format.into(), dst)?;
    }

    Ok(())
}

fn write_style<W: Write>(mut dst: W, style: Option<&StyleDescriptor>, offset: Option<f64>) -> Result<()> {
    let style = match style {
        Some(style) => style,
        None => {
            writeln!(dst, "opacity: 0;")?;
            return Ok(());
        }
    };
    writeln!(dst, "opacity: 1;")?;
    for (name, value) in style.css_properties() {
        writeln!(dst, "{}: {};", name, value)?;
    }
    if let Some(offset) = offset {
        writeln!(dst, "transform: translateX({}px);", offset)?;
    }
    Ok(())
}
