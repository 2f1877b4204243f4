//! natsly_lineart - offline sketch to line-art conversion
//!
//! Runs the same conversion as the upload endpoint on local files.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use natsly::images::lineart;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Convert images to black/white line art
#[derive(Parser, Debug)]
#[command(
    name = "natsly_lineart",
    version,
    about = "Convert a sketch or photo to coloring-book line art"
)]
struct Args {
    /// Input image
    input: PathBuf,

    /// Output PNG (defaults to <input>_line_art.png)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "natsly=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    if !args.input.is_file() {
        bail!("Input file not found: {}", args.input.display());
    }

    let output = args.output.unwrap_or_else(|| {
        let stem = args
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        args.input.with_file_name(format!("{}_line_art.png", stem))
    });

    let data = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let line_art = lineart::convert_bytes(&data)
        .with_context(|| format!("Failed to convert {}", args.input.display()))?;

    line_art
        .save_with_format(&output, image::ImageFormat::Png)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!(
        "Wrote {}x{} line art to {}",
        line_art.width(),
        line_art.height(),
        output.display()
    );
    Ok(())
}
