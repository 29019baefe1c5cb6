mod batch;
mod compose;
mod error;
mod input;
mod output;
mod pipeline;
mod refine;
mod segmentation;

use std::path::PathBuf;

use anyhow::{Context, Result};
use batch::{run_batch, BatchConfig};
use clap::Parser;
use compose::CompositeMode;
use input::DirectorySource;
use output::DirectoryOutput;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the photographs to process
    #[arg(short, long, default_value = "unprocessed_images")]
    input_dir: PathBuf,

    /// Directory for the results (created if missing)
    #[arg(short, long, default_value = "processed_images")]
    output_dir: PathBuf,

    /// Segmentation refinement rounds
    #[arg(long, default_value_t = segmentation::DEFAULT_ITERATIONS)]
    iterations: usize,

    /// Segment at most this many pixels along the longer side
    /// Results are always written at full resolution
    #[arg(long)]
    max_side: Option<u32>,

    /// How the object is written onto the white canvas
    #[arg(long, value_enum, default_value_t = CompositeMode::Threshold)]
    mode: CompositeMode,

    /// Write the feathered object mask instead of the composite
    #[arg(long)]
    show_mask: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

impl From<&Args> for BatchConfig {
    fn from(args: &Args) -> Self {
        Self {
            input_dir: args.input_dir.clone(),
            output_dir: args.output_dir.clone(),
            iterations: args.iterations,
            max_side: args.max_side,
            mode: args.mode,
            show_mask: args.show_mask,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let config = BatchConfig::from(&args);

    tracing::info!("Recenter starting");
    tracing::info!("Input: {}", config.input_dir.display());
    tracing::info!("Output: {}", config.output_dir.display());
    if let Some(max_side) = config.max_side {
        tracing::info!("Segmentation working size: {}px", max_side);
    }

    let mut source = DirectorySource::open(&config.input_dir)
        .context("Failed to initialize image source")?;
    let mut output = DirectoryOutput::new(&config.output_dir)
        .context("Failed to initialize output directory")?;
    let segmenter = segmentation::create_default_segmenter(config.iterations);

    run_batch(&mut source, &mut output, segmenter.as_ref(), &config);

    Ok(())
}
