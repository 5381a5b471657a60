//! Lumen - render the showcase scene to an image file.

mod cli;
mod logger;
mod showcase;

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use lumen_core::save_image;
use lumen_renderer::render;

use crate::cli::Args;
use crate::logger::init_logger;
use crate::showcase::Maps;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.log_level.into());

    log::info!("Starting Lumen");

    let config = args.render_config()?;

    let start = Instant::now();
    let mut maps = Maps::from_dir(args.resources.as_deref());
    let scene = showcase::build(&mut maps).context("failed to build the showcase scene")?;
    log::info!("Scene built in {:.2?}", start.elapsed());

    let image = render(&scene, &config)?;

    save_image(&args.output, image.size(), &image.to_rgb())
        .with_context(|| format!("failed to save {}", args.output.display()))?;
    log::info!("Saved {}", args.output.display());

    Ok(())
}
