use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use lumen_renderer::RenderConfig;

/// Log levels selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "lumen")]
#[command(about = "Render the showcase scene with the Lumen path tracer")]
pub struct Args {
    /// JSON render configuration; flags below override its fields
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output image (format chosen by extension)
    #[arg(short, long, default_value = "render.png")]
    pub output: PathBuf,

    /// Directory with texture and normal-map images; procedural maps otherwise
    #[arg(short, long)]
    pub resources: Option<PathBuf>,

    /// Image width in pixels
    #[arg(long)]
    pub width: Option<usize>,

    /// Image height in pixels
    #[arg(long)]
    pub height: Option<usize>,

    /// Sub-samples per pixel along each axis
    #[arg(short, long)]
    pub grid_size: Option<u32>,

    /// Maximum number of bounces
    #[arg(short = 'd', long)]
    pub max_depth: Option<u32>,

    /// Random seed for reproducible renders
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Bucket edge length in pixels
    #[arg(long)]
    pub bucket_size: Option<usize>,

    /// Set the logging level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

impl Args {
    /// Build the render configuration from the config file and flags.
    pub fn render_config(&self) -> Result<RenderConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("failed to parse config {}", path.display()))?
            }
            None => RenderConfig::default(),
        };

        self.apply_overrides(&mut config);
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut RenderConfig) {
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(grid_size) = self.grid_size {
            config.grid_size = grid_size;
        }
        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(bucket_size) = self.bucket_size {
            config.bucket_size = bucket_size;
        }
    }
}
