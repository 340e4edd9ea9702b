use clap::{Parser, ValueEnum};
use ember_renderer::CameraConfig;
use log::LevelFilter;
use std::path::{Path, PathBuf};

/// Log levels accepted on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
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

/// Where the finished image goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget<'a> {
    /// Plain-text PPM on standard output
    Stdout,
    /// File whose extension picks the format
    File(&'a Path),
}

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "ember", version)]
#[command(about = "A CPU path tracer")]
pub struct Args {
    /// JSON scene description; the built-in random spheres scene if omitted
    #[arg(long)]
    pub scene: Option<PathBuf>,

    /// Output file (.bmp, .ppm or .png), or `-` for PPM on stdout
    #[arg(short, long, default_value = "output.bmp")]
    pub output: PathBuf,

    /// Image width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Number of samples per pixel
    #[arg(long, short = 's')]
    pub samples: Option<u32>,

    /// Maximum number of bounces per ray
    #[arg(long)]
    pub depth: Option<u32>,

    /// Worker threads (defaults to the available parallelism)
    #[arg(long, short = 'j')]
    pub threads: Option<usize>,

    /// Seed for sampling and scene generation, for reproducible images
    #[arg(long)]
    pub seed: Option<u64>,

    /// Set the logging level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

impl Args {
    /// Resolve `--output`, treating `-` as standard output.
    pub fn output_target(&self) -> OutputTarget<'_> {
        if self.output.as_os_str() == "-" {
            OutputTarget::Stdout
        } else {
            OutputTarget::File(&self.output)
        }
    }

    /// Apply command line overrides on top of scene settings.
    pub fn apply(&self, config: &mut CameraConfig) {
        if let Some(width) = self.width {
            config.image_width = width;
        }
        if let Some(height) = self.height {
            config.image_height = height;
        }
        if let Some(samples) = self.samples {
            config.samples_per_pixel = samples;
        }
        if let Some(depth) = self.depth {
            config.max_depth = depth;
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
    }
}

/// Number of hardware threads, or 1 if it cannot be queried.
pub fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
