use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Env, Target};

use crate::i18n::Lang;
use crate::surface::Size;

// Smallest surface that still holds the fixed Snake start and the Invaders formation.
pub const MIN_WIDTH: u32 = 560;
pub const MIN_HEIGHT: u32 = 400;

#[derive(Parser, Debug)]
#[command(name = "neon-arcade")]
#[command(about = "Snake, Pong, Breaker, Invaders and Tetris in your terminal")]
pub struct Args {
    /// Language for on-screen text
    #[arg(long, value_enum, default_value_t = Lang::En)]
    pub lang: Lang,

    /// Seed for every random choice (food, serves, enemy fire, piece bag)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Milliseconds per frame
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..=1000))]
    pub tick_ms: u64,

    /// Logical surface width in pixels
    #[arg(long, default_value_t = 800, value_parser = clap::value_parser!(u32).range(MIN_WIDTH as i64..))]
    pub width: u32,

    /// Logical surface height in pixels
    #[arg(long, default_value_t = 600, value_parser = clap::value_parser!(u32).range(MIN_HEIGHT as i64..))]
    pub height: u32,

    /// Write logs here (the terminal belongs to the UI)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Args {
    pub fn surface_size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Route `log` output to `path`. Without a path nothing is logged.
pub fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else { return Ok(()) };
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .try_init()
        .context("failed to install logger")?;
    Ok(())
}
