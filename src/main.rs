//! Blockfall binary: CLI parsing, logging setup, then hand off to [`App`].

use anyhow::{Context, Result};
use blockfall::theme::Theme;
use blockfall::{App, GameConfig};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

fn main() -> Result<()> {
    let args = Args::parse();
    // Bad flags fail before the log file is touched.
    let config = args.game_config()?;
    if let Some(path) = &args.log_file {
        init_logging(path, args.log_level)?;
    }
    let theme = Theme::load(args.theme.as_deref()).unwrap_or_else(|e| {
        warn!(error = %e, "could not load theme, using built-in colours");
        Theme::default()
    });
    let mut app = App::new(&config, theme)?;
    app.run()?;
    Ok(())
}

/// The terminal belongs to the game, so logs only go to a file.
fn init_logging(path: &Path, level: LogLevel) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_max_level(tracing::Level::from(level))
        .init();
    Ok(())
}

/// Falling-block puzzle game in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "blockfall",
    version,
    about = "Classic falling-block puzzle in the terminal. Fill complete rows to clear them and score.",
    long_about = "Blockfall is a small falling-block puzzle game for the terminal.\n\n\
        Pieces fall one row per second. Move and rotate them so they fill complete rows; every \
        cleared row scores 100 points. The game ends when a new piece has no room to appear.\n\n\
        CONTROLS:\n  Left/Right (h/l)  Move    Up (k)  Rotate    Down (j)  Soft drop\n  \
        P  Pause/Resume    R  Reset    Enter  Resume / Play again    Q / Esc  Quit"
)]
pub struct Args {
    /// Path to theme file (btop-style theme[key]=\"value\"). Keys piece_i..piece_s set piece colours.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Seed for the piece generator; the same seed replays the same pieces.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Target render frames per second.
    #[arg(long, default_value = "30.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Write logs to this file (nothing is logged without it).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log verbosity when --log-file is set.
    #[arg(long, default_value = "info")]
    pub log_level: LogLevel,
}

impl Args {
    fn game_config(&self) -> Result<GameConfig> {
        let config = GameConfig {
            seed: self.seed,
            frame_rate: self.frame_rate,
        };
        config.validate().context("invalid --frame-rate")?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}
