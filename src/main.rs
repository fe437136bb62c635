//! Blockfall: classic falling-block puzzle game in the terminal.

mod app;
mod board;
mod collision;
mod grid;
mod highscores;
mod input;
mod pieces;
mod score;
mod session;
mod theme;
mod ui;

use anyhow::{Result, bail};
use app::App;
use clap::{ArgAction, Parser, ValueEnum};
use highscores::{FileHighScores, HighScoreStore, MemoryHighScores};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

/// Board side limits. The upper bound keeps every layout size inside `u16`.
const MIN_COLS: u16 = 4;
const MAX_SIDE: u16 = 200;

/// Options derived from CLI that affect the game itself.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub rows: usize,
    pub cols: usize,
    pub fps: u32,
    pub seed: Option<u64>,
    pub no_menu: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref(), args.verbose);

    if !(MIN_COLS..=MAX_SIDE).contains(&args.cols) {
        bail!("--cols must be between {MIN_COLS} and {MAX_SIDE}, got {}", args.cols);
    }
    if !(1..=MAX_SIDE).contains(&args.rows) {
        bail!("--rows must be between 1 and {MAX_SIDE}, got {}", args.rows);
    }

    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_else(|e| {
        warn!(error = %e, "could not load theme, using defaults");
        let mut t = theme::Theme::default();
        t.apply_palette(args.palette);
        t
    });
    let store: Box<dyn HighScoreStore> = if args.no_save {
        Box::new(MemoryHighScores::default())
    } else {
        Box::new(
            args.high_score_file
                .clone()
                .map_or_else(FileHighScores::default_location, FileHighScores::new),
        )
    };
    let config = GameConfig {
        rows: usize::from(args.rows),
        cols: usize::from(args.cols),
        fps: args.fps,
        seed: args.seed,
        no_menu: args.no_menu,
    };
    let mut app = App::new(&config, theme, store)?;
    app.run()?;
    Ok(())
}

/// File logging only; the terminal belongs to the game. Logging is skipped if the file
/// cannot be opened.
fn init_logging(path: Option<&Path>, verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let path = path.map_or_else(
        || highscores::config_dir().join("blockfall.log"),
        Path::to_path_buf,
    );
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let Ok(file) = File::options().create(true).append(true).open(&path) else {
        return;
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(level)
        .init();
}

/// Classic falling-block puzzle game in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "blockfall",
    version,
    about = "Classic falling-block puzzle in the terminal. Fill rows to clear them; don't let the stack reach the top.",
    long_about = "Blockfall is a terminal falling-block puzzle game.\n\n\
        Steer the falling piece, rotate it and drop it faster. Full rows are cleared and \
        everything above moves down. The game ends when a settled block reaches the top row.\n\n\
        CONTROLS:\n  Left/Right h/l  Move    Up/k  Rotate    Down/j  Faster (hold)\n  \
        Enter  Start/restart    Esc/p  Pause    q  Quit\n\n\
        Use --theme to load a btop-style theme (e.g. onedark.theme)."
)]
pub struct Args {
    /// Board height in rows (1 to 200).
    #[arg(
        long,
        default_value_t = board::DEFAULT_ROWS as u16,
        value_parser = clap::value_parser!(u16).range(1..=i64::from(MAX_SIDE)),
        value_name = "ROWS"
    )]
    pub rows: u16,

    /// Board width in columns (4 to 200).
    #[arg(
        long,
        default_value_t = board::DEFAULT_COLS as u16,
        value_parser = clap::value_parser!(u16).range(i64::from(MIN_COLS)..=i64::from(MAX_SIDE)),
        value_name = "COLS"
    )]
    pub cols: u16,

    /// Target frames (and ticks) per second.
    #[arg(long, default_value_t = 60, value_name = "RATE")]
    pub fps: u32,

    /// Seed for the piece generator; random if not set.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// High score file. Defaults to <config>/blockfall/highscore.
    #[arg(long, value_name = "FILE")]
    pub high_score_file: Option<PathBuf>,

    /// Keep the high score in memory only.
    #[arg(long)]
    pub no_save: bool,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Skip the start screen and begin playing immediately.
    #[arg(long)]
    pub no_menu: bool,

    /// Log file. Defaults to <config>/blockfall/blockfall.log.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
