//! match3tui: swap neighbouring gems to line up three or more, in the terminal.

mod app;
mod input;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use match3tui::{Board, BoardConfig};

/// Log filter when `RUST_LOG` is unset. stderr shares the terminal with the board, so only
/// errors get through unless stderr is redirected.
const DEFAULT_LOG_FILTER: &str = "error";

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .init();

    let theme = match theme::Theme::load(args.theme.as_deref(), args.palette) {
        Ok(theme) => theme,
        Err(e) => {
            log::warn!("theme not loaded ({e}), using defaults");
            theme::Theme::default()
        }
    };
    let config = args.board_config();
    log::info!(
        "starting {}x{} board with {} kinds (seed {:?})",
        config.width,
        config.height,
        config.kinds,
        config.seed
    );
    let board = Board::new(config).context("invalid board configuration")?;
    let mut app = App::new(&args, board, theme);
    app.run()?;
    Ok(())
}

/// Match-3 gem puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "match3tui",
    version,
    about = "Match-3 gem puzzle in the terminal. Swap neighbouring gems to line up three or more of a kind.",
    long_about = "match3tui is a terminal match-3 puzzle.\n\n\
        Select a gem, then a horizontal or vertical neighbour, to swap them. A swap that lines \
        up three or more gems of one kind clears them; the columns fall and new gems drop in. \
        Swaps that form no match are played back.\n\n\
        CONTROLS:\n  Arrows/hjkl  Move cursor   Space/Enter  Select   Mouse  Click gems\n  \
        P  Pause   D  Queue debug overlay   R  New board   Q / Esc  Quit\n\n\
        LOGGING:\n  Logs go to stderr, which draws over the board. Only errors are logged by default. \
        When setting RUST_LOG (e.g. RUST_LOG=debug to trace the animation queue), stderr must be \
        redirected: match3tui 2>match3.log"
)]
pub struct Args {
    /// Board width in cells.
    #[arg(long, default_value = "8", value_name = "COLS")]
    pub width: usize,

    /// Board height in cells.
    #[arg(long, default_value = "8", value_name = "ROWS")]
    pub height: usize,

    /// Number of gem kinds (2..=8 recommended; colours repeat past 8).
    #[arg(short, long, default_value = "8", value_name = "N")]
    pub kinds: u8,

    /// Seed for the gem generator; random when not set.
    #[arg(short, long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Target frames per second; the board advances once per frame.
    #[arg(long, default_value = "60.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Collapse and refill without animation (gems snap into place).
    #[arg(long)]
    pub no_animation: bool,

    /// Start with the animation queue overlay visible.
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    fn board_config(&self) -> BoardConfig {
        BoardConfig {
            width: self.width,
            height: self.height,
            kinds: self.kinds,
            animate_refill: !self.no_animation,
            seed: self.seed,
            ..BoardConfig::default()
        }
    }
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
