//! Match-3 puzzle engine.
//!
//! A rectangular board of coloured gems. Swapping two neighbours that lines up three or more of
//! a kind clears them; the columns collapse, new gems drop in from above, and any runs that form
//! on the way clear in turn. Every visible change is animated through a batch queue so the board
//! logic never advances while the previous change is still on screen.
//!
//! The engine knows nothing about terminals. A host feeds it pointer events and elapsed time,
//! reads [`GemView`]s back for drawing, and reacts to [`BoardEvent`]s.
//!
//! ```no_run
//! use std::time::Duration;
//! use match3tui::{Board, BoardConfig};
//!
//! let mut board = Board::new(BoardConfig::default().with_seed(7)).unwrap();
//! board.tick(Duration::from_millis(16));
//! for gem in board.gem_views() {
//!     let _ = (gem.kind, gem.position, gem.size_factor);
//! }
//! ```

pub mod animation;
pub mod board;
pub mod config;
pub mod gem;
pub mod gravity;
pub mod grid;
pub mod matcher;
pub mod moves;
pub mod swap;

pub use animation::{AnimationItem, AnimationKind, AnimationQueue, QueueStats, ReleasedKind};
pub use board::{Board, BoardEvent};
pub use config::{BoardConfig, ConfigError, Geometry, Tuning};
pub use gem::{Gem, GemEvent, GemId, GemKind, GemState, GemView, Tint};
pub use grid::{BoardLayout, CellPos, Grid, Occupant, Vec2};
pub use matcher::{Axis, MatchRun};
pub use swap::SwapOutcome;
