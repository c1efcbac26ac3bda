//! Resolution engine - the state machine above the core board logic
//!
//! This crate turns the pure board/matcher/generator primitives into a
//! playable run: it validates swaps, resolves cascades to a stable board,
//! tracks score and objective progress, detects deadlocks and reports
//! terminal outcomes.
//!
//! # Module Structure
//!
//! - [`run`]: [`GameRun`], the per-level state machine and its move events
//! - [`level`]: level configuration and objective bookkeeping
//! - [`error`]: the rejected-input taxonomy
//!
//! # Example
//!
//! ```
//! use tile_match_engine::{GameRun, LevelConfig};
//! use tile_match_types::Pos;
//!
//! let mut run = GameRun::start(LevelConfig::practice(), 12345);
//! assert_eq!(run.moves_remaining(), 20);
//!
//! // A diagonal is never a legal move.
//! assert!(run.submit_move(Pos::new(0, 0), Pos::new(1, 1)).is_err());
//! ```

pub mod error;
pub mod level;
pub mod run;

pub use tile_match_core as core;
pub use tile_match_types as types;

// Re-export commonly used types for convenience
pub use error::{EngineError, EngineResult};
pub use level::{is_level_complete, LevelConfig, Objective, ObjectiveCounts, ObjectiveKind};
pub use run::{has_valid_moves, CascadeStep, GameRun, MoveOutcome, RunSnapshot};
