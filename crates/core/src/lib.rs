//! Core board logic - pure, deterministic, and testable
//!
//! This crate holds everything below the resolution state machine: the
//! grid itself, match detection, seeded generation and scoring tables. It
//! has zero dependencies on I/O, making it:
//!
//! - **Deterministic**: the same seed produces identical boards and refills
//! - **Testable**: every rule is exercised without an engine around it
//! - **Portable**: usable from the engine, the adapter, tests and benches
//!
//! # Module Structure
//!
//! - [`board`]: the grid, swaps, Chebyshev neighborhoods, column compaction
//! - [`matcher`]: ordinary run detection and special-shape detection
//! - [`generator`]: seeded RNG, tile identity, no-prematch construction,
//!   refill
//! - [`scoring`]: flat-tier match scores and special bonuses
//! - [`snapshot`]: frozen board views for callers
//!
//! # Example
//!
//! ```
//! use tile_match_core::{generator, matcher};
//! use tile_match_core::generator::TileSource;
//! use tile_match_types::TileKind;
//!
//! let kinds = [TileKind::Blue, TileKind::Orange, TileKind::Purple,
//!              TileKind::Green, TileKind::Red];
//! let mut source = TileSource::new(12345);
//! let board = generator::generate(8, 8, &kinds, &mut source);
//!
//! // Freshly generated boards never start with a match.
//! assert!(matcher::find_matches(&board).is_empty());
//! ```

pub mod board;
pub mod generator;
pub mod matcher;
pub mod scoring;
pub mod snapshot;

pub use tile_match_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, Tile};
pub use generator::{SimpleRng, TileSource};
pub use matcher::{find_matches, find_special_matches, MatchSet, SpecialMatch};
pub use snapshot::{BoardSnapshot, CellSnapshot};
