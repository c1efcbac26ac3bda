//! Error types for the resolution engine
//!
//! Covers rejected player input only. Every variant leaves the run state
//! untouched and consumes no move. Out-of-bounds coordinates are a caller
//! contract violation guarded by debug assertions in the board, not an
//! error here.

use thiserror::Error;

use tile_match_types::Pos;

/// Errors that can occur when submitting input to a game run
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// The run already ended (level complete or game over)
    #[error("run is finished; no further moves are accepted")]
    Finished,

    /// No moves remain in the budget
    #[error("no moves remaining")]
    OutOfMoves,

    /// A swap endpoint holds no tile
    #[error("cell ({}, {}) is empty", pos.row, pos.col)]
    CellEmpty { pos: Pos },

    /// The two cells are not 4-adjacent
    #[error("cells ({}, {}) and ({}, {}) are not adjacent", a.row, a.col, b.row, b.col)]
    NotAdjacent { a: Pos, b: Pos },

    /// Activation requested on a tile that is not special
    #[error("tile at ({}, {}) is not a special tile", pos.row, pos.col)]
    NotSpecial { pos: Pos },
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
