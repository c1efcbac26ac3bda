//! Immutable board views handed to callers between phases

use tile_match_types::{Pos, SpecialKind, TileKind};

use crate::board::Board;

/// One occupied cell as seen from outside the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSnapshot {
    pub id: u32,
    pub kind: TileKind,
    pub special: Option<SpecialKind>,
}

/// A frozen copy of the grid, safe to hold across engine mutations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub rows: u8,
    pub cols: u8,
    grid: Vec<Option<CellSnapshot>>,
}

impl BoardSnapshot {
    pub fn capture(board: &Board) -> Self {
        let mut grid = Vec::with_capacity(board.rows() as usize * board.cols() as usize);
        for pos in board.positions() {
            grid.push(board.get(pos).map(|t| CellSnapshot {
                id: t.id.raw(),
                kind: t.kind,
                special: t.special,
            }));
        }
        Self {
            rows: board.rows(),
            cols: board.cols(),
            grid,
        }
    }

    pub fn get(&self, pos: Pos) -> Option<&CellSnapshot> {
        if pos.row >= self.rows || pos.col >= self.cols {
            return None;
        }
        self.grid[pos.row as usize * self.cols as usize + pos.col as usize].as_ref()
    }

    /// Occupied cells with their positions, row-major
    pub fn cells(&self) -> impl Iterator<Item = (Pos, &CellSnapshot)> {
        self.grid.iter().enumerate().filter_map(|(i, cell)| {
            cell.as_ref().map(|c| {
                let row = (i / self.cols as usize) as u8;
                let col = (i % self.cols as usize) as u8;
                (Pos::new(row, col), c)
            })
        })
    }
}
