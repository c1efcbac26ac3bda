//! Match detector - run and shape scanning over an immutable board
//!
//! Two independent passes, both side-effect free:
//!
//! - [`find_matches`]: every maximal horizontal/vertical run of 3 or more
//!   same-kind tiles, deduplicated into one [`MatchSet`]. This is the only
//!   pass whose result removes tiles in the common case.
//! - [`find_special_matches`]: eager scan for special-producing shapes
//!   (4-run bomb, 5-run rainbow, L/T pentominoes). At most one result per
//!   call; the caller re-invokes after resolving it.
//!
//! Special tiles never start or extend a run in either pass; they carry a
//! legacy kind for display only.

use arrayvec::ArrayVec;

use tile_match_types::{Pos, SpecialKind, TileKind, BOMB_RUN, MIN_RUN, RAINBOW_RUN};

use crate::board::Board;

/// Positions removed by one ordinary-detection pass, sorted and
/// deduplicated (a tile completing both a row and a column run appears
/// once)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchSet {
    positions: Vec<Pos>,
}

impl MatchSet {
    /// Build from an unordered, possibly duplicated position list
    pub fn from_positions(mut positions: Vec<Pos>) -> Self {
        positions.sort_unstable();
        positions.dedup();
        Self { positions }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.positions.binary_search(&pos).is_ok()
    }

    pub fn positions(&self) -> &[Pos] {
        &self.positions
    }

    pub fn iter(&self) -> impl Iterator<Item = Pos> + '_ {
        self.positions.iter().copied()
    }
}

/// One special-producing shape located by [`find_special_matches`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialMatch {
    /// Cells consumed by the shape
    pub cells: Vec<Pos>,
    /// Where the new special tile spawns
    pub spawn: Pos,
    /// Which special it becomes
    pub special: SpecialKind,
    /// The run's tile kind (kept on the special as its legacy kind)
    pub from_kind: TileKind,
}

/// Find every ordinary match on the board
///
/// Scans each row left to right and each column top to bottom for maximal
/// runs of at least [`MIN_RUN`] same-kind, non-special tiles. Results from
/// both orientations are unioned with duplicates collapsed.
pub fn find_matches(board: &Board) -> MatchSet {
    let mut positions = Vec::new();

    // Horizontal runs
    for row in 0..board.rows() {
        let mut col = 0;
        while col < board.cols() {
            let start = Pos::new(row, col);
            match board.run_kind_at(start) {
                Some(kind) => {
                    let len = run_len_right(board, start, kind);
                    if len >= MIN_RUN {
                        for i in 0..len {
                            positions.push(Pos::new(row, col + i as u8));
                        }
                    }
                    col += len as u8;
                }
                None => col += 1,
            }
        }
    }

    // Vertical runs
    for col in 0..board.cols() {
        let mut row = 0;
        while row < board.rows() {
            let start = Pos::new(row, col);
            match board.run_kind_at(start) {
                Some(kind) => {
                    let len = run_len_down(board, start, kind);
                    if len >= MIN_RUN {
                        for i in 0..len {
                            positions.push(Pos::new(row + i as u8, col));
                        }
                    }
                    row += len as u8;
                }
                None => row += 1,
            }
        }
    }

    MatchSet::from_positions(positions)
}

/// Find at most one special-producing shape
///
/// Priority per scan: horizontal straight runs (bomb on exactly 4, rainbow
/// on 5 or more), then vertical straight runs, then L/T pentominoes. The
/// first shape found is returned immediately; re-invoke after resolving it
/// to find any remaining shapes. Because the pentomino scan only runs once
/// no straight run of 4+ exists anywhere, a 4-run that is part of a larger
/// pentomino resolves as the line special. That ordering is deliberate (it
/// keeps resolution reproducible), not an optimality guarantee.
pub fn find_special_matches(board: &Board) -> Option<SpecialMatch> {
    // Horizontal straight runs
    for row in 0..board.rows() {
        let mut col = 0;
        while col < board.cols() {
            let start = Pos::new(row, col);
            match board.run_kind_at(start) {
                Some(kind) => {
                    let len = run_len_right(board, start, kind);
                    if let Some(found) = straight_special(start, len, kind, true) {
                        return Some(found);
                    }
                    col += len as u8;
                }
                None => col += 1,
            }
        }
    }

    // Vertical straight runs
    for col in 0..board.cols() {
        let mut row = 0;
        while row < board.rows() {
            let start = Pos::new(row, col);
            match board.run_kind_at(start) {
                Some(kind) => {
                    let len = run_len_down(board, start, kind);
                    if let Some(found) = straight_special(start, len, kind, false) {
                        return Some(found);
                    }
                    row += len as u8;
                }
                None => row += 1,
            }
        }
    }

    // Pentomino shapes, only reachable when no straight 4+ run exists
    find_pentomino(board)
}

fn run_len_right(board: &Board, start: Pos, kind: TileKind) -> usize {
    let mut len = 1;
    while start.col + (len as u8) < board.cols()
        && board.run_kind_at(Pos::new(start.row, start.col + len as u8)) == Some(kind)
    {
        len += 1;
    }
    len
}

fn run_len_down(board: &Board, start: Pos, kind: TileKind) -> usize {
    let mut len = 1;
    while start.row + (len as u8) < board.rows()
        && board.run_kind_at(Pos::new(start.row + len as u8, start.col)) == Some(kind)
    {
        len += 1;
    }
    len
}

/// Classify a straight run: exactly 4 spawns a bomb at the run's first
/// cell, 5 or more a rainbow at the middle cell (floor of len/2 from the
/// start). Shorter runs produce nothing.
fn straight_special(
    start: Pos,
    len: usize,
    kind: TileKind,
    horizontal: bool,
) -> Option<SpecialMatch> {
    let cell_at = |i: usize| {
        if horizontal {
            Pos::new(start.row, start.col + i as u8)
        } else {
            Pos::new(start.row + i as u8, start.col)
        }
    };

    let (special, spawn) = if len == BOMB_RUN {
        (SpecialKind::Bomb, start)
    } else if len >= RAINBOW_RUN {
        (SpecialKind::Rainbow, cell_at(len / 2))
    } else {
        return None;
    };

    Some(SpecialMatch {
        cells: (0..len).map(cell_at).collect(),
        spawn,
        special,
        from_kind: kind,
    })
}

/// Relative cell offsets of the three pentomino orientations, with the
/// index of the cell shared by both runs (where the rainbow spawns)
const PENTOMINOES: [([(u8, u8); 5], usize); 3] = [
    // L: horizontal 3 across the top, vertical 3 down the left edge
    ([(0, 0), (0, 1), (0, 2), (1, 0), (2, 0)], 0),
    // Mirrored L: vertical 3 down the right edge
    ([(0, 0), (0, 1), (0, 2), (1, 2), (2, 2)], 2),
    // T: vertical 3 descending from the horizontal middle
    ([(0, 0), (0, 1), (0, 2), (1, 1), (2, 1)], 1),
];

/// Scan row-major for the first L, mirrored-L or T pentomino of one kind
fn find_pentomino(board: &Board) -> Option<SpecialMatch> {
    if board.rows() < 3 || board.cols() < 3 {
        return None;
    }

    for row in 0..board.rows() - 2 {
        for col in 0..board.cols() - 2 {
            let anchor = Pos::new(row, col);
            let Some(kind) = board.run_kind_at(anchor) else {
                continue;
            };

            for (offsets, corner) in PENTOMINOES {
                let mut cells: ArrayVec<Pos, 5> = ArrayVec::new();
                for (dr, dc) in offsets {
                    cells.push(Pos::new(row + dr, col + dc));
                }

                if cells.iter().all(|&p| board.run_kind_at(p) == Some(kind)) {
                    return Some(SpecialMatch {
                        spawn: cells[corner],
                        cells: cells.to_vec(),
                        special: SpecialKind::Rainbow,
                        from_kind: kind,
                    });
                }
            }
        }
    }

    None
}
