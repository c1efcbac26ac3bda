//! Level configuration and objective bookkeeping
//!
//! A [`LevelConfig`] is supplied by the surrounding application (a level
//! list, an editor, a test); the engine only reads it. The engine owns the
//! per-run [`ObjectiveCounts`] and reports increments through move events.

use std::collections::BTreeMap;

use tile_match_types::{SpecialKind, TileKind, DEFAULT_COLS, DEFAULT_ROWS};

/// What an objective counts: collected tiles of a kind, or created
/// specials of a kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObjectiveKind {
    Tile(TileKind),
    Special(SpecialKind),
}

impl ObjectiveKind {
    /// Parse from a tag string: a tile-kind name, or "bomb"/"rainbow"
    pub fn from_str(s: &str) -> Option<Self> {
        if let Some(kind) = TileKind::from_str(s) {
            return Some(ObjectiveKind::Tile(kind));
        }
        SpecialKind::from_str(s).map(ObjectiveKind::Special)
    }

    /// The tag string used in configs and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectiveKind::Tile(kind) => kind.as_str(),
            ObjectiveKind::Special(kind) => kind.as_str(),
        }
    }
}

/// One per-level collection target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Objective {
    pub kind: ObjectiveKind,
    pub target: u32,
}

/// A level as supplied by the level provider; never mutated by the engine
#[derive(Debug, Clone, PartialEq)]
pub struct LevelConfig {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub target_score: u32,
    pub moves: u32,
    pub objectives: Vec<Objective>,
    pub rows: u8,
    pub cols: u8,
    pub kinds: Vec<TileKind>,
    pub difficulty: u8,
}

impl LevelConfig {
    /// The canonical score-only practice level: 8x8, five kinds, 20 moves
    pub fn practice() -> Self {
        Self {
            id: 0,
            name: "Practice".to_string(),
            description: "Match 3 tiles to score points".to_string(),
            target_score: 500,
            moves: 20,
            objectives: Vec::new(),
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            kinds: vec![
                TileKind::Blue,
                TileKind::Orange,
                TileKind::Purple,
                TileKind::Green,
                TileKind::Red,
            ],
            difficulty: 1,
        }
    }
}

/// Per-run objective progress, keyed by objective tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectiveCounts {
    counts: BTreeMap<ObjectiveKind, u32>,
}

impl ObjectiveCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: ObjectiveKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn increment(&mut self, kind: ObjectiveKind, by: u32) {
        *self.counts.entry(kind).or_insert(0) += by;
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectiveKind, u32)> + '_ {
        self.counts.iter().map(|(&k, &v)| (k, v))
    }
}

/// True iff the target score is reached and every objective counter is at
/// its target. A level with zero objectives only checks score.
pub fn is_level_complete(level: &LevelConfig, score: u32, counts: &ObjectiveCounts) -> bool {
    if score < level.target_score {
        return false;
    }
    level
        .objectives
        .iter()
        .all(|obj| counts.get(obj.kind) >= obj.target)
}
