//! Protocol module - JSON message types for driving the engine
//!
//! Implements the line-delimited JSON protocol spoken by external
//! presentation or AI layers. Each request line produces one or more
//! response lines. Tile kinds, special kinds, phases and terminals travel
//! as their lowercase tag strings so clients never depend on Rust enum
//! encodings.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use tile_match_core::snapshot::BoardSnapshot;
use tile_match_engine::{
    CascadeStep, LevelConfig, MoveOutcome, Objective, ObjectiveKind, RunSnapshot,
};
use tile_match_types::{Phase, Pos, Terminal};

// ============== Client -> Engine Messages ==============

/// One request line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Begin a run over the supplied level
    StartLevel { level: LevelSpec, seed: u32 },
    /// Swap two adjacent cells (special endpoints activate)
    Move { a: Cell, b: Cell },
    /// Explicit special activation
    Activate { special: Cell, target: Cell },
    /// Ask for the current run snapshot
    State,
}

/// Board coordinate on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub row: u8,
    pub col: u8,
}

impl From<Cell> for Pos {
    fn from(value: Cell) -> Self {
        Pos::new(value.row, value.col)
    }
}

impl From<Pos> for Cell {
    fn from(value: Pos) -> Self {
        Cell {
            row: value.row,
            col: value.col,
        }
    }
}

/// Level configuration as supplied by the level provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelSpec {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub target_score: u32,
    pub moves: u32,
    #[serde(default)]
    pub objectives: Vec<ObjectiveSpec>,
    pub rows: u8,
    pub cols: u8,
    pub kinds: Vec<String>,
    #[serde(default)]
    pub difficulty: u8,
}

/// One objective line in a level spec
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectiveSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub count: u32,
}

impl LevelSpec {
    /// Validate tag strings and convert into an engine config
    pub fn into_config(self) -> Result<LevelConfig> {
        if self.rows < 3 || self.cols < 3 {
            return Err(anyhow!("grid must be at least 3x3"));
        }
        if self.kinds.is_empty() {
            return Err(anyhow!("level needs at least one tile kind"));
        }

        let kinds = self
            .kinds
            .iter()
            .map(|s| {
                tile_match_types::TileKind::from_str(s)
                    .ok_or_else(|| anyhow!("unknown tile kind {s:?}"))
            })
            .collect::<Result<Vec<_>>>()?;

        let objectives = self
            .objectives
            .iter()
            .map(|o| {
                ObjectiveKind::from_str(&o.kind)
                    .map(|kind| Objective {
                        kind,
                        target: o.count,
                    })
                    .ok_or_else(|| anyhow!("unknown objective type {:?}", o.kind))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(LevelConfig {
            id: self.id,
            name: self.name,
            description: self.description,
            target_score: self.target_score,
            moves: self.moves,
            objectives,
            rows: self.rows,
            cols: self.cols,
            kinds,
            difficulty: self.difficulty,
        })
    }
}

impl From<&LevelConfig> for LevelSpec {
    fn from(level: &LevelConfig) -> Self {
        LevelSpec {
            id: level.id,
            name: level.name.clone(),
            description: level.description.clone(),
            target_score: level.target_score,
            moves: level.moves,
            objectives: level
                .objectives
                .iter()
                .map(|o| ObjectiveSpec {
                    kind: o.kind.as_str().to_string(),
                    count: o.target,
                })
                .collect(),
            rows: level.rows,
            cols: level.cols,
            kinds: level.kinds.iter().map(|k| k.as_str().to_string()).collect(),
            difficulty: level.difficulty,
        }
    }
}

// ============== Engine -> Client Messages ==============

/// One response line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// A run began; the initial snapshot follows
    Started { level_id: u32, snapshot: SnapshotMsg },
    /// A move resolved (or was rolled back)
    Events {
        accepted: bool,
        reshuffled: bool,
        terminal: String,
        steps: Vec<StepMsg>,
        snapshot: SnapshotMsg,
    },
    /// Answer to a `state` request
    State { snapshot: SnapshotMsg },
    /// Progress record for a persistence sink
    Save { save: SaveState },
    /// Request rejected; run state unchanged
    Error { code: String, message: String },
}

impl Response {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Response::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// One cascade step on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepMsg {
    pub depth: u32,
    pub matched: Vec<Cell>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_created: Option<SpecialCreatedMsg>,
    pub score_delta: u32,
    pub objective_deltas: Vec<ObjectiveSpec>,
    pub board: Vec<Vec<Option<CellTileMsg>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialCreatedMsg {
    pub kind: String,
    pub cell: Cell,
}

/// One occupied cell on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellTileMsg {
    pub id: u32,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special: Option<String>,
}

/// Full run snapshot on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMsg {
    pub rows: u8,
    pub cols: u8,
    pub score: u32,
    pub moves_remaining: u32,
    pub phase: String,
    pub objectives: Vec<ObjectiveSpec>,
    pub board: Vec<Vec<Option<CellTileMsg>>>,
}

/// Progress record emitted on level start and completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveState {
    pub level_id: u32,
    pub score: u32,
    pub completed: bool,
}

pub fn phase_str(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "idle",
        Phase::Swapping => "swapping",
        Phase::ProcessingMatches => "processing_matches",
        Phase::Falling => "falling",
        Phase::Refilling => "refilling",
        Phase::LevelComplete => "level_complete",
        Phase::GameOver => "game_over",
    }
}

pub fn terminal_str(terminal: Terminal) -> &'static str {
    match terminal {
        Terminal::Continue => "continue",
        Terminal::LevelComplete => "level_complete",
        Terminal::GameOver => "game_over",
    }
}

fn board_msg(snapshot: &BoardSnapshot) -> Vec<Vec<Option<CellTileMsg>>> {
    (0..snapshot.rows)
        .map(|row| {
            (0..snapshot.cols)
                .map(|col| {
                    snapshot.get(Pos::new(row, col)).map(|cell| CellTileMsg {
                        id: cell.id,
                        kind: cell.kind.as_str().to_string(),
                        special: cell.special.map(|s| s.as_str().to_string()),
                    })
                })
                .collect()
        })
        .collect()
}

pub fn snapshot_msg(snapshot: &RunSnapshot) -> SnapshotMsg {
    SnapshotMsg {
        rows: snapshot.board.rows,
        cols: snapshot.board.cols,
        score: snapshot.score,
        moves_remaining: snapshot.moves_remaining,
        phase: phase_str(snapshot.phase).to_string(),
        objectives: snapshot
            .objectives
            .iter()
            .map(|(kind, count)| ObjectiveSpec {
                kind: kind.as_str().to_string(),
                count: *count,
            })
            .collect(),
        board: board_msg(&snapshot.board),
    }
}

fn step_msg(step: &CascadeStep) -> StepMsg {
    StepMsg {
        depth: step.depth,
        matched: step.matched.iter().map(|&p| p.into()).collect(),
        special_created: step.special_created.map(|(kind, pos)| SpecialCreatedMsg {
            kind: kind.as_str().to_string(),
            cell: pos.into(),
        }),
        score_delta: step.score_delta,
        objective_deltas: step
            .objective_deltas
            .iter()
            .map(|(kind, count)| ObjectiveSpec {
                kind: kind.as_str().to_string(),
                count: *count,
            })
            .collect(),
        board: board_msg(&step.board_after),
    }
}

pub fn events_msg(outcome: &MoveOutcome, snapshot: &RunSnapshot) -> Response {
    Response::Events {
        accepted: outcome.accepted,
        reshuffled: outcome.reshuffled,
        terminal: terminal_str(outcome.terminal).to_string(),
        steps: outcome.steps.iter().map(step_msg).collect(),
        snapshot: snapshot_msg(snapshot),
    }
}
