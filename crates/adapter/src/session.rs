//! Session module - dispatch requests against one engine run
//!
//! A [`Session`] owns at most one [`GameRun`] and translates protocol
//! requests into engine calls. [`run_lines`] wires a session to any
//! `BufRead`/`Write` pair as a blocking line-delimited JSON loop; the
//! transport (stdio pipe, socket, test buffer) is the host's choice.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};

use tile_match_engine::{EngineError, EngineResult, GameRun, MoveOutcome};
use tile_match_types::{Pos, Terminal};

use crate::protocol::{events_msg, snapshot_msg, Cell, LevelSpec, Request, Response, SaveState};

/// One protocol conversation: holds the run between requests
#[derive(Debug, Default)]
pub struct Session {
    run: Option<GameRun>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(&self) -> Option<&GameRun> {
        self.run.as_ref()
    }

    /// Handle one request, producing the response lines in order
    pub fn handle(&mut self, request: Request) -> Vec<Response> {
        match request {
            Request::StartLevel { level, seed } => self.handle_start(level, seed),
            Request::Move { a, b } => self.handle_input(a, b, |run, a, b| run.submit_move(a, b)),
            Request::Activate { special, target } => {
                self.handle_input(special, target, |run, a, b| run.activate_special(a, b))
            }
            Request::State => match &self.run {
                Some(run) => vec![Response::State {
                    snapshot: snapshot_msg(&run.snapshot()),
                }],
                None => vec![Response::error("run_not_started", "no level in progress")],
            },
        }
    }

    fn handle_start(&mut self, level: LevelSpec, seed: u32) -> Vec<Response> {
        let config = match level.into_config() {
            Ok(config) => config,
            Err(err) => return vec![Response::error("bad_level", err.to_string())],
        };

        let run = GameRun::start(config, seed);
        let started = Response::Started {
            level_id: run.level().id,
            snapshot: snapshot_msg(&run.snapshot()),
        };
        let save = Response::Save {
            save: SaveState {
                level_id: run.level().id,
                score: 0,
                completed: false,
            },
        };
        self.run = Some(run);
        vec![started, save]
    }

    fn handle_input(
        &mut self,
        a: Cell,
        b: Cell,
        apply: impl FnOnce(&mut GameRun, Pos, Pos) -> EngineResult<MoveOutcome>,
    ) -> Vec<Response> {
        let Some(run) = self.run.as_mut() else {
            return vec![Response::error("run_not_started", "no level in progress")];
        };

        // Bounds are validated here; the engine treats out-of-bounds
        // coordinates as a caller contract violation.
        for cell in [a, b] {
            if cell.row >= run.board().rows() || cell.col >= run.board().cols() {
                return vec![Response::error(
                    "out_of_bounds",
                    format!("cell ({}, {}) is off the board", cell.row, cell.col),
                )];
            }
        }

        match apply(run, a.into(), b.into()) {
            Ok(outcome) => {
                let mut responses = vec![events_msg(&outcome, &run.snapshot())];
                if outcome.terminal == Terminal::LevelComplete {
                    responses.push(Response::Save {
                        save: SaveState {
                            level_id: run.level().id,
                            score: run.score(),
                            completed: true,
                        },
                    });
                }
                responses
            }
            Err(err) => vec![Response::error(error_code(err), err.to_string())],
        }
    }
}

fn error_code(err: EngineError) -> &'static str {
    match err {
        EngineError::Finished => "finished",
        EngineError::OutOfMoves => "out_of_moves",
        EngineError::CellEmpty { .. } => "cell_empty",
        EngineError::NotAdjacent { .. } => "not_adjacent",
        EngineError::NotSpecial { .. } => "not_special",
    }
}

/// Serve line-delimited JSON over the given reader/writer until EOF
pub fn run_lines<R: BufRead, W: Write>(reader: R, mut writer: W) -> Result<()> {
    let mut session = Session::new();

    for line in reader.lines() {
        let line = line.context("reading request line")?;
        if line.trim().is_empty() {
            continue;
        }

        let responses = match serde_json::from_str::<Request>(&line) {
            Ok(request) => session.handle(request),
            Err(err) => vec![Response::error("bad_request", err.to_string())],
        };

        for response in responses {
            serde_json::to_writer(&mut writer, &response).context("encoding response")?;
            writer.write_all(b"\n").context("writing response line")?;
        }
    }

    Ok(())
}
