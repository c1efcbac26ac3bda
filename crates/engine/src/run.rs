//! Game run - the resolution state machine
//!
//! Owns the board for the duration of one level attempt and drives the
//! swap -> match -> collapse -> refill cascade to a stable state on every
//! accepted move. All resolution is synchronous: a call to
//! [`GameRun::submit_move`] or [`GameRun::activate_special`] returns only
//! once the board is stable again, reporting every intermediate cascade
//! step as an event with a frozen board snapshot. Animation pacing between
//! those steps is the caller's concern, never the engine's.
//!
//! The run is the board's single writer. Detection and generation always
//! see it between mutations, so no torn state is observable.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use tile_match_core::generator::{self, TileSource};
use tile_match_core::matcher::{find_matches, find_special_matches, SpecialMatch};
use tile_match_core::scoring;
use tile_match_core::snapshot::BoardSnapshot;
use tile_match_core::Board;
use tile_match_types::{Phase, Pos, SpecialKind, Terminal, BOMB_RADIUS};

use crate::error::{EngineError, EngineResult};
use crate::level::{is_level_complete, LevelConfig, ObjectiveCounts, ObjectiveKind};

/// One resolved step of a cascade, in the order it happened
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeStep {
    /// 0 for the step caused directly by the player, 1+ for chain steps
    pub depth: u32,
    /// Positions cleared in this step (as they were before the collapse)
    pub matched: Vec<Pos>,
    /// Special tile spawned by this step, if any
    pub special_created: Option<(SpecialKind, Pos)>,
    /// Points awarded by this step
    pub score_delta: u32,
    /// Objective counters advanced by this step
    pub objective_deltas: Vec<(ObjectiveKind, u32)>,
    /// The board after this step's collapse and refill
    pub board_after: BoardSnapshot,
}

/// Everything a caller learns from one submitted move
#[derive(Debug, Clone, PartialEq)]
pub struct MoveOutcome {
    /// False for a legal swap that matched nothing: the board was rolled
    /// back and no move was consumed
    pub accepted: bool,
    /// Cascade steps, empty when the move was not accepted
    pub steps: Vec<CascadeStep>,
    /// Whether a deadlock reshuffle rebuilt the board afterwards
    pub reshuffled: bool,
    pub terminal: Terminal,
}

/// A frozen view of the whole run for rendering or persistence
#[derive(Debug, Clone, PartialEq)]
pub struct RunSnapshot {
    pub board: BoardSnapshot,
    pub score: u32,
    pub moves_remaining: u32,
    pub phase: Phase,
    pub objectives: Vec<(ObjectiveKind, u32)>,
    pub seed: u32,
}

/// One level attempt: board, score, move budget and objective progress
#[derive(Debug, Clone)]
pub struct GameRun {
    level: LevelConfig,
    board: Board,
    tiles: TileSource,
    score: u32,
    moves_remaining: u32,
    counts: ObjectiveCounts,
    phase: Phase,
}

impl GameRun {
    /// Start a fresh run: build a no-prematch board from the level's kind
    /// set and seed the move budget
    pub fn start(level: LevelConfig, seed: u32) -> Self {
        let mut tiles = TileSource::new(seed);
        let board = generator::generate(level.rows, level.cols, &level.kinds, &mut tiles);
        let moves = level.moves;

        let mut run = Self {
            level,
            board,
            tiles,
            score: 0,
            moves_remaining: moves,
            counts: ObjectiveCounts::new(),
            phase: Phase::Idle,
        };
        // A generated board can, rarely, start without a playable swap.
        run.ensure_valid_moves();
        debug!(level = run.level.id, seed, moves, "run started");
        run
    }

    /// Build a run over a prepared board, taking it as-is. Intended for
    /// scenario tests and tooling; no no-prematch guarantee applies.
    pub fn with_board(level: LevelConfig, board: Board, seed: u32) -> Self {
        let moves = level.moves;
        Self {
            level,
            board,
            tiles: TileSource::new(seed),
            score: 0,
            moves_remaining: moves,
            counts: ObjectiveCounts::new(),
            phase: Phase::Idle,
        }
    }

    pub fn level(&self) -> &LevelConfig {
        &self.level
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn moves_remaining(&self) -> u32 {
        self.moves_remaining
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn objective_count(&self, kind: ObjectiveKind) -> u32 {
        self.counts.get(kind)
    }

    pub fn counts(&self) -> &ObjectiveCounts {
        &self.counts
    }

    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            board: BoardSnapshot::capture(&self.board),
            score: self.score,
            moves_remaining: self.moves_remaining,
            phase: self.phase,
            objectives: self.counts.iter().collect(),
            seed: self.tiles.seed(),
        }
    }

    /// Submit a player swap of two adjacent cells
    ///
    /// A swap endpoint that is a special tile routes to activation instead
    /// of the generic swap path. A swap that creates no match is rolled
    /// back and consumes nothing (`accepted: false`). Otherwise one move is
    /// consumed and the full cascade resolves before returning.
    pub fn submit_move(&mut self, a: Pos, b: Pos) -> EngineResult<MoveOutcome> {
        self.guard_input()?;

        if !a.is_adjacent(&b) {
            return Err(EngineError::NotAdjacent { a, b });
        }
        let tile_a = *self.board.get(a).ok_or(EngineError::CellEmpty { pos: a })?;
        let tile_b = *self.board.get(b).ok_or(EngineError::CellEmpty { pos: b })?;

        // A special endpoint activates instead of swapping.
        if let Some(kind) = tile_a.special {
            return Ok(self.activate(a, kind, b));
        }
        if let Some(kind) = tile_b.special {
            return Ok(self.activate(b, kind, a));
        }

        self.phase = Phase::Swapping;
        self.board.swap(a, b);

        if find_matches(&self.board).is_empty() {
            // Nothing matched: restore the cells, keep the move.
            self.board.swap(a, b);
            self.phase = Phase::Idle;
            debug!(?a, ?b, "swap rejected, no match");
            return Ok(MoveOutcome {
                accepted: false,
                steps: Vec::new(),
                reshuffled: false,
                terminal: Terminal::Continue,
            });
        }

        self.moves_remaining -= 1;
        debug!(?a, ?b, moves_remaining = self.moves_remaining, "swap accepted");

        let mut steps = Vec::new();
        self.cascade(&mut steps, 0);
        Ok(self.finish(steps))
    }

    /// Activate the special tile at `special` against `target`
    ///
    /// Exposed for callers that distinguish activation gestures from
    /// swaps; `submit_move` routes here automatically when an endpoint is
    /// special. Adjacency is not required on this path.
    pub fn activate_special(&mut self, special: Pos, target: Pos) -> EngineResult<MoveOutcome> {
        self.guard_input()?;

        let tile = *self
            .board
            .get(special)
            .ok_or(EngineError::CellEmpty { pos: special })?;
        let Some(kind) = tile.special else {
            return Err(EngineError::NotSpecial { pos: special });
        };
        if self.board.is_empty_cell(target) {
            return Err(EngineError::CellEmpty { pos: target });
        }

        Ok(self.activate(special, kind, target))
    }

    fn guard_input(&self) -> EngineResult<()> {
        if self.phase.is_terminal() {
            return Err(EngineError::Finished);
        }
        if self.moves_remaining == 0 {
            return Err(EngineError::OutOfMoves);
        }
        Ok(())
    }

    /// Resolve a special-tile activation: compute the affected set, clear
    /// it (plus the special itself), then cascade as usual. Always
    /// consumes one move, even when a rainbow has no resolvable target.
    fn activate(&mut self, special_pos: Pos, special: SpecialKind, target_pos: Pos) -> MoveOutcome {
        let affected: Vec<Pos> = match special {
            SpecialKind::Bomb => self
                .board
                .cells_in_radius(special_pos, BOMB_RADIUS)
                .into_iter()
                .filter(|&p| !self.board.is_empty_cell(p))
                .collect(),
            SpecialKind::Rainbow => match self.board.get(target_pos) {
                // Dragging a rainbow onto another special leaves no kind to
                // resolve: empty effect, move still consumed.
                Some(t) if t.is_special() => Vec::new(),
                Some(t) => {
                    let wanted = t.kind;
                    self.board
                        .tiles()
                        .filter(|t| t.kind == wanted)
                        .map(|t| t.pos)
                        .collect()
                }
                None => Vec::new(),
            },
        };

        self.moves_remaining -= 1;
        self.phase = Phase::ProcessingMatches;
        debug!(
            special = special.as_str(),
            affected = affected.len(),
            moves_remaining = self.moves_remaining,
            "special activated"
        );

        let score_delta = scoring::special_blast_score(affected.len());
        self.score += score_delta;

        let mut deltas: BTreeMap<ObjectiveKind, u32> = BTreeMap::new();
        for &pos in &affected {
            if let Some(t) = self.board.get(pos) {
                *deltas.entry(ObjectiveKind::Tile(t.kind)).or_insert(0) += 1;
            }
        }
        for (kind, by) in &deltas {
            self.counts.increment(*kind, *by);
        }

        let mut removed = affected;
        removed.push(special_pos);
        removed.sort_unstable();
        removed.dedup();
        for &pos in &removed {
            self.board.take(pos);
        }

        self.fall_and_refill();

        let mut steps = vec![CascadeStep {
            depth: 0,
            matched: removed,
            special_created: None,
            score_delta,
            objective_deltas: deltas.into_iter().collect(),
            board_after: BoardSnapshot::capture(&self.board),
        }];

        self.cascade(&mut steps, 1);
        self.finish(steps)
    }

    /// Run match resolution until the board is stable. Chain steps cost no
    /// extra moves.
    fn cascade(&mut self, steps: &mut Vec<CascadeStep>, first_depth: u32) {
        let mut depth = first_depth;
        loop {
            self.phase = Phase::ProcessingMatches;

            // Special-producing shapes take priority over plain removal.
            let step = if let Some(shape) = find_special_matches(&self.board) {
                self.apply_special_spawn(shape, depth)
            } else {
                let matches = find_matches(&self.board);
                if matches.is_empty() {
                    break;
                }
                self.apply_ordinary(matches.positions().to_vec(), depth)
            };

            steps.push(step);
            depth += 1;
        }
    }

    /// Consume a special-producing shape: its cells vanish, the new
    /// special tile spawns in their place, and only the special's own
    /// objective counter advances (never the consumed tiles' kinds).
    fn apply_special_spawn(&mut self, shape: SpecialMatch, depth: u32) -> CascadeStep {
        for &pos in &shape.cells {
            self.board.take(pos);
        }
        let spawned = self
            .tiles
            .fresh_special(shape.from_kind, shape.special, shape.spawn);
        self.board.place(spawned);

        self.counts
            .increment(ObjectiveKind::Special(shape.special), 1);
        let score_delta = scoring::special_spawn_score(shape.cells.len());
        self.score += score_delta;
        debug!(
            depth,
            special = shape.special.as_str(),
            spawn = ?shape.spawn,
            "special tile created"
        );

        self.fall_and_refill();

        let mut matched = shape.cells;
        matched.sort_unstable();
        CascadeStep {
            depth,
            matched,
            special_created: Some((shape.special, shape.spawn)),
            score_delta,
            objective_deltas: vec![(ObjectiveKind::Special(shape.special), 1)],
            board_after: BoardSnapshot::capture(&self.board),
        }
    }

    /// Consume an ordinary match set: tiered score, one objective
    /// increment per removed tile's kind
    fn apply_ordinary(&mut self, matched: Vec<Pos>, depth: u32) -> CascadeStep {
        let mut deltas: BTreeMap<ObjectiveKind, u32> = BTreeMap::new();
        for &pos in &matched {
            if let Some(tile) = self.board.take(pos) {
                *deltas.entry(ObjectiveKind::Tile(tile.kind)).or_insert(0) += 1;
            }
        }
        for (kind, by) in &deltas {
            self.counts.increment(*kind, *by);
        }

        let score_delta = scoring::match_score(matched.len());
        self.score += score_delta;
        debug!(depth, cleared = matched.len(), score_delta, "match cleared");

        self.fall_and_refill();

        CascadeStep {
            depth,
            matched,
            special_created: None,
            score_delta,
            objective_deltas: deltas.into_iter().collect(),
            board_after: BoardSnapshot::capture(&self.board),
        }
    }

    fn fall_and_refill(&mut self) {
        self.phase = Phase::Falling;
        self.board.compact_columns();

        self.phase = Phase::Refilling;
        generator::refill_columns(&mut self.board, &self.level.kinds, &mut self.tiles);
    }

    /// Evaluate terminal conditions once the cascade has settled
    fn finish(&mut self, steps: Vec<CascadeStep>) -> MoveOutcome {
        let terminal = if is_level_complete(&self.level, self.score, &self.counts) {
            self.phase = Phase::LevelComplete;
            Terminal::LevelComplete
        } else if self.moves_remaining == 0 {
            self.phase = Phase::GameOver;
            Terminal::GameOver
        } else {
            self.phase = Phase::Idle;
            Terminal::Continue
        };

        let reshuffled = terminal == Terminal::Continue && self.ensure_valid_moves();
        if terminal != Terminal::Continue {
            debug!(?terminal, score = self.score, "run ended");
        }

        MoveOutcome {
            accepted: true,
            steps,
            reshuffled,
            terminal,
        }
    }

    /// Reshuffle the board if it is deadlocked
    ///
    /// The engine already runs this check whenever a move settles back to
    /// `Idle`; hosts can also invoke it directly (after restoring a saved
    /// board, for instance). Returns whether a reshuffle happened.
    pub fn reshuffle_if_needed(&mut self) -> bool {
        self.ensure_valid_moves()
    }

    /// Reshuffle on deadlock. Rebuilds the board from the distinct kinds
    /// still present among non-special tiles; score, moves and objective
    /// progress are untouched. Returns whether a reshuffle happened.
    fn ensure_valid_moves(&mut self) -> bool {
        if has_valid_moves(&self.board) {
            return false;
        }

        let present: BTreeSet<_> = self
            .board
            .tiles()
            .filter(|t| !t.is_special())
            .map(|t| t.kind)
            .collect();
        let kinds: Vec<_> = if present.is_empty() {
            self.level.kinds.clone()
        } else {
            present.into_iter().collect()
        };

        debug!(kinds = kinds.len(), "deadlock: reshuffling board");
        self.board =
            generator::generate(self.level.rows, self.level.cols, &kinds, &mut self.tiles);
        true
    }
}

/// True iff some adjacent pair would produce a match when swapped, or some
/// adjacent pair involves a special tile (activation always has an
/// effect). Checking every right- and down-neighbor pair covers all swaps
/// by symmetry.
pub fn has_valid_moves(board: &Board) -> bool {
    let mut probe = board.clone();

    for row in 0..board.rows() {
        for col in 0..board.cols() {
            let here = Pos::new(row, col);
            let right = (col + 1 < board.cols()).then(|| Pos::new(row, col + 1));
            let down = (row + 1 < board.rows()).then(|| Pos::new(row + 1, col));

            for other in [right, down].into_iter().flatten() {
                if board.is_empty_cell(here) || board.is_empty_cell(other) {
                    continue;
                }
                let any_special = board.get(here).is_some_and(|t| t.is_special())
                    || board.get(other).is_some_and(|t| t.is_special());
                if any_special || swap_creates_match(&mut probe, here, other) {
                    return true;
                }
            }
        }
    }

    false
}

/// Hypothetically swap, detect, swap back
fn swap_creates_match(board: &mut Board, a: Pos, b: Pos) -> bool {
    board.swap(a, b);
    let hit = !find_matches(board).is_empty();
    board.swap(a, b);
    hit
}

#[cfg(test)]
mod tests {
    use super::*;
    use tile_match_core::Tile;
    use tile_match_types::{TileId, TileKind};

    // Build a board from kind initials; '.' leaves a cell empty. Specials
    // are added afterwards via make_special.
    fn board_from(rows: &[&str]) -> Board {
        let mut board = Board::new(rows.len() as u8, rows[0].len() as u8);
        let mut id = 1000u32;
        for (r, line) in rows.iter().enumerate() {
            for (c, ch) in line.chars().enumerate() {
                if ch == '.' {
                    continue;
                }
                id += 1;
                board.place(Tile {
                    id: TileId::new(id),
                    kind: kind_from_char(ch),
                    pos: Pos::new(r as u8, c as u8),
                    special: None,
                });
            }
        }
        board
    }

    fn kind_from_char(ch: char) -> TileKind {
        match ch {
            'b' => TileKind::Blue,
            'o' => TileKind::Orange,
            'p' => TileKind::Purple,
            'g' => TileKind::Green,
            'r' => TileKind::Red,
            'y' => TileKind::Yellow,
            'k' => TileKind::Pink,
            't' => TileKind::Teal,
            _ => panic!("unknown kind char {ch}"),
        }
    }

    fn make_special(board: &mut Board, pos: Pos, special: SpecialKind) {
        let tile = board.get_mut(pos).expect("cell occupied");
        tile.special = Some(special);
    }

    fn run_over(board: Board) -> GameRun {
        GameRun::with_board(LevelConfig::practice(), board, 42)
    }

    #[test]
    fn test_start_builds_full_board() {
        let run = GameRun::start(LevelConfig::practice(), 12345);
        assert_eq!(run.board().tile_count(), 64);
        assert_eq!(run.moves_remaining(), 20);
        assert_eq!(run.score(), 0);
        assert_eq!(run.phase(), Phase::Idle);
    }

    #[test]
    fn test_non_adjacent_swap_rejected() {
        let mut run = GameRun::start(LevelConfig::practice(), 1);
        let err = run.submit_move(Pos::new(0, 0), Pos::new(0, 2)).unwrap_err();
        assert_eq!(
            err,
            EngineError::NotAdjacent {
                a: Pos::new(0, 0),
                b: Pos::new(0, 2)
            }
        );
        assert_eq!(run.moves_remaining(), 20);
    }

    #[test]
    fn test_diagonal_swap_rejected() {
        let mut run = GameRun::start(LevelConfig::practice(), 1);
        let err = run.submit_move(Pos::new(0, 0), Pos::new(1, 1)).unwrap_err();
        assert!(matches!(err, EngineError::NotAdjacent { .. }));
    }

    #[test]
    fn test_no_match_swap_rolls_back_and_keeps_move() {
        // Swapping (0,0) and (0,1) creates nothing on this board.
        let board = board_from(&["bogr", "ogrb", "grbo", "rbog"]);
        let before = board.clone();
        let mut run = run_over(board);

        let outcome = run.submit_move(Pos::new(0, 0), Pos::new(0, 1)).unwrap();

        assert!(!outcome.accepted);
        assert!(outcome.steps.is_empty());
        assert_eq!(outcome.terminal, Terminal::Continue);
        assert_eq!(run.moves_remaining(), 20);
        assert_eq!(run.score(), 0);
        assert_eq!(*run.board(), before);
    }

    #[test]
    fn test_matching_swap_consumes_one_move() {
        // Swapping (1,0) into the top row completes a blue 3-run.
        let board = board_from(&["obbt", "bogr", "rtky", "ygot"]);
        let mut run = run_over(board);

        let outcome = run.submit_move(Pos::new(1, 0), Pos::new(0, 0)).unwrap();

        assert!(outcome.accepted);
        assert_eq!(run.moves_remaining(), 19);
        assert!(!outcome.steps.is_empty());
        assert_eq!(outcome.steps[0].depth, 0);
        assert_eq!(outcome.steps[0].score_delta, 50);
        assert_eq!(
            outcome.steps[0].objective_deltas,
            vec![(ObjectiveKind::Tile(TileKind::Blue), 3)]
        );
    }

    #[test]
    fn test_board_full_after_every_step() {
        let board = board_from(&["obbt", "bogr", "rtky", "ygot"]);
        let mut run = run_over(board);

        let outcome = run.submit_move(Pos::new(1, 0), Pos::new(0, 0)).unwrap();
        assert!(outcome.accepted);
        assert_eq!(run.board().tile_count(), 16);
        for step in &outcome.steps {
            assert_eq!(step.board_after.cells().count(), 16);
        }
    }

    #[test]
    fn test_four_run_swap_spawns_bomb_and_counts_bomb_objective() {
        // 8x8 board tiled with a 4-kind diagonal pattern (no runs), with
        // blues planted so that swapping (3,4) down completes a horizontal
        // blue 4-run on row 3 at cols 2..=5.
        let board = board_from(&[
            "ogrtogrt",
            "grtogrto",
            "rtogrtog",
            "tobbtbgr",
            "ogrtbgrt",
            "grtogrto",
            "rtogrtog",
            "togrtogr",
        ]);
        // Keep blue out of the refill pool so the blue counter can only
        // move if the engine wrongly credits the consumed run.
        let mut level = LevelConfig::practice();
        level.kinds = vec![TileKind::Orange, TileKind::Green, TileKind::Red, TileKind::Teal];
        let mut run = GameRun::with_board(level, board, 42);

        let outcome = run.submit_move(Pos::new(3, 4), Pos::new(4, 4)).unwrap();
        assert!(outcome.accepted);

        let step = &outcome.steps[0];
        assert_eq!(
            step.special_created,
            Some((SpecialKind::Bomb, Pos::new(3, 2)))
        );
        assert_eq!(step.score_delta, 4 * 20);
        assert_eq!(
            step.objective_deltas,
            vec![(ObjectiveKind::Special(SpecialKind::Bomb), 1)]
        );
        // Creation advances the bomb counter, never the consumed kind.
        assert_eq!(run.objective_count(ObjectiveKind::Tile(TileKind::Blue)), 0);
        assert!(run.objective_count(ObjectiveKind::Special(SpecialKind::Bomb)) >= 1);
    }

    #[test]
    fn test_bomb_activation_clears_neighborhood() {
        let mut board = board_from(&["bogr", "ogrb", "grbo", "rbog"]);
        make_special(&mut board, Pos::new(1, 1), SpecialKind::Bomb);
        let mut run = run_over(board);

        let outcome = run.submit_move(Pos::new(1, 1), Pos::new(1, 2)).unwrap();

        assert!(outcome.accepted);
        assert_eq!(run.moves_remaining(), 19);
        let step = &outcome.steps[0];
        // 3x3 neighborhood, all occupied: 9 affected tiles.
        assert_eq!(step.matched.len(), 9);
        assert_eq!(step.score_delta, 9 * 30);
        // Bomb itself carries a legacy kind and is counted like the rest.
        let total: u32 = step.objective_deltas.iter().map(|(_, n)| n).sum();
        assert_eq!(total, 9);
    }

    #[test]
    fn test_bomb_activation_at_corner_clips() {
        let mut board = board_from(&["bogr", "ogrb", "grbo", "rbog"]);
        make_special(&mut board, Pos::new(0, 0), SpecialKind::Bomb);
        let mut run = run_over(board);

        let outcome = run.submit_move(Pos::new(0, 0), Pos::new(0, 1)).unwrap();
        assert_eq!(outcome.steps[0].matched.len(), 4);
        assert_eq!(outcome.steps[0].score_delta, 4 * 30);
    }

    #[test]
    fn test_rainbow_activation_clears_target_kind() {
        let mut board = board_from(&["bogr", "ogrb", "grbo", "rbog"]);
        make_special(&mut board, Pos::new(2, 2), SpecialKind::Rainbow);
        // Orange stays out of the refill pool so the counter is exact.
        let mut level = LevelConfig::practice();
        level.kinds = vec![TileKind::Blue, TileKind::Green, TileKind::Red, TileKind::Purple];
        let mut run = GameRun::with_board(level, board, 42);

        // Target (2,3) is orange; the board holds 4 oranges but (2,2) is
        // now special, so 3 ordinary oranges plus... the rainbow's legacy
        // kind is blue, so exactly the oranges are affected.
        let outcome = run.submit_move(Pos::new(2, 2), Pos::new(2, 3)).unwrap();

        let step = &outcome.steps[0];
        // 4 oranges on the board, none special: all affected, plus the
        // rainbow itself is removed.
        assert_eq!(step.score_delta, 4 * 30);
        assert_eq!(step.matched.len(), 5);
        assert_eq!(
            run.objective_count(ObjectiveKind::Tile(TileKind::Orange)),
            4
        );
    }

    #[test]
    fn test_rainbow_on_special_is_noop_but_consumes_move() {
        let mut board = board_from(&["bogr", "ogrb", "grbo", "rbog"]);
        make_special(&mut board, Pos::new(1, 1), SpecialKind::Rainbow);
        make_special(&mut board, Pos::new(1, 2), SpecialKind::Bomb);
        let mut run = run_over(board);

        let outcome = run.submit_move(Pos::new(1, 1), Pos::new(1, 2)).unwrap();

        assert!(outcome.accepted);
        assert_eq!(run.moves_remaining(), 19);
        let step = &outcome.steps[0];
        assert_eq!(step.score_delta, 0);
        // Only the rainbow itself is removed.
        assert_eq!(step.matched, vec![Pos::new(1, 1)]);
    }

    #[test]
    fn test_activate_special_rejects_ordinary_tile() {
        let board = board_from(&["bogr", "ogrb", "grbo", "rbog"]);
        let mut run = run_over(board);

        let err = run
            .activate_special(Pos::new(0, 0), Pos::new(0, 1))
            .unwrap_err();
        assert_eq!(err, EngineError::NotSpecial { pos: Pos::new(0, 0) });
    }

    #[test]
    fn test_moves_do_not_decrement_per_cascade_step() {
        let mut run = GameRun::start(LevelConfig::practice(), 777);
        let before = run.moves_remaining();

        // Find and play any accepted move.
        let outcome = first_accepted_move(&mut run);
        if let Some(outcome) = outcome {
            assert_eq!(run.moves_remaining(), before - 1);
            assert!(outcome.steps.len() >= 1);
        }
    }

    #[test]
    fn test_last_move_without_completion_is_game_over() {
        let board = board_from(&["obbt", "bogr", "rtky", "ygot"]);
        let mut level = LevelConfig::practice();
        level.moves = 1;
        level.target_score = 1_000_000;
        let mut run = GameRun::with_board(level, board, 9);

        let outcome = run.submit_move(Pos::new(1, 0), Pos::new(0, 0)).unwrap();

        assert_eq!(outcome.terminal, Terminal::GameOver);
        assert_eq!(run.phase(), Phase::GameOver);
        assert!(run.submit_move(Pos::new(0, 0), Pos::new(0, 1)).is_err());
    }

    #[test]
    fn test_rejected_swap_with_one_move_left_is_not_game_over() {
        let board = board_from(&["bogr", "ogrb", "grbo", "rbog"]);
        let mut level = LevelConfig::practice();
        level.moves = 1;
        let mut run = GameRun::with_board(level, board, 9);

        let outcome = run.submit_move(Pos::new(0, 0), Pos::new(0, 1)).unwrap();

        assert!(!outcome.accepted);
        assert_eq!(outcome.terminal, Terminal::Continue);
        assert_eq!(run.moves_remaining(), 1);
        assert_eq!(run.phase(), Phase::Idle);
    }

    #[test]
    fn test_level_complete_on_score() {
        let board = board_from(&["obbt", "bogr", "rtky", "ygot"]);
        let mut level = LevelConfig::practice();
        level.target_score = 50;
        let mut run = GameRun::with_board(level, board, 9);

        let outcome = run.submit_move(Pos::new(1, 0), Pos::new(0, 0)).unwrap();

        // The first step alone scores 50; cascades can only add to it.
        assert_eq!(outcome.terminal, Terminal::LevelComplete);
        assert_eq!(run.phase(), Phase::LevelComplete);
        assert_eq!(run.submit_move(Pos::new(2, 0), Pos::new(2, 1)).unwrap_err(), EngineError::Finished);
    }

    #[test]
    fn test_objective_gates_completion_despite_score() {
        let board = board_from(&["obbt", "bogr", "rtky", "ygot"]);
        let mut level = LevelConfig::practice();
        level.target_score = 50;
        level.objectives = vec![crate::level::Objective {
            kind: ObjectiveKind::Tile(TileKind::Teal),
            target: 50,
        }];
        let mut run = GameRun::with_board(level, board, 9);

        let outcome = run.submit_move(Pos::new(1, 0), Pos::new(0, 0)).unwrap();
        assert_eq!(outcome.terminal, Terminal::Continue);
    }

    #[test]
    fn test_has_valid_moves_spots_simple_swap() {
        let board = board_from(&["obbt", "bogr", "rtky", "ygot"]);
        assert!(has_valid_moves(&board));
    }

    #[test]
    fn test_has_valid_moves_false_on_deadlock() {
        // Diagonal stripes of four kinds: no swap can line up 3.
        let board = board_from(&["bogr", "ogrb", "grbo", "rbog"]);
        assert!(!has_valid_moves(&board));
    }

    #[test]
    fn test_special_tile_makes_board_playable() {
        let mut board = board_from(&["bogr", "ogrb", "grbo", "rbog"]);
        make_special(&mut board, Pos::new(1, 1), SpecialKind::Bomb);
        assert!(has_valid_moves(&board));
    }

    #[test]
    fn test_probe_leaves_board_untouched() {
        let board = board_from(&["obbt", "bogr", "rtky", "ygot"]);
        let copy = board.clone();
        let _ = has_valid_moves(&board);
        assert_eq!(board, copy);
    }

    fn first_accepted_move(run: &mut GameRun) -> Option<MoveOutcome> {
        let rows = run.board().rows();
        let cols = run.board().cols();
        for row in 0..rows {
            for col in 0..cols {
                let here = Pos::new(row, col);
                for other in [
                    (col + 1 < cols).then(|| Pos::new(row, col + 1)),
                    (row + 1 < rows).then(|| Pos::new(row + 1, col)),
                ]
                .into_iter()
                .flatten()
                {
                    if let Ok(outcome) = run.submit_move(here, other) {
                        if outcome.accepted {
                            return Some(outcome);
                        }
                    }
                }
            }
        }
        None
    }
}
