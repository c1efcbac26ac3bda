//! Headless self-play simulator (default binary).
//!
//! Plays the practice level with a first-valid-move policy and prints each
//! cascade as it resolves. Useful for eyeballing engine behavior and as a
//! smoke test; a real front end would drive the engine through the adapter
//! protocol instead.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use tile_match::engine::{GameRun, LevelConfig, MoveOutcome};
use tile_match::types::{Pos, Terminal};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let seed: u32 = std::env::args()
        .nth(1)
        .map(|arg| arg.parse())
        .transpose()?
        .unwrap_or(1);

    let mut run = GameRun::start(LevelConfig::practice(), seed);
    println!(
        "level {:?} seed {} target {} moves {}",
        run.level().name,
        seed,
        run.level().target_score,
        run.moves_remaining()
    );
    print_board(&run);

    loop {
        let Some((a, b, outcome)) = play_first_valid_move(&mut run) else {
            println!("no playable move found");
            break;
        };

        println!(
            "swap ({},{}) <-> ({},{}): {} step(s), score {}",
            a.row,
            a.col,
            b.row,
            b.col,
            outcome.steps.len(),
            run.score()
        );
        for step in &outcome.steps {
            let spawned = match step.special_created {
                Some((kind, pos)) => format!(", spawned {} at ({},{})", kind.as_str(), pos.row, pos.col),
                None => String::new(),
            };
            println!(
                "  depth {}: cleared {} for {} points{}",
                step.depth,
                step.matched.len(),
                step.score_delta,
                spawned
            );
        }
        if outcome.reshuffled {
            println!("  board deadlocked, reshuffled");
        }
        print_board(&run);

        match outcome.terminal {
            Terminal::Continue => {}
            Terminal::LevelComplete => {
                println!("level complete! score {}", run.score());
                break;
            }
            Terminal::GameOver => {
                println!("out of moves at score {}", run.score());
                break;
            }
        }
    }

    Ok(())
}

/// Scan right/down neighbor pairs and play the first swap the engine
/// accepts
fn play_first_valid_move(run: &mut GameRun) -> Option<(Pos, Pos, MoveOutcome)> {
    let rows = run.board().rows();
    let cols = run.board().cols();

    for row in 0..rows {
        for col in 0..cols {
            let here = Pos::new(row, col);
            let neighbors = [
                (col + 1 < cols).then(|| Pos::new(row, col + 1)),
                (row + 1 < rows).then(|| Pos::new(row + 1, col)),
            ];
            for other in neighbors.into_iter().flatten() {
                match run.submit_move(here, other) {
                    Ok(outcome) if outcome.accepted => return Some((here, other, outcome)),
                    Ok(_) => {}
                    Err(_) => return None,
                }
            }
        }
    }

    None
}

fn print_board(run: &GameRun) {
    let board = run.board();
    for row in 0..board.rows() {
        let mut line = String::with_capacity(board.cols() as usize * 2);
        for col in 0..board.cols() {
            let ch = match board.get(Pos::new(row, col)) {
                Some(tile) if tile.is_special() => tile
                    .kind
                    .as_str()
                    .chars()
                    .next()
                    .unwrap_or('?')
                    .to_ascii_uppercase(),
                Some(tile) => tile.kind.as_str().chars().next().unwrap_or('?'),
                None => '.',
            };
            line.push(ch);
            line.push(' ');
        }
        println!("{line}");
    }
    println!(
        "score {} moves {} phase {:?}",
        run.score(),
        run.moves_remaining(),
        run.phase()
    );
}
