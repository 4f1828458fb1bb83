//! Timing
//!
//! Tests that a minimax player answers fast enough to play against.
//! Only meaningful in release builds:
//! `cargo test --release --test timing -- --ignored`

use std::time::Duration;

use tempo_engine::*;

/// Let `difficulty` play both sides for `plies` plies, checking every move time.
fn move_time_tester(difficulty: Difficulty, plies: usize, limit: Duration) {
    let mut game = Game::new();
    let mut ai = MiniMaxAi::with_seed(difficulty, 2022);

    for _ in 0..plies {
        let result = ai.choose_move(&game);
        println!("{difficulty}: {} in {:?}", result.nodes, result.elapsed);
        assert!(
            result.elapsed < limit,
            "{difficulty} took {:?} at depth {}",
            result.elapsed,
            result.depth
        );

        match result.best_move {
            Some(best_move) => game.perform(best_move),
            None => break,
        }
    }
}

#[test]
#[ignore]
fn easy_moves_under_one_second() {
    move_time_tester(Difficulty::Easy, 20, Duration::from_secs(1));
}

#[test]
#[ignore]
fn medium_moves_under_three_seconds() {
    move_time_tester(Difficulty::Medium, 20, Duration::from_secs(3));
}

#[test]
#[ignore]
fn hard_moves_under_three_seconds() {
    move_time_tester(Difficulty::Hard, 20, Duration::from_secs(3));
}
