//! Performance Test
//!
//! [Perft](https://www.chessprogramming.org/Perft)
//!
//! A simple debugging and testing function used to count
//! the number of nodes at a specific depth.

use std::ops::{Add, AddAssign};
use std::panic;
use std::sync::{Mutex, PoisonError};
use std::thread;

use crate::coretypes::PlyKind;
use crate::game::Game;
use crate::movelist::MoveList;

/// Debugging information about results of perft test.
/// nodes: Number of nodes at lowest depth of perft.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct PerftInfo {
    pub nodes: u64,
}

impl PerftInfo {
    fn new(nodes: u64) -> Self {
        PerftInfo { nodes }
    }
}

impl Add for PerftInfo {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        PerftInfo {
            nodes: self.nodes + rhs.nodes,
        }
    }
}

impl AddAssign for PerftInfo {
    fn add_assign(&mut self, rhs: Self) {
        self.nodes += rhs.nodes;
    }
}

// Count the number of nodes at a certain depth.
// This ignores higher terminal nodes.
// In other words, it counts the number of paths to the given depth.
pub fn perft(game: &Game, ply: PlyKind, threads: usize) -> PerftInfo {
    let mut game = game.clone();

    // Guard easy to calculate inputs.
    if ply == 0 {
        // Ever only 1 position at 0 ply.
        return PerftInfo::new(1);
    } else if ply <= 2 || threads <= 1 {
        // Simple enough to not require threads, or single threaded.
        return perft_recurse(&mut game, ply);
    }
    debug_assert!(ply > 2);
    debug_assert!(threads > 1);

    let legal_moves = game.get_possible_moves();
    // Guard no moves to search.
    if legal_moves.is_empty() {
        return PerftInfo::new(0);
    }

    let legal_moves = Mutex::new(legal_moves);
    let game = &game;
    let legal_moves = &legal_moves;

    thread::scope(|scope| {
        // Create threads to process partitioned moves.
        let handles: Vec<_> = (0..threads)
            .map(|_| scope.spawn(move || perft_executor(game.clone(), ply, legal_moves)))
            .collect();

        // Wait for all handles to finish.
        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(perft_info) => perft_info,
                Err(payload) => panic::resume_unwind(payload),
            })
            .fold(PerftInfo::default(), Add::add)
    })
}

/// perft_executor works by stealing one move at a time from given moves list and running perft on that move.
/// When there are no moves left to steal, this function returns the data it has collected.
/// params:
/// game - game to evaluate moves on.
/// ply - ply of provided game. Must be greater than 1.
/// moves - synchronous access to list of moves to steal from. Moves must be legal for given game.
fn perft_executor(mut game: Game, ply: PlyKind, moves: &Mutex<MoveList>) -> PerftInfo {
    debug_assert!(ply > 1);
    let steal = || moves.lock().unwrap_or_else(PoisonError::into_inner).pop();
    let mut perft_info = PerftInfo::new(0);

    while let Some(move_) = steal() {
        game.perform(move_);
        perft_info += perft_recurse(&mut game, ply - 1);
        game.undo_move();
    }

    perft_info
}

/// Ply must be non-zero.
fn perft_recurse(game: &mut Game, ply: PlyKind) -> PerftInfo {
    debug_assert_ne!(ply, 0);
    let legal_moves = game.get_possible_moves();
    if ply == 1 {
        // If we reach the depth before the end,
        // return the count of legal moves.
        PerftInfo::new(legal_moves.len() as u64)
    } else {
        let mut perft_info = PerftInfo::new(0);
        for legal_move in legal_moves {
            game.perform(legal_move);
            perft_info += perft_recurse(game, ply - 1);
            game.undo_move();
        }
        perft_info
    }
}
