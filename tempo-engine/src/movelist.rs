//! MoveList types used in Tempo engine.
//!
//! A single piece never has more than `MAX_PIECE_MOVES` moves, so its moves fit in
//! a fixed-capacity list. The moves of a whole side are collected into a `MoveList`.

use arrayvec::ArrayVec;

use crate::moves::Move;

/// Most moves a single piece can have: a centralized queen reaches 27 squares.
pub const MAX_PIECE_MOVES: usize = 32;

/// PieceMoveList holds the moves of a single piece.
pub type PieceMoveList = ArrayVec<Move, MAX_PIECE_MOVES>;
/// MoveList holds the moves of every piece of one side.
pub type MoveList = Vec<Move>;

/// Returns a space separated string of moves in coordinate notation.
pub fn display(moves: &[Move]) -> String {
    moves
        .iter()
        .map(|move_| move_.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
