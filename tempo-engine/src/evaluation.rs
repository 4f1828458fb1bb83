//! Static evaluation.
//!
//! A score is always relative to a requested color: positive values are good
//! for that color and negative values are good for its opponent.

use crate::board::Board;
use crate::coretypes::{Color, Cp, CpKind, PieceKind, Position, NUM_SQUARES};
use crate::pieces::Piece;

impl PieceKind {
    /// Default, color independent value per piece.
    pub const fn centipawns(&self) -> Cp {
        Cp(match self {
            PieceKind::Pawn => 100, // 100 Centipawn == 1 Pawn
            PieceKind::Knight => 320,
            PieceKind::Bishop => 330,
            PieceKind::Rook => 500,
            PieceKind::Queen => 900,
            PieceKind::King => 20_000,
        })
    }

    const fn table(&self) -> &'static [CpKind; NUM_SQUARES] {
        match self {
            PieceKind::Pawn => &PAWN_TABLE,
            PieceKind::Knight => &KNIGHT_TABLE,
            PieceKind::Bishop => &BISHOP_TABLE,
            PieceKind::Rook => &ROOK_TABLE,
            PieceKind::Queen => &QUEEN_TABLE,
            PieceKind::King => &KING_TABLE,
        }
    }
}

/// Positional bonus for a piece of `kind` and `color` standing on `position`.
/// Tables are written from White's point of view and mirrored for Black.
pub fn positional(kind: PieceKind, color: Color, position: Position) -> Cp {
    let square = match color {
        Color::White => position,
        Color::Black => position.flip_rank(),
    };
    Cp(kind.table()[square.idx()])
}

/// Material plus positional value of a single piece where it stands.
pub fn piece_score(piece: &Piece) -> Cp {
    piece.kind().centipawns() + positional(piece.kind(), piece.color(), piece.position())
}

/// Sum of piece scores for `color` minus the sum for its opponent.
pub fn evaluate_score(board: &Board, color: Color) -> Cp {
    board
        .pieces()
        .map(|piece| match piece.color() == color {
            true => piece_score(piece),
            false => -piece_score(piece),
        })
        .fold(Cp::default(), |acc, value| acc + value)
}

// Piece Square Tables
// Orientation:
// A1, B1, C1, D1, ...,
// ...             ...,
// A8, B8, C8, D8, ...,

/// Push center pawns, keep the pawns in front of a castled king.
#[rustfmt::skip]
const PAWN_TABLE: [CpKind; NUM_SQUARES] = [
     0,   0,   0,   0,   0,   0,   0,   0,
     5,  10,  10, -20, -20,  10,  10,   5,
     5,  -5, -10,   0,   0, -10,  -5,   5,
     0,   0,   0,  20,  20,   0,   0,   0,
     5,   5,  10,  25,  25,  10,   5,   5,
    10,  10,  20,  30,  30,  20,  10,  10,
    50,  50,  50,  50,  50,  50,  50,  50,
     0,   0,   0,   0,   0,   0,   0,   0,
];

/// Encourage central squares, penalize edge squares.
#[rustfmt::skip]
const KNIGHT_TABLE: [CpKind; NUM_SQUARES] = [
    -50, -40, -30, -30, -30, -30, -40, -50,
    -40, -20,   0,   5,   5,   0, -20, -40,
    -30,   5,  10,  15,  15,  10,   5, -30,
    -30,   0,  15,  20,  20,  15,   0, -30,
    -30,   5,  15,  20,  20,  15,   5, -30,
    -30,   0,  10,  15,  15,  10,   0, -30,
    -40, -20,   0,   0,   0,   0, -20, -40,
    -50, -40, -30, -30, -30, -30, -40, -50,
];

/// Avoid corners and borders.
#[rustfmt::skip]
const BISHOP_TABLE: [CpKind; NUM_SQUARES] = [
    -20, -10, -10, -10, -10, -10, -10, -20,
    -10,   5,   0,   0,   0,   0,   5, -10,
    -10,  10,  10,  10,  10,  10,  10, -10,
    -10,   0,  10,  10,  10,  10,   0, -10,
    -10,   5,   5,  10,  10,   5,   5, -10,
    -10,   0,   5,  10,  10,   5,   0, -10,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -20, -10, -10, -10, -10, -10, -10, -20,
];

/// Centralize, then occupy the seventh rank.
#[rustfmt::skip]
const ROOK_TABLE: [CpKind; NUM_SQUARES] = [
     0,   0,   0,   5,   5,   0,   0,   0,
    -5,   0,   0,   0,   0,   0,   0,  -5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
     5,  10,  10,  10,  10,  10,  10,   5,
     0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const QUEEN_TABLE: [CpKind; NUM_SQUARES] = [
    -20, -10, -10,  -5,  -5, -10, -10, -20,
    -10,   0,   5,   0,   0,   0,   0, -10,
    -10,   5,   5,   5,   5,   5,   0, -10,
      0,   0,   5,   5,   5,   5,   0,  -5,
     -5,   0,   5,   5,   5,   5,   0,  -5,
    -10,   0,   5,   5,   5,   5,   0, -10,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -20, -10, -10,  -5,  -5, -10, -10, -20,
];

/// Keep king in corner, in pawn shelter.
#[rustfmt::skip]
const KING_TABLE: [CpKind; NUM_SQUARES] = [
     20,  30,  10,   0,   0,  10,  30,  20,
     20,  20,   0,   0,   0,   0,  20,  20,
    -10, -20, -20, -20, -20, -20, -20, -10,
    -20, -30, -30, -40, -40, -30, -30, -20,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_pos_equal_eval() {
        // The start position is symmetric, so both sides score zero.
        let board = Board::new_game();
        assert_eq!(evaluate_score(&board, Color::White), Cp(0));
        assert_eq!(evaluate_score(&board, Color::Black), Cp(0));
    }

    #[test]
    fn tables_mirror_for_black() {
        let white = positional(PieceKind::Pawn, Color::White, Position::new(4, 4));
        let black = positional(PieceKind::Pawn, Color::Black, Position::new(4, 5));
        assert_eq!(white, black);
        assert_eq!(white, Cp(20));
    }

    #[test]
    fn material_advantage_is_relative() {
        let board = Board::from_pieces([
            Piece::new(PieceKind::King, Color::White, Position::new(5, 1)),
            Piece::new(PieceKind::King, Color::Black, Position::new(5, 8)),
            Piece::new(PieceKind::Queen, Color::White, Position::new(4, 1)),
        ]);
        let white = evaluate_score(&board, Color::White);
        let black = evaluate_score(&board, Color::Black);

        assert!(white > Cp(800));
        assert_eq!(white, -black);
    }
}
