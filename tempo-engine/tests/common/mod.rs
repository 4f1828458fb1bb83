//! Helpers shared by the integration tests.

#![allow(dead_code)]

use tempo_engine::*;

pub fn pos(s: &str) -> Position {
    s.parse().unwrap()
}

/// Build a board from the piece placement field of a FEN string, rank 8 first.
///
/// Kings and rooks on their initial squares, and pawns on their initial rank,
/// are unmoved so they may still castle or double step. Every other piece has moved.
pub fn board_from_placement(placement: &str) -> Board {
    let mut pieces = Vec::new();

    for (row, rank) in placement.split('/').enumerate() {
        let y = 8 - row as i8;
        let mut x = 1;
        for ch in rank.chars() {
            if let Some(skip) = ch.to_digit(10) {
                x += skip as i8;
                continue;
            }
            let kind = PieceKind::try_from(ch).unwrap();
            let color = match ch.is_ascii_uppercase() {
                true => Color::White,
                false => Color::Black,
            };
            let position = Position::new(x, y);
            let unmoved = match kind {
                PieceKind::Pawn => y == color.pawn_rank(),
                PieceKind::King => y == color.home_rank() && x == 5,
                PieceKind::Rook => y == color.home_rank() && (x == 1 || x == 8),
                _ => false,
            };
            pieces.push(Piece::new(kind, color, position).with_moved(!unmoved));
            x += 1;
        }
    }

    Board::from_pieces(pieces)
}

/// Perform a sequence of coordinate moves, panicking on any illegal one.
pub fn play(game: &mut Game, moves: &[&str]) {
    for wire in moves {
        let wire: WireMove = wire.parse().unwrap();
        assert!(game.perform_wire(&wire).is_some(), "illegal move {wire}");
    }
}
