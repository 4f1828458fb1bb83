//! Chess pieces and their movement rules.
//!
//! A `Piece` is a small value: what it is, whose it is, where it stands, and
//! whether it has moved. Movement geometry dispatches on `PieceKind`, and
//! every generated move is checked against the board's legality filter before
//! it is handed out.

use std::fmt::{self, Display};

use crate::board::Board;
use crate::coretypes::{Color, Cp, Direction, PieceKind, Position};
use crate::evaluation;
use crate::moves::Move;
use crate::movelist::PieceMoveList;

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Piece {
    kind: PieceKind,
    color: Color,
    position: Position,
    has_moved: bool,
}

impl Piece {
    /// Create a piece that has not moved yet.
    pub const fn new(kind: PieceKind, color: Color, position: Position) -> Self {
        Self {
            kind,
            color,
            position,
            has_moved: false,
        }
    }

    /// Returns this piece with its has-moved flag set to `has_moved`.
    pub const fn with_moved(mut self, has_moved: bool) -> Self {
        self.has_moved = has_moved;
        self
    }

    /// Immutable Getters.
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }
    pub const fn color(&self) -> Color {
        self.color
    }
    pub const fn position(&self) -> Position {
        self.position
    }
    pub const fn has_moved(&self) -> bool {
        self.has_moved
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub(crate) fn set_moved(&mut self, has_moved: bool) {
        self.has_moved = has_moved;
    }

    /// Identity of a piece on a board: its kind, owner, and square.
    /// The has-moved flag does not take part.
    pub fn is_same(&self, other: &Piece) -> bool {
        self.kind == other.kind && self.color == other.color && self.position == other.position
    }

    /// The piece a pawn turns into when promoting to `kind`.
    pub const fn promoted(&self, kind: PieceKind) -> Piece {
        Piece {
            kind,
            color: self.color,
            position: self.position,
            has_moved: true,
        }
    }

    /// Value independent copy of this piece.
    pub const fn copy(&self) -> Piece {
        *self
    }

    /// Opaque identifier a presentation layer can map to a sprite.
    pub const fn asset_name(&self) -> &'static str {
        use Color::*;
        use PieceKind::*;
        match (self.color, self.kind) {
            (White, Pawn) => "white_pawn",
            (White, Knight) => "white_knight",
            (White, Bishop) => "white_bishop",
            (White, Rook) => "white_rook",
            (White, Queen) => "white_queen",
            (White, King) => "white_king",
            (Black, Pawn) => "black_pawn",
            (Black, Knight) => "black_knight",
            (Black, Bishop) => "black_bishop",
            (Black, Rook) => "black_rook",
            (Black, Queen) => "black_queen",
            (Black, King) => "black_king",
        }
    }

    /// Material plus positional value of this piece where it stands.
    pub fn score(&self) -> Cp {
        evaluation::piece_score(self)
    }

    /// Uppercase letter for White, lowercase for Black.
    pub const fn to_char(&self) -> char {
        match self.color {
            Color::White => self.kind.to_char(),
            Color::Black => self.kind.to_char().to_ascii_lowercase(),
        }
    }

    /// Every legal move this piece can make on `board`.
    /// Candidates that would leave this piece's own king in check are removed.
    /// The board is used for speculative moves and is left unchanged.
    pub fn all_possible_moves(&self, board: &mut Board) -> PieceMoveList {
        let color = self.color;
        let mut moves = self.pseudo_moves(board);
        moves.retain(|move_| board.move_doesnt_put_king_in_check(move_, color));
        moves
    }

    /// Every move allowed by this piece's geometry, before filtering for self-check.
    pub fn pseudo_moves(&self, board: &Board) -> PieceMoveList {
        let mut moves = PieceMoveList::new();

        match self.kind {
            PieceKind::Pawn => self.pawn_moves(board, &mut moves),
            PieceKind::Knight => {
                for (dx, dy) in KNIGHT_OFFSETS {
                    self.push_step(board, self.position.offset(dx, dy), &mut moves);
                }
            }
            PieceKind::Bishop => self.slide(board, &Direction::DIAGONAL, &mut moves),
            PieceKind::Rook => self.slide(board, &Direction::ORTHOGONAL, &mut moves),
            PieceKind::Queen => self.slide(board, &Direction::ALL, &mut moves),
            PieceKind::King => {
                for direction in Direction::ALL {
                    self.push_step(board, self.position.step(direction), &mut moves);
                }
                self.castling_moves(board, &mut moves);
            }
        }

        moves
    }

    /// Returns true if this piece could capture on `target` with its next move.
    /// En passant is ignored: a pawn does not threaten the square behind a pawn
    /// it could take en passant.
    pub fn threatens(&self, target: Position, board: &Board) -> bool {
        if target == self.position || !target.is_on_board() {
            return false;
        }

        let dx = target.x() - self.position.x();
        let dy = target.y() - self.position.y();

        match self.kind {
            PieceKind::Pawn => {
                let (_, forward_dy) = self.color.forward().delta();
                dy == forward_dy && dx.abs() == 1
            }
            PieceKind::Knight => matches!((dx.abs(), dy.abs()), (1, 2) | (2, 1)),
            PieceKind::King => dx.abs() <= 1 && dy.abs() <= 1,
            PieceKind::Bishop => dx.abs() == dy.abs() && self.ray_is_clear(target, board),
            PieceKind::Rook => (dx == 0 || dy == 0) && self.ray_is_clear(target, board),
            PieceKind::Queen => {
                (dx == 0 || dy == 0 || dx.abs() == dy.abs()) && self.ray_is_clear(target, board)
            }
        }
    }

    /// True if every square strictly between this piece and an aligned `target` is empty.
    fn ray_is_clear(&self, target: Position, board: &Board) -> bool {
        let step_x = (target.x() - self.position.x()).signum();
        let step_y = (target.y() - self.position.y()).signum();
        let mut current = self.position.offset(step_x, step_y);

        while current != target {
            if board.is_occupied(current) {
                return false;
            }
            current = current.offset(step_x, step_y);
        }
        true
    }

    /// Add a move to `to` if it is on the board and not occupied by a friendly piece.
    fn push_step(&self, board: &Board, to: Position, moves: &mut PieceMoveList) {
        if !board.is_on_board(to) {
            return;
        }
        match board.get_at_position(to) {
            None => moves.push(Move::normal(*self, to, None)),
            Some(occupant) if occupant.color != self.color => {
                moves.push(Move::normal(*self, to, Some(occupant)))
            }
            Some(_) => {}
        }
    }

    /// Cast a ray in each direction, stopping at the edge or the first piece.
    fn slide(&self, board: &Board, directions: &[Direction], moves: &mut PieceMoveList) {
        for direction in directions {
            let mut to = self.position.step(*direction);

            while board.is_on_board(to) {
                match board.get_at_position(to) {
                    None => moves.push(Move::normal(*self, to, None)),
                    Some(occupant) => {
                        if occupant.color != self.color {
                            moves.push(Move::normal(*self, to, Some(occupant)));
                        }
                        break;
                    }
                }
                to = to.step(*direction);
            }
        }
    }

    fn pawn_moves(&self, board: &Board, moves: &mut PieceMoveList) {
        let single = self.position.forward(self.color);

        if board.is_on_board(single) && !board.is_occupied(single) {
            self.push_pawn_move(single, None, moves);

            let double = single.forward(self.color);
            if !self.has_moved && board.is_on_board(double) && !board.is_occupied(double) {
                moves.push(Move::normal(*self, double, None));
            }
        }

        for dx in [-1, 1] {
            let target = single.offset(dx, 0);
            if board.is_enemy(self, target) {
                self.push_pawn_move(target, board.get_at_position(target), moves);
            }
        }

        if let Some(en_passant) = self.en_passant_move(board) {
            moves.push(en_passant);
        }
    }

    /// A pawn reaching the farthest rank expands into one move per promotion choice.
    fn push_pawn_move(&self, to: Position, captured: Option<Piece>, moves: &mut PieceMoveList) {
        if to.y() == self.color.promotion_rank() {
            for kind in PieceKind::PROMOTIONS {
                moves.push(Move::promote(*self, to, captured, kind));
            }
        } else {
            moves.push(Move::normal(*self, to, captured));
        }
    }

    /// En passant is possible only right after an enemy pawn double-stepped
    /// to land beside this pawn on this pawn's fifth rank.
    fn en_passant_move(&self, board: &Board) -> Option<Move> {
        if self.position.y() != self.color.en_passant_rank() {
            return None;
        }

        let last_move = board.get_last_move()?;
        let last_piece = last_move.piece();
        let landed = last_move.to();

        let is_enemy_double_step = last_piece.kind == PieceKind::Pawn
            && last_piece.color != self.color
            && (landed.y() - last_move.from().y()).abs() == 2;
        let is_beside = landed.y() == self.position.y() && (landed.x() - self.position.x()).abs() == 1;

        if !is_enemy_double_step || !is_beside {
            return None;
        }

        let captured = board.get_at_position(landed)?;
        let to = landed.forward(self.color);
        match board.is_occupied(to) {
            true => None,
            false => Some(Move::en_passant(*self, to, captured)),
        }
    }

    /// Castling with every unmoved friendly rook that the king can see along its rank.
    /// The king moves two files toward the rook and the rook lands on the file the king crossed.
    fn castling_moves(&self, board: &Board, moves: &mut PieceMoveList) {
        if self.has_moved {
            return;
        }
        let opponent = self.color.opponent();

        for direction in [Direction::West, Direction::East] {
            let (dx, _) = direction.delta();

            // First piece along the rank, squares before it are empty.
            let mut scan = self.position.step(direction);
            while board.is_on_board(scan) && !board.is_occupied(scan) {
                scan = scan.step(direction);
            }
            let rook = match board.get_at_position(scan) {
                Some(rook) => rook,
                None => continue,
            };

            if rook.kind != PieceKind::Rook
                || rook.color != self.color
                || rook.has_moved
                || (rook.position.x() - self.position.x()).abs() < 3
            {
                continue;
            }

            let passed = self.position.offset(dx, 0);
            let landed = self.position.offset(2 * dx, 0);
            let king_path_safe = [self.position, passed, landed]
                .into_iter()
                .all(|square| !board.is_attacked(square, opponent));

            if king_path_safe {
                moves.push(Move::castling(*self, landed, rook, passed));
            }
        }
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.color, self.kind, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Color::*;
    use PieceKind::*;

    fn pos(s: &str) -> Position {
        s.parse().unwrap()
    }

    fn destinations(moves: &PieceMoveList) -> Vec<Position> {
        let mut destinations: Vec<Position> = moves.iter().map(|m| m.to()).collect();
        destinations.sort();
        destinations
    }

    #[test]
    fn lone_rook_near_corner_has_14_moves() {
        let rook = Piece::new(Rook, White, Position::new(7, 7));
        let mut board = Board::from_pieces([rook]);
        assert_eq!(rook.all_possible_moves(&mut board).len(), 14);
    }

    #[test]
    fn knights_in_start_position_have_2_moves() {
        let mut board = Board::new_game();
        for square in ["b1", "g1", "b8", "g8"] {
            let knight = board.get_at_position(pos(square)).unwrap();
            assert_eq!(knight.kind(), Knight);
            assert_eq!(knight.all_possible_moves(&mut board).len(), 2);
        }
    }

    #[test]
    fn sliding_piece_stops_at_first_occupant() {
        let bishop = Piece::new(Bishop, White, pos("c1"));
        let mut board = Board::from_pieces([
            bishop,
            Piece::new(Pawn, White, pos("b2")),
            Piece::new(Pawn, Black, pos("e3")),
        ]);

        let moves = bishop.all_possible_moves(&mut board);
        assert_eq!(destinations(&moves), vec![pos("d2"), pos("e3")]);
        assert!(moves.iter().find(|m| m.to() == pos("e3")).unwrap().is_capture());
    }

    #[test]
    fn queen_combines_rook_and_bishop() {
        let queen = Piece::new(Queen, White, pos("d4"));
        let mut board = Board::from_pieces([queen]);
        assert_eq!(queen.all_possible_moves(&mut board).len(), 27);
    }

    #[test]
    fn pawn_double_step_only_before_moving() {
        let mut board = Board::from_pieces([Piece::new(Pawn, White, pos("e2"))]);
        let pawn = board.get_at_position(pos("e2")).unwrap();
        assert_eq!(destinations(&pawn.all_possible_moves(&mut board)), vec![pos("e3"), pos("e4")]);

        let moved = Piece::new(Pawn, White, pos("e3")).with_moved(true);
        let mut board = Board::from_pieces([moved]);
        assert_eq!(destinations(&moved.all_possible_moves(&mut board)), vec![pos("e4")]);
    }

    #[test]
    fn blocked_pawn_cannot_double_step() {
        let pawn = Piece::new(Pawn, Black, pos("d7"));
        let mut board = Board::from_pieces([pawn, Piece::new(Knight, White, pos("d5"))]);
        assert_eq!(destinations(&pawn.all_possible_moves(&mut board)), vec![pos("d6")]);

        let mut board = Board::from_pieces([pawn, Piece::new(Knight, White, pos("d6"))]);
        assert!(pawn.all_possible_moves(&mut board).is_empty());
    }

    #[test]
    fn pawn_captures_diagonally_only_onto_enemies() {
        let pawn = Piece::new(Pawn, White, pos("d4")).with_moved(true);
        let mut board = Board::from_pieces([
            pawn,
            Piece::new(Knight, Black, pos("c5")),
            Piece::new(Knight, White, pos("e5")),
        ]);
        assert_eq!(destinations(&pawn.all_possible_moves(&mut board)), vec![pos("c5"), pos("d5")]);
    }

    #[test]
    fn promotion_offers_four_choices_in_order() {
        let pawn = Piece::new(Pawn, White, pos("b7")).with_moved(true);
        let mut board = Board::from_pieces([pawn]);
        let moves = pawn.all_possible_moves(&mut board);
        let choices: Vec<_> = moves.iter().map(|m| m.promotion()).collect();

        assert_eq!(
            choices,
            vec![Some(Queen), Some(Rook), Some(Bishop), Some(Knight)]
        );
        assert!(moves.iter().all(|m| m.to() == pos("b8")));
    }

    #[test]
    fn pinned_piece_has_no_moves() {
        let knight = Piece::new(Knight, White, pos("e2"));
        let mut board = Board::from_pieces([
            Piece::new(King, White, pos("e1")),
            knight,
            Piece::new(Rook, Black, pos("e8")),
            Piece::new(King, Black, pos("a8")),
        ]);
        assert!(knight.all_possible_moves(&mut board).is_empty());
    }

    #[test]
    fn threatens_respects_blockers() {
        let rook = Piece::new(Rook, Black, pos("a1"));
        let board = Board::from_pieces([rook, Piece::new(Pawn, White, pos("d1"))]);

        assert!(rook.threatens(pos("c1"), &board));
        assert!(rook.threatens(pos("d1"), &board));
        assert!(!rook.threatens(pos("e1"), &board));
        assert!(!rook.threatens(pos("b2"), &board));
        assert!(!rook.threatens(pos("a1"), &board));
    }

    #[test]
    fn pawn_threatens_forward_diagonals() {
        let white = Piece::new(Pawn, White, pos("d4"));
        let black = Piece::new(Pawn, Black, pos("d4"));
        let board = Board::new();

        assert!(white.threatens(pos("c5"), &board));
        assert!(white.threatens(pos("e5"), &board));
        assert!(!white.threatens(pos("d5"), &board));
        assert!(!white.threatens(pos("c3"), &board));
        assert!(black.threatens(pos("c3"), &board));
    }

    #[test]
    fn knight_jumps_over_pieces() {
        let knight = Piece::new(Knight, White, pos("g1"));
        let board = Board::new_game();
        assert!(knight.threatens(pos("f3"), &board));
        assert!(knight.threatens(pos("e2"), &board));
        assert!(!knight.threatens(pos("g3"), &board));
    }

    #[test]
    fn castling_generated_both_ways() {
        let king = Piece::new(King, White, pos("e1"));
        let mut board = Board::from_pieces([
            king,
            Piece::new(Rook, White, pos("a1")),
            Piece::new(Rook, White, pos("h1")),
            Piece::new(King, Black, pos("e8")),
        ]);

        let castles: Vec<Position> = king
            .all_possible_moves(&mut board)
            .iter()
            .filter(|m| m.is_castling())
            .map(|m| m.to())
            .collect();
        assert_eq!(castles, vec![pos("c1"), pos("g1")]);
    }

    #[test]
    fn castling_blocked_by_attacked_path() {
        let king = Piece::new(King, White, pos("e1"));
        let mut board = Board::from_pieces([
            king,
            Piece::new(Rook, White, pos("a1")),
            Piece::new(Rook, White, pos("h1")),
            Piece::new(Rook, Black, pos("f8")),
            Piece::new(King, Black, pos("a8")),
        ]);

        let castles: Vec<Position> = king
            .all_possible_moves(&mut board)
            .iter()
            .filter(|m| m.is_castling())
            .map(|m| m.to())
            .collect();
        assert_eq!(castles, vec![pos("c1")]);
    }

    #[test]
    fn castling_forbidden_after_rook_moved_or_in_check() {
        let king = Piece::new(King, White, pos("e1"));
        let mut board = Board::from_pieces([
            king,
            Piece::new(Rook, White, pos("a1")).with_moved(true),
            Piece::new(Rook, White, pos("h1")),
            Piece::new(Bishop, Black, pos("b4")),
            Piece::new(King, Black, pos("a8")),
        ]);

        // Bishop on b4 gives check along the a5-e1 diagonal.
        assert!(king
            .all_possible_moves(&mut board)
            .iter()
            .all(|m| !m.is_castling()));
    }

    #[test]
    fn asset_names_are_distinct() {
        let mut names: Vec<&str> = Color::ALL
            .iter()
            .flat_map(|color| {
                PieceKind::ALL
                    .iter()
                    .map(move |kind| Piece::new(*kind, *color, pos("a1")).asset_name())
            })
            .collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 12);
    }
}
