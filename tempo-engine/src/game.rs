//! Game structure.

use std::fmt::{self, Display};

use crate::board::Board;
use crate::coretypes::{Color, Cp, Position, WireMove};
use crate::evaluation;
use crate::moves::Move;
use crate::movelist::MoveList;
use crate::pieces::Piece;

/// Where a game stands from the point of view of the player to move.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum GameStatus {
    /// The player to move has at least one legal move.
    InProgress,
    /// The player to move is in check with no legal move. `winner` delivered the mate.
    Checkmate { winner: Color },
    /// The player to move is not in check but has no legal move.
    Stalemate,
}

/// Final result of a game.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Outcome {
    Win(Color),
    Draw,
}

/// Result of a game for one participant.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PlayerResult {
    Win,
    Loss,
    Draw,
}

/// What a finished game reports to whoever keeps accounts and ratings.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct GameReport {
    pub white: String,
    pub black: String,
    pub outcome: Outcome,
}

/// Game contains information for an in progress game:
/// the board with its move history, and the player whose turn it is.
/// Cloning a Game is a deep copy, safe to mutate for speculative search.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Game {
    board: Board,
    next_player: Color,
}

impl Game {
    /// Create a new game in the standard chess start position, White to move.
    pub fn new() -> Self {
        Self::from_board(Board::new_game(), Color::White)
    }

    /// Create a game from an arbitrary board, with `next_player` to move.
    pub fn from_board(board: Board, next_player: Color) -> Self {
        Self { board, next_player }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn next_player_color(&self) -> Color {
        self.next_player
    }

    pub fn get_piece_at_position(&self, position: Position) -> Option<Piece> {
        self.board.get_at_position(position)
    }

    pub fn get_pieces(&self) -> Vec<Piece> {
        self.board.get_all_pieces()
    }

    /// Every performed move, oldest first.
    pub fn history(&self) -> &[Move] {
        self.board.history()
    }

    /// Every legal move for the player to move.
    pub fn get_possible_moves(&mut self) -> MoveList {
        self.board.legal_moves(self.next_player)
    }

    /// Resolve the legal moves from `from` to `to` for the player to move.
    ///
    /// Returns the empty list if there is no such move. If exactly one move matches,
    /// it is performed and returned alone. If several match, which only happens for
    /// promotions, none is performed and all are returned so the caller can choose.
    pub fn perform_move(&mut self, from: Position, to: Position) -> MoveList {
        let piece = match self.board.get_at_position(from) {
            Some(piece) if piece.color() == self.next_player => piece,
            _ => return MoveList::new(),
        };

        let candidates: MoveList = piece
            .all_possible_moves(&mut self.board)
            .into_iter()
            .filter(|move_| move_.to() == to)
            .collect();

        if candidates.len() == 1 {
            self.perform(candidates[0].clone());
        }
        candidates
    }

    /// Perform a specific move, which must be legal for the player to move.
    pub fn perform(&mut self, move_: Move) {
        debug_assert_eq!(move_.piece().color(), self.next_player);
        self.board.do_move(move_);
        self.next_player = self.next_player.opponent();
    }

    /// Resolve a coordinate move against the legal moves and perform it.
    /// Returns the performed move, or None if it is not legal.
    pub fn perform_wire(&mut self, wire: &WireMove) -> Option<Move> {
        let move_ = self
            .get_possible_moves()
            .into_iter()
            .find(|move_| move_.matches(wire))?;
        self.perform(move_.clone());
        Some(move_)
    }

    /// Undo the most recent move and give the turn back.
    pub fn undo_move(&mut self) -> Option<Move> {
        let move_ = self.board.undo_move()?;
        self.next_player = self.next_player.opponent();
        Some(move_)
    }

    /// Material and position of `color` minus that of its opponent.
    pub fn evaluate_score(&self, color: Color) -> Cp {
        evaluation::evaluate_score(&self.board, color)
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        self.board.is_in_check(color)
    }

    pub fn checkmate(&mut self, color: Color) -> bool {
        self.board.checkmate(color)
    }

    pub fn stalemate(&mut self, color: Color) -> bool {
        self.board.stalemate(color)
    }

    pub fn status(&mut self) -> GameStatus {
        let player = self.next_player;
        if self.board.has_legal_move(player) {
            GameStatus::InProgress
        } else if self.board.is_in_check(player) {
            GameStatus::Checkmate {
                winner: player.opponent(),
            }
        } else {
            GameStatus::Stalemate
        }
    }

    /// Final result, or None while the game is in progress.
    pub fn outcome(&mut self) -> Option<Outcome> {
        match self.status() {
            GameStatus::InProgress => None,
            GameStatus::Checkmate { winner } => Some(Outcome::Win(winner)),
            GameStatus::Stalemate => Some(Outcome::Draw),
        }
    }

    /// Report of a finished game between the named participants.
    pub fn report<W, B>(&mut self, white: W, black: B) -> Option<GameReport>
    where
        W: Into<String>,
        B: Into<String>,
    {
        self.outcome().map(|outcome| GameReport {
            white: white.into(),
            black: black.into(),
            outcome,
        })
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a board to a Game with White to move.
impl From<Board> for Game {
    fn from(board: Board) -> Self {
        Self::from_board(board, Color::White)
    }
}

impl Outcome {
    pub fn result_for(&self, color: Color) -> PlayerResult {
        match self {
            Outcome::Win(winner) if *winner == color => PlayerResult::Win,
            Outcome::Win(_) => PlayerResult::Loss,
            Outcome::Draw => PlayerResult::Draw,
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Outcome::Win(Color::White) => f.write_str("1-0"),
            Outcome::Win(Color::Black) => f.write_str("0-1"),
            Outcome::Draw => f.write_str("1/2-1/2"),
        }
    }
}

/// Displays the board and the player to move.
impl Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\n {} to move\n", self.board, self.next_player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coretypes::PieceKind::*;
    use Color::*;

    fn pos(s: &str) -> Position {
        s.parse().unwrap()
    }

    #[test]
    fn start_position_has_20_moves() {
        let mut game = Game::new();
        assert_eq!(game.get_possible_moves().len(), 20);
        assert_eq!(game.next_player_color(), White);
        assert_eq!(game.status(), GameStatus::InProgress);
    }

    #[test]
    fn perform_and_undo_flip_turn() {
        let mut game = Game::new();
        let performed = game.perform_move(pos("e2"), pos("e4"));
        assert_eq!(performed.len(), 1);
        assert_eq!(game.next_player_color(), Black);
        assert_eq!(game.get_piece_at_position(pos("e4")).unwrap().kind(), Pawn);

        let undone = game.undo_move().unwrap();
        assert_eq!(undone.to(), pos("e4"));
        assert_eq!(game.next_player_color(), White);
        assert_eq!(game, Game::new());
        assert!(game.undo_move().is_none());
    }

    #[test]
    fn illegal_moves_are_rejected_silently() {
        let mut game = Game::new();
        // Wrong side, empty square, impossible geometry.
        assert!(game.perform_move(pos("e7"), pos("e5")).is_empty());
        assert!(game.perform_move(pos("e4"), pos("e5")).is_empty());
        assert!(game.perform_move(pos("e2"), pos("e5")).is_empty());
        assert_eq!(game, Game::new());
    }

    #[test]
    fn ambiguous_promotion_is_not_performed() {
        let board = Board::from_pieces([
            Piece::new(King, White, pos("e1")),
            Piece::new(King, Black, pos("e8")),
            Piece::new(Pawn, White, pos("a7")).with_moved(true),
        ]);
        let mut game = Game::from(board);

        let candidates = game.perform_move(pos("a7"), pos("a8"));
        assert_eq!(candidates.len(), 4);
        assert!(game.history().is_empty());
        assert_eq!(game.next_player_color(), White);

        let rook = candidates
            .into_iter()
            .find(|move_| move_.promotion() == Some(Rook))
            .unwrap();
        game.perform(rook);
        assert_eq!(game.get_piece_at_position(pos("a8")).unwrap().kind(), Rook);
        assert_eq!(game.next_player_color(), Black);
    }

    #[test]
    fn perform_wire_move() {
        let mut game = Game::new();
        assert!(game.perform_wire(&"g1f3".parse().unwrap()).is_some());
        assert!(game.perform_wire(&"g1f3".parse().unwrap()).is_none());
        assert!(game.perform_wire(&"b8c6".parse().unwrap()).is_some());
        assert_eq!(game.history().len(), 2);
    }

    #[test]
    fn fools_mate_outcome() {
        let mut game = Game::new();
        for (from, to) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")] {
            assert_eq!(game.perform_move(pos(from), pos(to)).len(), 1);
        }

        assert!(game.checkmate(White));
        assert_eq!(game.status(), GameStatus::Checkmate { winner: Black });
        assert_eq!(game.outcome(), Some(Outcome::Win(Black)));

        let report = game.report("alice", "bob").unwrap();
        assert_eq!(report.outcome.result_for(White), PlayerResult::Loss);
        assert_eq!(report.outcome.result_for(Black), PlayerResult::Win);
        assert_eq!(report.outcome.to_string(), "0-1");
    }

    #[test]
    fn stalemate_is_a_draw() {
        let board = Board::from_pieces([
            Piece::new(King, Black, pos("h8")),
            Piece::new(Queen, White, pos("g6")),
            Piece::new(King, White, pos("a1")),
        ]);
        let mut game = Game::from_board(board, Black);

        assert_eq!(game.status(), GameStatus::Stalemate);
        assert_eq!(game.outcome(), Some(Outcome::Draw));
        assert_eq!(Outcome::Draw.result_for(White), PlayerResult::Draw);
        assert!(game.report("a", "b").is_some());
    }

    #[test]
    fn evaluate_score_tracks_captures() {
        let mut game = Game::new();
        for (from, to) in [("e2", "e4"), ("d7", "d5"), ("e4", "d5")] {
            game.perform_move(pos(from), pos(to));
        }
        assert!(game.evaluate_score(White) > Cp(50));
        assert_eq!(game.evaluate_score(White), -game.evaluate_score(Black));
    }
}
