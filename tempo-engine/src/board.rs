//! Holds Board struct, the piece container and rules authority of the engine.
//!
//! A Board is a square-centric [mailbox](https://www.chessprogramming.org/Mailbox):
//! an array of 64 slots where each slot may hold a piece, plus the stack of moves
//! that were performed on it. The stack is what makes undo and en passant work.

use std::fmt::{self, Display};

use crate::coretypes::{Color, PieceKind, Position, NUM_FILES, NUM_RANKS, NUM_SQUARES};
use crate::error::{self, ErrorKind};
use crate::moves::Move;
use crate::movelist::MoveList;
use crate::pieces::Piece;

/// Back rank arrangement from file a to file h.
const BACK_RANK: [PieceKind; NUM_FILES] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// Classic 8x8 square board representation of a chess board.
/// Index starts at A1.
/// A1 = idx 0
/// B1 = idx 1
/// A2 = idx 8
/// H8 = idx 63
///
/// Cloning a Board is a deep copy: pieces and history are independent of the original.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Board {
    grid: [Option<Piece>; NUM_SQUARES],
    history: Vec<Move>,
}

impl Board {
    /// Creates an empty Board, where all squares are None.
    pub fn new() -> Self {
        Self {
            grid: [None; NUM_SQUARES],
            history: Vec::new(),
        }
    }

    /// Create Board with pieces arranged in starting chess position.
    pub fn new_game() -> Self {
        let mut board = Self::new();
        board.setup_new_game();
        board
    }

    /// Create a Board holding exactly the given pieces, each on its own position.
    /// A later piece on the same position replaces an earlier one.
    /// Pieces with off-board positions are ignored.
    pub fn from_pieces<I: IntoIterator<Item = Piece>>(pieces: I) -> Self {
        let mut board = Self::new();
        for piece in pieces {
            board.put_at_position(piece.position(), piece);
        }
        board
    }

    /// Clear the board and its history, then place the standard 32 pieces.
    pub fn setup_new_game(&mut self) {
        *self = Self::new();

        for color in Color::ALL {
            for (file, kind) in BACK_RANK.iter().enumerate() {
                let x = file as i8 + 1;
                let back = Position::new(x, color.home_rank());
                let front = Position::new(x, color.pawn_rank());
                self.place(Piece::new(*kind, color, back));
                self.place(Piece::new(PieceKind::Pawn, color, front));
            }
        }
    }

    pub fn is_on_board(&self, position: Position) -> bool {
        position.is_on_board()
    }

    /// Piece on `position`, or None if empty or off board.
    pub fn get_at_position(&self, position: Position) -> Option<Piece> {
        match position.is_on_board() {
            true => self.grid[position.idx()],
            false => None,
        }
    }

    pub fn is_occupied(&self, position: Position) -> bool {
        self.get_at_position(position).is_some()
    }

    /// Returns true if `position` holds a piece of the opposite color of `piece`.
    pub fn is_enemy(&self, piece: &Piece, position: Position) -> bool {
        self.get_at_position(position)
            .map_or(false, |occupant| occupant.color() != piece.color())
    }

    /// Put `piece` on `position`, replacing any occupant.
    /// The piece's stored position is updated to `position`. Off board positions are ignored.
    pub fn put_at_position(&mut self, position: Position, mut piece: Piece) {
        if position.is_on_board() {
            piece.set_position(position);
            self.grid[position.idx()] = Some(piece);
        }
    }

    /// Put `piece` on `position`, which must be an empty on-board square.
    pub fn put_at_empty_position(&mut self, position: Position, piece: Piece) -> error::Result<()> {
        if !position.is_on_board() {
            return Err((ErrorKind::InvalidState, format!("{position} is off board")).into());
        }
        if let Some(occupant) = self.get_at_position(position) {
            return Err((ErrorKind::InvalidState, format!("{position} holds {occupant}")).into());
        }
        self.put_at_position(position, piece);
        Ok(())
    }

    /// Remove `piece` from the board by identity, returning the removed piece.
    pub fn remove_piece(&mut self, piece: &Piece) -> error::Result<Piece> {
        match self.get_at_position(piece.position()) {
            Some(occupant) if occupant.is_same(piece) => {
                self.grid[piece.position().idx()] = None;
                Ok(occupant)
            }
            _ => Err((ErrorKind::InvalidState, format!("{piece} is not on the board")).into()),
        }
    }

    /// Perform the legal move of `piece` to `to` and record it.
    /// Promotions choose a queen. Returns the performed move, or None if there is no such move.
    pub fn move_piece(&mut self, piece: &Piece, to: Position) -> Option<Move> {
        let on_board = self.get_at_position(piece.position())?;
        if !on_board.is_same(piece) {
            return None;
        }

        let move_ = on_board
            .all_possible_moves(self)
            .into_iter()
            .find(|move_| move_.to() == to)?;
        self.do_move(move_.clone());
        Some(move_)
    }

    /// Iterate over every piece on the board from a1 to h8.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.grid.iter().flatten()
    }

    /// Independent snapshot of every piece on the board, from a1 to h8.
    pub fn get_all_pieces(&self) -> Vec<Piece> {
        self.pieces().copied().collect()
    }

    pub fn piece_count(&self) -> usize {
        self.pieces().count()
    }

    /// King of `color`, if present.
    pub fn king(&self, color: Color) -> Option<Piece> {
        self.pieces()
            .find(|piece| piece.kind() == PieceKind::King && piece.color() == color)
            .copied()
    }

    /// King of `color`. Constructed boards may lack one, which is an error.
    pub fn get_king(&self, color: Color) -> error::Result<Piece> {
        self.king(color)
            .ok_or_else(|| (ErrorKind::MissingKing, format!("no {color} king")).into())
    }

    /// Returns true if any piece of color `by` threatens `position`.
    pub fn is_attacked(&self, position: Position, by: Color) -> bool {
        self.pieces()
            .filter(|piece| piece.color() == by)
            .any(|piece| piece.threatens(position, self))
    }

    /// Returns true if the king of `color` is attacked. A board without that king is never in check.
    pub fn is_in_check(&self, color: Color) -> bool {
        self.king(color)
            .map_or(false, |king| self.is_attacked(king.position(), color.opponent()))
    }

    /// Speculatively performs `move_` and reports whether the king of `color` is safe afterwards.
    /// The board is restored exactly before returning.
    pub fn move_doesnt_put_king_in_check(&mut self, move_: &Move, color: Color) -> bool {
        let mut speculative = move_.clone();
        speculative.apply(self);
        let is_safe = !self.is_in_check(color);
        speculative.revert(self);
        is_safe
    }

    /// Every legal move for `color`, piece by piece from a1 to h8.
    pub fn legal_moves(&mut self, color: Color) -> MoveList {
        let mut moves = MoveList::with_capacity(64);

        for idx in 0..NUM_SQUARES {
            if let Some(piece) = self.grid[idx] {
                if piece.color() == color {
                    moves.extend(piece.all_possible_moves(self));
                }
            }
        }
        moves
    }

    /// Returns true as soon as any legal move for `color` is found.
    pub fn has_legal_move(&mut self, color: Color) -> bool {
        for idx in 0..NUM_SQUARES {
            if let Some(piece) = self.grid[idx] {
                if piece.color() == color {
                    let candidates = piece.pseudo_moves(self);
                    if candidates
                        .iter()
                        .any(|move_| self.move_doesnt_put_king_in_check(move_, color))
                    {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// `color` is in check and cannot get out of it.
    pub fn checkmate(&mut self, color: Color) -> bool {
        self.is_in_check(color) && !self.has_legal_move(color)
    }

    /// `color` is not in check but has no legal move.
    pub fn stalemate(&mut self, color: Color) -> bool {
        !self.is_in_check(color) && !self.has_legal_move(color)
    }

    /// Most recently performed move.
    pub fn get_last_move(&self) -> Option<&Move> {
        self.history.last()
    }

    /// Every performed move, oldest first.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Apply `move_` and push it onto the history.
    pub fn do_move(&mut self, mut move_: Move) {
        move_.apply(self);
        self.history.push(move_);
    }

    /// Pop the most recent move off the history and undo it.
    /// Returns the undone move, or None if there is no history.
    pub fn undo_move(&mut self) -> Option<Move> {
        let mut move_ = self.history.pop()?;
        move_.revert(self);
        Some(move_)
    }

    /// Empty `position`, returning what was there.
    pub(crate) fn clear(&mut self, position: Position) -> Option<Piece> {
        self.grid[position.idx()].take()
    }

    /// Put `piece` on the square it says it stands on.
    pub(crate) fn place(&mut self, piece: Piece) {
        self.grid[piece.position().idx()] = Some(piece);
    }

    /// Returns pretty-printed chess board representation of Self.
    /// The chess board has borders and file/rank indicators.
    pub fn pretty(&self) -> String {
        const RANK_SEP: &str = "+---+---+---+---+---+---+---+---+\n";
        let mut pretty = String::with_capacity(626);

        pretty.push_str(RANK_SEP);
        for rank in (0..NUM_RANKS).rev() {
            pretty.push_str("| ");

            for file in 0..NUM_FILES {
                pretty.push(match self.grid[rank * NUM_FILES + file] {
                    Some(piece) => piece.to_char(),
                    None => ' ',
                });
                pretty.push_str(" | ");
            }
            pretty.push_str(&(rank + 1).to_string());
            pretty.push('\n');
            pretty.push_str(RANK_SEP);
        }
        pretty.push_str("  a   b   c   d   e   f   g   h\n");

        pretty
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pretty())
    }
}
