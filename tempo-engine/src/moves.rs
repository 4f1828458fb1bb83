//! Moves and their exact inverses.
//!
//! A `Move` is created unapplied. `apply` performs it on a board and `revert`
//! undoes it, restoring every piece it touched, including has-moved flags.
//! Applying twice or reverting an unapplied move is a bug in the caller and panics.

use std::fmt::{self, Display};

use crate::board::Board;
use crate::coretypes::{PieceKind, Position, WireMove};
use crate::pieces::Piece;

/// Extra behavior layered on top of a plain relocation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MoveKind {
    /// Relocation, possibly capturing the occupant of the destination.
    Normal,
    /// The king moves two files and `rook` jumps to `rook_to`.
    Castling { rook: Piece, rook_to: Position },
    /// A pawn captures the pawn beside it, which is not on the destination.
    EnPassant,
    /// A pawn reaches the farthest rank and is replaced by a new piece.
    Promotion(PieceKind),
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Move {
    from: Position,
    to: Position,
    /// Moving piece as it was before the move.
    piece: Piece,
    /// Captured piece as it was before the move.
    captured: Option<Piece>,
    kind: MoveKind,
    applied: bool,
}

impl Move {
    pub fn normal(piece: Piece, to: Position, captured: Option<Piece>) -> Self {
        Self::with_kind(piece, to, captured, MoveKind::Normal)
    }

    pub fn castling(king: Piece, to: Position, rook: Piece, rook_to: Position) -> Self {
        Self::with_kind(king, to, None, MoveKind::Castling { rook, rook_to })
    }

    pub fn en_passant(pawn: Piece, to: Position, captured: Piece) -> Self {
        Self::with_kind(pawn, to, Some(captured), MoveKind::EnPassant)
    }

    pub fn promote(
        pawn: Piece,
        to: Position,
        captured: Option<Piece>,
        promote_to: PieceKind,
    ) -> Self {
        Self::with_kind(pawn, to, captured, MoveKind::Promotion(promote_to))
    }

    fn with_kind(piece: Piece, to: Position, captured: Option<Piece>, kind: MoveKind) -> Self {
        Self {
            from: piece.position(),
            to,
            piece,
            captured,
            kind,
            applied: false,
        }
    }

    /// Immutable Getters.
    pub const fn from(&self) -> Position {
        self.from
    }
    pub const fn to(&self) -> Position {
        self.to
    }
    pub const fn piece(&self) -> Piece {
        self.piece
    }
    pub const fn captured(&self) -> Option<Piece> {
        self.captured
    }
    pub const fn kind(&self) -> MoveKind {
        self.kind
    }
    pub const fn is_applied(&self) -> bool {
        self.applied
    }

    pub const fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    pub const fn is_castling(&self) -> bool {
        matches!(self.kind, MoveKind::Castling { .. })
    }

    pub const fn is_en_passant(&self) -> bool {
        matches!(self.kind, MoveKind::EnPassant)
    }

    pub const fn promotion(&self) -> Option<PieceKind> {
        match self.kind {
            MoveKind::Promotion(kind) => Some(kind),
            _ => None,
        }
    }

    /// Coordinate form of this move.
    pub const fn wire(&self) -> WireMove {
        WireMove::new(self.from, self.to, self.promotion())
    }

    /// True if `wire` names this move. A wire move without a promotion
    /// never matches a promotion move.
    pub fn matches(&self, wire: &WireMove) -> bool {
        self.from == wire.from && self.to == wire.to && self.promotion() == wire.promotion
    }

    /// Perform this move on `board`.
    ///
    /// # Panics
    /// If this move is already applied.
    pub fn apply(&mut self, board: &mut Board) {
        assert!(!self.applied, "move {self} applied twice");

        board.clear(self.from);
        if let Some(captured) = self.captured {
            board.clear(captured.position());
        }

        let mut moved = match self.kind {
            MoveKind::Promotion(promote_to) => self.piece.promoted(promote_to),
            _ => self.piece,
        };
        moved.set_position(self.to);
        moved.set_moved(true);
        board.place(moved);

        if let MoveKind::Castling { rook, rook_to } = self.kind {
            board.clear(rook.position());
            let mut moved_rook = rook;
            moved_rook.set_position(rook_to);
            moved_rook.set_moved(true);
            board.place(moved_rook);
        }

        self.applied = true;
    }

    /// Undo this move on `board`, restoring the exact pieces it displaced.
    ///
    /// # Panics
    /// If this move is not applied.
    pub fn revert(&mut self, board: &mut Board) {
        assert!(self.applied, "move {self} reverted before being applied");

        if let MoveKind::Castling { rook, rook_to } = self.kind {
            board.clear(rook_to);
            board.place(rook);
        }

        board.clear(self.to);
        if let Some(captured) = self.captured {
            board.place(captured);
        }
        board.place(self.piece);

        self.applied = false;
    }
}

/// Displays in coordinate notation, for example `e2e4` or `a7b8q`.
impl Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.wire())
    }
}
