//! The fundamental and simple types of `tempo_engine`.

use std::fmt::{self, Display, Write};
use std::ops::{Add, AddAssign, Mul, Neg, Not, Sub, SubAssign};
use std::str::FromStr;

use crate::error::{self, ErrorKind};

///////////////
// Constants //
///////////////
pub const NUM_FILES: usize = 8; // a, b, c, d, e, f, g, h
pub const NUM_RANKS: usize = 8; // 1, 2, 3, 4, 5, 6, 7, 8
pub const NUM_SQUARES: usize = NUM_FILES * NUM_RANKS;

// Smallest and largest coordinate on either axis. Coordinates are 1-based.
pub const MIN_COORD: i8 = 1;
pub const MAX_COORD: i8 = 8;

/////////////////////////
// Data and Structures //
/////////////////////////

/// Type alias for search depth, measured in plies.
pub type PlyKind = u8;

// Type alias to make changing Cp inner type easy if needed.
pub type CpKind = i32;

/// Centipawn, a common unit of measurement in chess, where 100 Centipawn == 1 Pawn.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct Cp(pub CpKind);

/// Color can represent the color of a piece, or a player.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Color {
    White,
    Black,
}

/// The six kinds of chess pieces. The set is closed, so every piece behavior
/// dispatches with a match over this enum.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

/// A coordinate on the board.
/// `x` is the file (1 = a, 8 = h) and `y` is the rank (1 = White's home rank).
/// Positions off the board can be represented; they are never occupied.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Position {
    x: i8,
    y: i8,
}

/// The eight compass directions, as seen from White's side of the board.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

/// WireMove
/// Coordinate form of a single move, used to exchange moves as text.
/// It names squares only; a Game resolves it into a full `Move`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct WireMove {
    pub from: Position,
    pub to: Position,
    pub promotion: Option<PieceKind>,
}

//////////////////////
/// Implementations //
//////////////////////

impl Cp {
    pub const MIN: Cp = Self(CpKind::MIN + 1); // + 1 to avoid overflow error on negate.
    pub const MAX: Cp = Self(CpKind::MAX);
    pub const DRAW: Cp = Self(0);

    /// Returns the sign of Centipawn value, either 1, -1, or 0.
    pub const fn signum(&self) -> CpKind {
        self.0.signum()
    }
}

impl Add for Cp {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}
impl AddAssign for Cp {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0
    }
}
impl Sub for Cp {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}
impl SubAssign for Cp {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0
    }
}
impl Mul<CpKind> for Cp {
    type Output = Cp;
    fn mul(self, rhs: CpKind) -> Self::Output {
        Self(self.0 * rhs)
    }
}
impl Neg for Cp {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}
impl Display for Cp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:+}", self.0)
    }
}

impl Color {
    pub const ALL: [Color; 2] = [Color::White, Color::Black];

    pub const fn opponent(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Direction pawns of this color advance in.
    pub const fn forward(&self) -> Direction {
        match self {
            Color::White => Direction::North,
            Color::Black => Direction::South,
        }
    }

    /// Rank where this color's non-pawn pieces start.
    pub const fn home_rank(&self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => 8,
        }
    }

    /// Rank where this color's pawns start.
    pub const fn pawn_rank(&self) -> i8 {
        match self {
            Color::White => 2,
            Color::Black => 7,
        }
    }

    /// Farthest rank, where this color's pawns promote.
    pub const fn promotion_rank(&self) -> i8 {
        match self {
            Color::White => 8,
            Color::Black => 1,
        }
    }

    /// The fifth rank relative to this color. Only pawns standing here may capture en passant.
    pub const fn en_passant_rank(&self) -> i8 {
        match self {
            Color::White => 5,
            Color::Black => 4,
        }
    }

    pub const fn to_char(&self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }
}

impl Not for Color {
    type Output = Self;
    fn not(self) -> Self::Output {
        self.opponent()
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    /// Promotion choices, in the order they are generated.
    pub const PROMOTIONS: [PieceKind; 4] = [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ];

    /// Conventional letter, as a white piece.
    pub const fn to_char(&self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            PieceKind::Pawn => "pawn",
            PieceKind::Knight => "knight",
            PieceKind::Bishop => "bishop",
            PieceKind::Rook => "rook",
            PieceKind::Queen => "queen",
            PieceKind::King => "king",
        }
    }

    /// Returns true if PieceKind can slide, false otherwise.
    /// Sliding piece_kinds are Rooks, Bishops, and Queens.
    pub const fn is_sliding(&self) -> bool {
        matches!(self, PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen)
    }
}

impl TryFrom<char> for PieceKind {
    type Error = error::Error;
    fn try_from(ch: char) -> error::Result<Self> {
        match ch.to_ascii_uppercase() {
            'P' => Ok(PieceKind::Pawn),
            'N' => Ok(PieceKind::Knight),
            'B' => Ok(PieceKind::Bishop),
            'R' => Ok(PieceKind::Rook),
            'Q' => Ok(PieceKind::Queen),
            'K' => Ok(PieceKind::King),
            _ => Err((ErrorKind::ParsePieceMalformed, "char is not in PNBRQKpnbrqk").into()),
        }
    }
}

impl Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Direction {
    pub const ORTHOGONAL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub const DIAGONAL: [Direction; 4] = [
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    /// File and rank change of a single step in this direction.
    pub const fn delta(&self) -> (i8, i8) {
        match self {
            Direction::North => (0, 1),
            Direction::South => (0, -1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::NorthEast => (1, 1),
            Direction::NorthWest => (-1, 1),
            Direction::SouthEast => (1, -1),
            Direction::SouthWest => (-1, -1),
        }
    }
}

impl Position {
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    pub const fn x(&self) -> i8 {
        self.x
    }

    pub const fn y(&self) -> i8 {
        self.y
    }

    pub const fn is_on_board(&self) -> bool {
        self.x >= MIN_COORD && self.x <= MAX_COORD && self.y >= MIN_COORD && self.y <= MAX_COORD
    }

    /// Returns the position `dx` files and `dy` ranks away. The result may be off board.
    pub const fn offset(&self, dx: i8, dy: i8) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Returns the adjacent position in `direction`.
    pub const fn step(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }

    /// Returns the adjacent position toward the opponent of `color`.
    pub const fn forward(&self, color: Color) -> Self {
        self.step(color.forward())
    }

    /// Mirror across the middle of the board, so a1 <-> a8.
    pub const fn flip_rank(&self) -> Self {
        Self::new(self.x, MAX_COORD + MIN_COORD - self.y)
    }

    /// Index in little-endian rank-file order, a1 = 0, h8 = 63.
    /// Only meaningful for on-board positions.
    pub const fn idx(&self) -> usize {
        debug_assert!(self.is_on_board());
        ((self.y - MIN_COORD) as usize) * NUM_FILES + (self.x - MIN_COORD) as usize
    }

    pub const fn from_idx(idx: usize) -> Self {
        debug_assert!(idx < NUM_SQUARES);
        Self::new(
            (idx % NUM_FILES) as i8 + MIN_COORD,
            (idx / NUM_FILES) as i8 + MIN_COORD,
        )
    }

    /// Iterates every on-board position from a1 to h8.
    pub fn iter() -> impl Iterator<Item = Position> {
        (0..NUM_SQUARES).map(Position::from_idx)
    }
}

/// Position::= <fileLetter><rankNumber>
impl FromStr for Position {
    type Err = error::Error;
    fn from_str(s: &str) -> error::Result<Self> {
        let mut chars = s.chars();
        let file = chars.next().ok_or(ErrorKind::ParsePositionMalformed)?;
        let rank = chars.next().ok_or(ErrorKind::ParsePositionMalformed)?;
        if chars.next().is_some() {
            return Err((ErrorKind::ParsePositionMalformed, "trailing characters").into());
        }
        if !('a'..='h').contains(&file) {
            return Err((ErrorKind::ParsePositionMalformed, "file is not in a-h").into());
        }
        if !('1'..='8').contains(&rank) {
            return Err((ErrorKind::ParsePositionMalformed, "rank is not in 1-8").into());
        }

        let x = (file as u8 - b'a') as i8 + MIN_COORD;
        let y = (rank as u8 - b'1') as i8 + MIN_COORD;
        Ok(Position::new(x, y))
    }
}

/// On-board positions display as `e4`, others as their raw coordinates.
impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_on_board() {
            f.write_char((b'a' + (self.x - MIN_COORD) as u8) as char)?;
            f.write_char((b'1' + (self.y - MIN_COORD) as u8) as char)
        } else {
            write!(f, "({},{})", self.x, self.y)
        }
    }
}

impl WireMove {
    pub const fn new(from: Position, to: Position, promotion: Option<PieceKind>) -> Self {
        Self {
            from,
            to,
            promotion,
        }
    }
}

/// WireMove::= <from><to>[<promotion>], for example `e2e4` or `e7e8q`.
impl FromStr for WireMove {
    type Err = error::Error;
    fn from_str(s: &str) -> error::Result<Self> {
        let s = s.trim();
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err((ErrorKind::ParseMoveMalformed, "expected 4 or 5 ascii characters").into());
        }

        let from: Position = s[0..2].parse()?;
        let to: Position = s[2..4].parse()?;
        let promotion = match s.chars().nth(4) {
            None => None,
            Some(ch) => match PieceKind::try_from(ch)? {
                kind @ (PieceKind::Queen
                | PieceKind::Rook
                | PieceKind::Bishop
                | PieceKind::Knight) => Some(kind),
                _ => {
                    return Err((ErrorKind::ParseMoveMalformed, "promotion is not in qrbn").into())
                }
            },
        };

        Ok(Self::new(from, to, promotion))
    }
}

/// # Example
/// WireMove { from: a7, to: b8, promotion: Some(Queen) } -> `a7b8q`.
impl Display for WireMove {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(piece_kind) = self.promotion {
            f.write_char(piece_kind.to_char().to_ascii_lowercase())?;
        }
        Ok(())
    }
}
