//! Tempo Engine: chess rules, static evaluation and a minimax player.
//!
//! A [`Game`] owns a [`Board`] and the player to move. Moves are resolved from
//! coordinates into [`Move`] values that perform and exactly undo themselves.
//! [`MiniMaxAi`] searches a snapshot of a game, and [`Engine`] wraps a game and
//! a player for callers that search in the background.

pub mod board;
pub mod coretypes;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod game;
pub mod movelist;
pub mod moves;
pub mod net;
pub mod perft;
pub mod pieces;
pub mod search;

pub use board::Board;
pub use coretypes::{Color, Cp, PieceKind, Position, WireMove};
pub use engine::{Engine, EngineBuilder};
pub use game::{Game, GameReport, GameStatus, Outcome, PlayerResult};
pub use moves::{Move, MoveKind};
pub use pieces::Piece;
pub use search::{Difficulty, MiniMaxAi, SearchResult};
