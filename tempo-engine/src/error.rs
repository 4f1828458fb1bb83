//! Tempo Engine error type.

use std::error;
use std::fmt::{self, Display};
use std::io;
use std::result;

/// Tempo Engine generic result type.
pub type Result<T> = result::Result<T, Error>;

/// A list specifying general errors for Tempo engine.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A board operation was asked to do something its current state forbids,
    /// such as placing a piece on an occupied square or removing a missing piece.
    InvalidState,
    /// A king of the requested color is not on the board.
    MissingKing,

    /// Position parse string malformed.
    ParsePositionMalformed,
    /// Piece parse string malformed.
    ParsePieceMalformed,
    /// Move parse string malformed.
    ParseMoveMalformed,
    /// Difficulty parse string malformed.
    ParseDifficultyMalformed,

    /// Engine is currently searching, so another search cannot be started.
    EngineAlreadySearching,
    /// The search thread ended without producing a result.
    EngineSearchFailed,

    /// Could not establish a connection with the peer.
    NetConnect,
    /// Reading or writing the peer connection failed.
    NetIo,
    /// The peer connection is closed.
    NetDisconnected,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidState => "invalid state",
            ErrorKind::MissingKing => "missing king",

            ErrorKind::ParsePositionMalformed => "parse position malformed",
            ErrorKind::ParsePieceMalformed => "parse piece malformed",
            ErrorKind::ParseMoveMalformed => "parse move malformed",
            ErrorKind::ParseDifficultyMalformed => "parse difficulty malformed",

            ErrorKind::EngineAlreadySearching => "engine already searching",
            ErrorKind::EngineSearchFailed => "engine search failed",

            ErrorKind::NetConnect => "net connect",
            ErrorKind::NetIo => "net io",
            ErrorKind::NetDisconnected => "net disconnected",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The primary and general error type for the Tempo Engine.
#[derive(Debug)]
pub enum Error {
    Simple(ErrorKind),
    Message(ErrorKind, String),
    Custom(ErrorKind, Box<dyn error::Error + Send + Sync>),
}

impl Error {
    pub fn new<E>(error_kind: ErrorKind, inner_error: E) -> Self
    where
        E: Into<Box<dyn error::Error + Send + Sync>>,
    {
        Self::Custom(error_kind, inner_error.into())
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Simple(error_kind) => *error_kind,
            Error::Message(error_kind, _) => *error_kind,
            Error::Custom(error_kind, _) => *error_kind,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Simple(error_kind) => {
                write!(f, "{error_kind}")
            }
            Error::Message(error_kind, string) => {
                write!(f, "{error_kind}: {string}")
            }
            Error::Custom(error_kind, ref box_error) => {
                write!(f, "{error_kind}, error: {}", *box_error)
            }
        }
    }
}

impl error::Error for Error {}

impl From<ErrorKind> for Error {
    fn from(error_kind: ErrorKind) -> Self {
        Self::Simple(error_kind)
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Self::Custom(ErrorKind::NetIo, error.into())
    }
}

impl<S: ToString> From<(ErrorKind, S)> for Error {
    fn from((error_kind, stringable): (ErrorKind, S)) -> Self {
        Self::Message(error_kind, stringable.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_is_preserved() {
        let simple: Error = ErrorKind::InvalidState.into();
        let message: Error = (ErrorKind::MissingKing, "no white king").into();
        let custom: Error = io::Error::new(io::ErrorKind::Other, "boom").into();

        assert_eq!(simple.kind(), ErrorKind::InvalidState);
        assert_eq!(message.kind(), ErrorKind::MissingKing);
        assert_eq!(custom.kind(), ErrorKind::NetIo);
        assert_eq!(message.to_string(), "missing king: no white king");
    }
}
