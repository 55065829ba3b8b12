//! Error types for the engine and the move-notation layer

use thiserror::Error;

/// Errors surfaced by the public engine API.
///
/// Budget exhaustion is not an error: an interrupted search still returns
/// a best-effort result with `interrupted = true`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// Caller supplied a malformed board, coordinate, or color.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Every square is occupied or forbidden for the side to move.
    #[error("no legal moves available")]
    NoLegalMoves,
    /// Configuration file could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Errors raised while parsing game-record notation such as `h8 i9`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("empty move token")]
    EmptyToken,
    #[error("invalid column '{0}'")]
    BadColumn(char),
    #[error("invalid row in move '{0}'")]
    BadRow(String),
    #[error("move index {index} exceeds history length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}
