//! Error types for the rules core
//!
//! Every failure surfaced by a [`GameSession`](crate::session::GameSession)
//! leaves the position and the game record untouched.

use crate::status::GameStatus;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    /// The text is not a move in any notation we read
    #[error("invalid notation: {0}")]
    InvalidNotation(String),

    /// A well formed move that is not legal in the current position
    #[error("illegal move: {0}")]
    IllegalMove(String),

    /// Algebraic notation matching no legal move, or several
    #[error("ambiguous or illegal move: {0}")]
    AmbiguousOrIllegalSan(String),

    #[error("no moves to undo")]
    NothingToUndo,

    #[error("game is already over: {0}")]
    GameAlreadyOver(GameStatus),

    #[error("invalid FEN string: {0}")]
    InvalidFen(String),
}

pub type ChessResult<T> = Result<T, ChessError>;
