//! The contract the search and the game session need from a rules engine.
//!
//! Everything that knows chess rules sits behind [`RulesEngine`]. The search
//! only enumerates, plays and takes back moves; it never inspects the board
//! itself, so any game that can hand out opaque [`Move`] tokens can be searched.

use thiserror::Error;

use crate::types::{Color, Move, Terminal};

/// Errors reported by a rules engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    #[error("invalid FEN `{fen}`: {reason}")]
    InvalidFen { fen: String, reason: String },
    #[error("malformed move `{0}`, expected square-pair notation such as e2e4")]
    BadNotation(String),
    #[error("illegal move `{0}`")]
    IllegalMove(String),
}

/// A mutable game position with transactional move application.
///
/// `push` and `pop` must nest: after any balanced sequence of pushes and pops
/// the position is exactly what it was before.
pub trait RulesEngine {
    /// Side whose turn it is.
    fn side_to_move(&self) -> Color;

    /// All legal moves, always in the same order for the same position.
    fn legal_moves(&self) -> Vec<Move>;

    /// Plays `mv`. Rejects moves that are not legal without touching the position.
    fn push(&mut self, mv: Move) -> Result<(), RulesError>;

    /// Takes back the most recent move, if any.
    fn pop(&mut self) -> Option<Move>;

    /// Whether the side to move is in check.
    fn in_check(&self) -> bool;

    /// The game-ending condition holding in this position, if any.
    fn terminal(&self) -> Option<Terminal>;

    /// Parses square-pair notation (`e2e4`, `e7e8q`) into a legal move.
    fn parse_move(&self, text: &str) -> Result<Move, RulesError>;

    /// Renders `mv` in square-pair notation. `mv` must be legal here.
    fn format_move(&self, mv: Move) -> String;

    /// Whether `mv` captures something. Only used for move ordering.
    fn is_capture(&self, _mv: Move) -> bool {
        false
    }
}
