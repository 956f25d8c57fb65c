//! Core of the chess AI: the rules-engine contract, the evaluator interface
//! and the fixed-depth minimax search that ties them together.
//!
//! Chess rules themselves come from `cozy-chess`; [`Position`] adapts it to
//! the push/pop [`RulesEngine`] contract the search relies on.

pub mod board;
pub mod eval;
pub mod rules;
pub mod search;
pub mod time_control;
pub mod types;

pub use board::{Position, START_FEN};
pub use eval::{EvalError, Evaluator};
pub use rules::{RulesEngine, RulesError};
pub use search::{
    MATE_SCORE, SearchEngine, SearchError, SearchResult, mate_at_ply, orient, terminal_score,
};
pub use time_control::{SearchLimits, TimeControl};
pub use types::*;

pub use cozy_chess;
