use std::fmt;

pub use cozy_chess::{Color, File, Move, Piece, Rank, Square};

/// Why a position has no continuation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Terminal {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    FiftyMoveRule,
    ThreefoldRepetition,
}

impl Terminal {
    /// Final result when this condition holds with `side_to_move` to play.
    pub fn result(self, side_to_move: Color) -> GameResult {
        match self {
            Terminal::Checkmate => GameResult::win_for(!side_to_move),
            Terminal::Stalemate
            | Terminal::InsufficientMaterial
            | Terminal::FiftyMoveRule
            | Terminal::ThreefoldRepetition => GameResult::Draw,
        }
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Terminal::Checkmate => "checkmate",
            Terminal::Stalemate => "stalemate",
            Terminal::InsufficientMaterial => "insufficient material",
            Terminal::FiftyMoveRule => "fifty-move rule",
            Terminal::ThreefoldRepetition => "threefold repetition",
        };
        f.write_str(text)
    }
}

/// Game result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
}

impl GameResult {
    pub fn win_for(color: Color) -> Self {
        match color {
            Color::White => GameResult::WhiteWins,
            Color::Black => GameResult::BlackWins,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw => "1/2-1/2",
        };
        f.write_str(text)
    }
}

pub fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}
