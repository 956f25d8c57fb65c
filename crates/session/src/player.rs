//! Who plays each side.

use std::fmt;
use std::str::FromStr;

use chess_core::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a side picks its moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerType {
    /// Moves come from `request_move`
    #[default]
    Human,
    /// Uniformly random legal move
    RandomAi,
    /// Minimax with the configured depth and evaluator
    SearchAi,
}

impl PlayerType {
    pub const ALL: [PlayerType; 3] = [PlayerType::Human, PlayerType::RandomAi, PlayerType::SearchAi];

    pub fn as_str(self) -> &'static str {
        match self {
            PlayerType::Human => "human",
            PlayerType::RandomAi => "random_ai",
            PlayerType::SearchAi => "search_ai",
        }
    }

    pub fn is_ai(self) -> bool {
        self != PlayerType::Human
    }
}

impl fmt::Display for PlayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown player type `{0}` (expected human, random_ai or search_ai)")]
pub struct UnknownPlayerType(pub String);

impl FromStr for PlayerType {
    type Err = UnknownPlayerType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        PlayerType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| UnknownPlayerType(s.to_string()))
    }
}

/// Player type per side. Both sides are always assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerAssignment {
    pub white: PlayerType,
    pub black: PlayerType,
}

impl PlayerAssignment {
    pub fn new(white: PlayerType, black: PlayerType) -> Self {
        Self { white, black }
    }

    pub fn get(&self, side: Color) -> PlayerType {
        match side {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    pub fn set(&mut self, side: Color, player: PlayerType) {
        match side {
            Color::White => self.white = player,
            Color::Black => self.black = player,
        }
    }

    /// First side played by a human, if any.
    pub fn human_side(&self) -> Option<Color> {
        Color::ALL.into_iter().find(|&c| self.get(c) == PlayerType::Human)
    }
}
