//! Feature extraction for neural network input
//!
//! Converts a chess position into a flat tensor suitable for NN input.
//! The encoding is 13 planes of 8×8:
//! - Planes 0-5: White pieces (Pawn, Knight, Bishop, Rook, Queen, King)
//! - Planes 6-11: Black pieces (Pawn, Knight, Bishop, Rook, Queen, King)
//! - Plane 12: side to move, all 1.0 when White is to move, all 0.0 otherwise
//!
//! The board is always encoded from White's perspective (a1 = index 0 of each
//! plane), so `index = plane * 64 + rank * 8 + file`.

use std::fmt;

use chess_core::cozy_chess::Board;
use chess_core::{Color, Piece, Position, Square};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of feature planes: 6 piece types × 2 colors + side to move.
pub const NUM_PLANES: usize = 13;

/// Plane holding the side-to-move flag.
pub const SIDE_TO_MOVE_PLANE: usize = 12;

/// Total number of features: 8 × 8 × 13 = 832
pub const FEATURE_LEN: usize = 64 * NUM_PLANES;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    #[error("feature vector has {actual} values, expected {expected}", expected = FEATURE_LEN)]
    Length { actual: usize },
    #[error("feature {index} is {value}, expected 0 or 1")]
    Value { index: usize, value: f32 },
}

/// Encoded position. Always exactly [`FEATURE_LEN`] values, each 0.0 or 1.0.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value at (`plane`, `rank`, `file`), all zero-based.
    pub fn get(&self, plane: usize, rank: usize, file: usize) -> f32 {
        self.0[index(plane, rank, file)]
    }

    pub fn side_to_move_plane(&self) -> &[f32] {
        let start = SIDE_TO_MOVE_PLANE * 64;
        &self.0[start..start + 64]
    }

    /// Number of occupied squares, read back from the piece planes.
    pub fn piece_count(&self) -> usize {
        self.0[..SIDE_TO_MOVE_PLANE * 64]
            .iter()
            .filter(|&&x| x > 0.0)
            .count()
    }
}

impl fmt::Debug for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureVector")
            .field("pieces", &self.piece_count())
            .field("white_to_move", &(self.side_to_move_plane()[0] > 0.0))
            .finish()
    }
}

impl TryFrom<Vec<f32>> for FeatureVector {
    type Error = FeatureError;

    fn try_from(values: Vec<f32>) -> Result<Self, Self::Error> {
        if values.len() != FEATURE_LEN {
            return Err(FeatureError::Length {
                actual: values.len(),
            });
        }
        if let Some((index, &value)) = values
            .iter()
            .enumerate()
            .find(|&(_, &v)| v != 0.0 && v != 1.0)
        {
            return Err(FeatureError::Value { index, value });
        }
        Ok(Self(values))
    }
}

impl From<FeatureVector> for Vec<f32> {
    fn from(features: FeatureVector) -> Self {
        features.0
    }
}

#[inline]
fn index(plane: usize, rank: usize, file: usize) -> usize {
    plane * 64 + rank * 8 + file
}

fn piece_plane(color: Color, piece: Piece) -> usize {
    let color_offset = match color {
        Color::White => 0,
        Color::Black => 6,
    };
    piece as usize + color_offset
}

/// Encodes `board` into a feature vector.
pub fn encode(board: &Board) -> FeatureVector {
    let mut features = vec![0.0f32; FEATURE_LEN];

    for color in Color::ALL {
        for piece in Piece::ALL {
            let plane = piece_plane(color, piece);
            for sq in board.colored_pieces(color, piece) {
                features[square_index(plane, sq)] = 1.0;
            }
        }
    }

    if board.side_to_move() == Color::White {
        let start = SIDE_TO_MOVE_PLANE * 64;
        features[start..start + 64].fill(1.0);
    }

    FeatureVector(features)
}

/// Shorthand for encoding a [`Position`]'s current board.
pub fn encode_position(pos: &Position) -> FeatureVector {
    encode(pos.board())
}

fn square_index(plane: usize, sq: Square) -> usize {
    index(plane, sq.rank() as usize, sq.file() as usize)
}

#[cfg(test)]
#[path = "features_tests.rs"]
mod features_tests;
