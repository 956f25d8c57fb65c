//! Offline training data: labelled feature vectors stored as JSON.
//!
//! ```text
//! { "feature_len": 832, "records": [ { "features": [...], "label": 0.25 }, ... ] }
//! ```
//!
//! Floats are written with serde_json's shortest round-trip formatting, so a
//! saved dataset loads back bit for bit.

use std::fs;
use std::path::{Path, PathBuf};

use chess_core::{Color, Position, RulesEngine, RulesError, Terminal};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::features::{FEATURE_LEN, FeatureVector, encode_position};

/// Random plies played from the start position for each synthetic sample.
pub const MAX_RANDOM_PLIES: u32 = 20;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed dataset {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("dataset declares {actual} features per record, expected {expected}", expected = FEATURE_LEN)]
    FeatureLen { actual: usize },
    #[error("record {index} has label {label}, expected a value in [-1, 1]")]
    Label { index: usize, label: f32 },
    #[error(transparent)]
    Rules(#[from] RulesError),
}

/// One training example. Never modified once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub features: FeatureVector,
    pub label: f32,
}

impl GameRecord {
    pub fn new(features: FeatureVector, label: f32) -> Self {
        Self { features, label }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    feature_len: usize,
    records: Vec<GameRecord>,
}

impl Default for Dataset {
    fn default() -> Self {
        Self::new()
    }
}

fn valid_label(label: f32) -> bool {
    (-1.0..=1.0).contains(&label)
}

impl Dataset {
    pub fn new() -> Self {
        Self {
            feature_len: FEATURE_LEN,
            records: Vec::new(),
        }
    }

    /// Appends a record. Labels outside [-1, 1] (or NaN) are rejected.
    pub fn push(&mut self, record: GameRecord) -> Result<(), DatasetError> {
        if !valid_label(record.label) {
            return Err(DatasetError::Label {
                index: self.records.len(),
                label: record.label,
            });
        }
        self.records.push(record);
        Ok(())
    }

    pub fn records(&self) -> &[GameRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn save(&self, path: &Path) -> Result<(), DatasetError> {
        let json = serde_json::to_string(self).map_err(|source| DatasetError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads and validates a dataset. Feature vectors are checked while
    /// parsing; the declared width and every label are checked afterwards.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let contents = fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset: Dataset =
            serde_json::from_str(&contents).map_err(|source| DatasetError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        if dataset.feature_len != FEATURE_LEN {
            return Err(DatasetError::FeatureLen {
                actual: dataset.feature_len,
            });
        }
        if let Some((index, record)) = dataset
            .records
            .iter()
            .enumerate()
            .find(|(_, r)| !valid_label(r.label))
        {
            return Err(DatasetError::Label {
                index,
                label: record.label,
            });
        }
        Ok(dataset)
    }
}

/// Plays between 1 and [`MAX_RANDOM_PLIES`] uniformly random legal moves from
/// the start position, stopping early at any game-ending position (mate,
/// stalemate or a draw rule).
pub fn random_position<R: Rng + ?Sized>(rng: &mut R) -> Result<Position, RulesError> {
    let mut pos = Position::startpos();
    let plies = rng.gen_range(1..=MAX_RANDOM_PLIES);
    random_walk(&mut pos, plies, rng)?;
    Ok(pos)
}

/// Plays up to `plies` random legal moves on `pos`, never past a terminal.
fn random_walk<R: Rng + ?Sized>(
    pos: &mut Position,
    plies: u32,
    rng: &mut R,
) -> Result<(), RulesError> {
    for _ in 0..plies {
        if pos.terminal().is_some() {
            break;
        }
        let moves = pos.legal_moves();
        let Some(&mv) = moves.choose(rng) else {
            break;
        };
        pos.push(mv)?;
    }
    Ok(())
}

/// Demonstration label: the game result where it is decided, noise otherwise.
///
/// Checkmate is +1 when White delivered it and -1 when Black did; stalemate
/// and insufficient material are 0. Every other position gets a uniform
/// random value in [-1, 1].
pub fn synthetic_label<R: Rng + ?Sized>(pos: &Position, rng: &mut R) -> f32 {
    match pos.terminal() {
        Some(Terminal::Checkmate) => match pos.side_to_move() {
            Color::Black => 1.0,
            Color::White => -1.0,
        },
        Some(Terminal::Stalemate | Terminal::InsufficientMaterial) => 0.0,
        _ => rng.gen_range(-1.0..=1.0),
    }
}

/// Builds `samples` random positions with [`synthetic_label`] labels.
pub fn generate_synthetic<R: Rng + ?Sized>(
    samples: usize,
    rng: &mut R,
) -> Result<Dataset, DatasetError> {
    let mut dataset = Dataset::new();
    let mut decided = 0usize;

    for i in 0..samples {
        let pos = random_position(rng)?;
        if pos.terminal().is_some() {
            decided += 1;
        }
        let label = synthetic_label(&pos, rng);
        dataset.push(GameRecord::new(encode_position(&pos), label))?;

        if (i + 1) % 1000 == 0 {
            debug!(generated = i + 1, total = samples, "synthetic samples");
        }
    }

    info!(samples, decided, "generated synthetic dataset");
    Ok(dataset)
}

#[cfg(test)]
#[path = "dataset_tests.rs"]
mod dataset_tests;
