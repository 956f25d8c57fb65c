//! Learned Position Evaluator
//!
//! This crate turns positions into fixed-length feature vectors and scores
//! them with a trained network.
//!
//! # Model formats
//!
//! The format is picked by file extension:
//! ```text
//! models/
//!   v001/
//!     model.json    dense MLP, always available
//!   v002/
//!     model.onnx    ONNX graph, needs the `onnx` feature
//! ```
//!
//! Loading never silently degrades: a missing or malformed artifact is an
//! [`EvaluatorUnavailable`] error, and the caller decides what to fall back to.

pub mod dataset;
pub mod features;
pub mod model;

#[cfg(feature = "onnx")]
mod onnx_model;

use std::path::{Path, PathBuf};

use chess_core::{EvalError, Evaluator, Position};
use thiserror::Error;
use tracing::info;

pub use dataset::{Dataset, DatasetError, GameRecord, generate_synthetic};
pub use features::{FEATURE_LEN, FeatureVector, encode, encode_position};
pub use model::{Activation, DenseLayer, MlpModel, ModelError};

/// A learned evaluator could not be constructed from its artifact.
#[derive(Debug, Error)]
pub enum EvaluatorUnavailable {
    #[error("model file {0} not found")]
    NotFound(PathBuf),
    #[error("failed to read model {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model {path} is not a valid network: {reason}")]
    Malformed { path: PathBuf, reason: String },
    #[error("unsupported model format {0} (expected .json or .onnx)")]
    UnsupportedFormat(PathBuf),
    #[error("cannot load {0}: built without the `onnx` feature")]
    OnnxDisabled(PathBuf),
}

enum Network {
    Mlp(MlpModel),
    #[cfg(feature = "onnx")]
    Onnx(onnx_model::OnnxModel),
}

/// Evaluator backed by a trained network.
///
/// Scores are the raw network output, unclamped, from White's point of view.
pub struct LearnedEvaluator {
    network: Network,
    /// Path to the loaded model (None when built in memory)
    model_path: Option<PathBuf>,
    /// Cached name for logs and status lines
    name: String,
}

impl std::fmt::Debug for LearnedEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LearnedEvaluator")
            .field("name", &self.name)
            .field("model_path", &self.model_path)
            .finish_non_exhaustive()
    }
}

impl LearnedEvaluator {
    /// Loads a `.json` MLP or a `.onnx` model.
    ///
    /// # Example
    /// ```ignore
    /// let eval = LearnedEvaluator::load("models/v001/model.json")?;
    /// ```
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EvaluatorUnavailable> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(EvaluatorUnavailable::NotFound(path.to_path_buf()));
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let network = match extension.as_deref() {
            Some("json") => Network::Mlp(load_mlp(path)?),
            Some("onnx") => load_onnx(path)?,
            _ => return Err(EvaluatorUnavailable::UnsupportedFormat(path.to_path_buf())),
        };

        let name = model_name(path);
        info!(model = %path.display(), %name, "loaded learned evaluator");
        Ok(Self {
            network,
            model_path: Some(path.to_path_buf()),
            name,
        })
    }

    /// Wraps an in-memory MLP.
    pub fn from_mlp(model: MlpModel) -> Self {
        Self {
            network: Network::Mlp(model),
            model_path: None,
            name: "learned-mlp".to_string(),
        }
    }

    /// Returns the path to the currently loaded model, if any.
    pub fn model_path(&self) -> Option<&Path> {
        self.model_path.as_deref()
    }

    /// Raw network output for an already encoded position.
    pub fn evaluate_features(&self, features: &FeatureVector) -> Result<f64, EvalError> {
        let raw = match &self.network {
            Network::Mlp(model) => model.forward(features.as_slice())?,
            #[cfg(feature = "onnx")]
            Network::Onnx(model) => model.evaluate(features.as_slice())?,
        };
        Ok(f64::from(raw))
    }
}

impl Evaluator<Position> for LearnedEvaluator {
    fn score(&mut self, position: &Position) -> Result<f64, EvalError> {
        self.evaluate_features(&encode_position(position))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// `models/v001/model.json` is called `learned-v001`; a bare file uses its stem.
fn model_name(path: &Path) -> String {
    let version = path
        .parent()
        .and_then(Path::file_name)
        .or_else(|| path.file_stem())
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("learned-{version}")
}

fn load_mlp(path: &Path) -> Result<MlpModel, EvaluatorUnavailable> {
    let contents = std::fs::read_to_string(path).map_err(|source| EvaluatorUnavailable::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let malformed = |reason: String| EvaluatorUnavailable::Malformed {
        path: path.to_path_buf(),
        reason,
    };
    let model: MlpModel = serde_json::from_str(&contents).map_err(|e| malformed(e.to_string()))?;
    model.validate().map_err(|e| malformed(e.to_string()))?;
    Ok(model)
}

#[cfg(feature = "onnx")]
fn load_onnx(path: &Path) -> Result<Network, EvaluatorUnavailable> {
    onnx_model::OnnxModel::load(path)
        .map(Network::Onnx)
        .map_err(|e| EvaluatorUnavailable::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

#[cfg(not(feature = "onnx"))]
fn load_onnx(path: &Path) -> Result<Network, EvaluatorUnavailable> {
    Err(EvaluatorUnavailable::OnnxDisabled(path.to_path_buf()))
}
