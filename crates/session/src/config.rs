//! TOML session configuration.
//!
//! ```toml
//! [players]
//! white = "human"          # human | random_ai | search_ai
//! black = "search_ai"
//!
//! [search]
//! depth = 2
//! alpha_beta = false
//! move_time_ms = 500       # optional per-move deadline
//!
//! [evaluator]
//! kind = "learned"         # random | learned
//! model = "models/v001/model.json"
//! seed = 7                 # optional, seeds the random evaluators
//! ```
//!
//! Every section and key is optional; unknown keys and unknown player types
//! are errors.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chess_core::{Evaluator, Position};
use neural_engine::LearnedEvaluator;
use random_engine::RandomEvaluator;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::orchestrator::{GameOrchestrator, SearchConfig, SessionError};
use crate::player::PlayerAssignment;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("search depth must be at least 1")]
    ZeroDepth,
    #[error("evaluator kind `learned` needs a `model` path")]
    MissingModel,
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub players: PlayerAssignment,
    pub search: SearchSettings,
    pub evaluator: EvaluatorSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchSettings {
    pub depth: u8,
    pub alpha_beta: bool,
    /// 0 or absent means no deadline
    pub move_time_ms: Option<u64>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            depth: 2,
            alpha_beta: false,
            move_time_ms: None,
        }
    }
}

impl SearchSettings {
    pub fn move_time(&self) -> Option<Duration> {
        self.move_time_ms
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluatorKind {
    #[default]
    Random,
    Learned,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvaluatorSpec {
    pub kind: EvaluatorKind,
    pub model: Option<PathBuf>,
    pub seed: Option<u64>,
}

/// Where the search evaluator of a built session came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluatorSource {
    Random { seed: Option<u64> },
    Learned { model: PathBuf },
    /// The learned model could not be loaded; random scores are used instead.
    Fallback { model: PathBuf, reason: String },
}

impl EvaluatorSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, EvaluatorSource::Fallback { .. })
    }
}

impl SessionConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        info!(path = %path.display(), "loaded session config");
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        if self.evaluator.kind == EvaluatorKind::Learned && self.evaluator.model.is_none() {
            return Err(ConfigError::MissingModel);
        }
        Ok(())
    }

    fn random_evaluator(&self) -> RandomEvaluator {
        match self.evaluator.seed {
            Some(seed) => RandomEvaluator::seeded(seed),
            None => RandomEvaluator::new(),
        }
    }

    /// The search evaluator this config asks for.
    ///
    /// A learned model that cannot be loaded is replaced by a random
    /// evaluator; the returned source says so.
    pub fn build_evaluator(
        &self,
    ) -> Result<(Box<dyn Evaluator<Position> + Send>, EvaluatorSource), ConfigError> {
        let model = match (self.evaluator.kind, &self.evaluator.model) {
            (EvaluatorKind::Random, _) => {
                let source = EvaluatorSource::Random {
                    seed: self.evaluator.seed,
                };
                return Ok((Box::new(self.random_evaluator()), source));
            }
            (EvaluatorKind::Learned, Some(model)) => model,
            (EvaluatorKind::Learned, None) => return Err(ConfigError::MissingModel),
        };

        match LearnedEvaluator::load(model) {
            Ok(learned) => Ok((
                Box::new(learned),
                EvaluatorSource::Learned {
                    model: model.clone(),
                },
            )),
            Err(e) => {
                warn!(model = %model.display(), error = %e, "learned evaluator unavailable, falling back to random");
                Ok((
                    Box::new(self.random_evaluator()),
                    EvaluatorSource::Fallback {
                        model: model.clone(),
                        reason: e.to_string(),
                    },
                ))
            }
        }
    }

    /// A ready-to-play session plus where its evaluator came from.
    pub fn build(&self) -> Result<(GameOrchestrator, EvaluatorSource), ConfigError> {
        self.validate()?;
        let (evaluator, source) = self.build_evaluator()?;
        let search = SearchConfig::new(self.search.depth, evaluator)
            .with_alpha_beta(self.search.alpha_beta)
            .with_move_time(self.search.move_time());
        let mut session = GameOrchestrator::new(self.players, search)?;
        if let Some(seed) = self.evaluator.seed {
            session = session.with_random_seed(seed);
        }
        Ok((session, source))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
