//! Random Evaluator
//!
//! Scores every position uniformly at random in `[-1, 1]`.
//! Useful for:
//! - Testing infrastructure before a model is trained
//! - Baseline comparisons (any real evaluator should easily beat this)
//! - Falling back when a learned model cannot be loaded

use chess_core::{EvalError, Evaluator};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};


/// An evaluator with no chess knowledge at all.
///
/// The search still finds mates through it, since terminal positions are
/// scored by the search and never reach the evaluator.
#[derive(Debug, Clone)]
pub struct RandomEvaluator {
    rng: StdRng,
    seed: Option<u64>,
}

impl Default for RandomEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomEvaluator {
    /// Seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Reproducible sequence of scores.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl<P: ?Sized> Evaluator<P> for RandomEvaluator {
    fn score(&mut self, _position: &P) -> Result<f64, EvalError> {
        Ok(self.rng.gen_range(-1.0..=1.0))
    }

    fn name(&self) -> &str {
        "random"
    }
}
