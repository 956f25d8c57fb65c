//! Dense multilayer perceptron stored as JSON.
//!
//! The training pipeline produces an 832 → 256 → 128 → 64 → 1 network with
//! ReLU hidden layers and a linear output, but any stack of dense layers that
//! starts at [`FEATURE_LEN`] inputs and ends in a single output is accepted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use chess_core::EvalError;

use crate::features::FEATURE_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Relu,
    Linear,
}

impl Activation {
    #[inline]
    fn apply(self, x: f32) -> f32 {
        match self {
            Activation::Relu => x.max(0.0),
            Activation::Linear => x,
        }
    }
}

/// One fully connected layer. `weights[o][i]` connects input `i` to output `o`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f32>>,
    pub biases: Vec<f32>,
    pub activation: Activation,
}

impl DenseLayer {
    pub fn inputs(&self) -> usize {
        self.weights.first().map_or(0, Vec::len)
    }

    pub fn outputs(&self) -> usize {
        self.weights.len()
    }

    fn forward(&self, input: &[f32]) -> Vec<f32> {
        self.weights
            .iter()
            .zip(&self.biases)
            .map(|(row, bias)| {
                let sum: f32 = row.iter().zip(input).map(|(w, x)| w * x).sum();
                self.activation.apply(sum + bias)
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("model has no layers")]
    Empty,
    #[error("first layer takes {0} inputs, expected {expected}", expected = FEATURE_LEN)]
    InputWidth(usize),
    #[error("last layer yields {0} outputs, expected 1")]
    OutputWidth(usize),
    #[error("layer {layer}: {reason}")]
    Shape { layer: usize, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlpModel {
    layers: Vec<DenseLayer>,
}

impl MlpModel {
    /// Builds a model, checking that the layer shapes chain together.
    pub fn new(layers: Vec<DenseLayer>) -> Result<Self, ModelError> {
        let model = Self { layers };
        model.validate()?;
        Ok(model)
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        let first = self.layers.first().ok_or(ModelError::Empty)?;
        if first.inputs() != FEATURE_LEN {
            return Err(ModelError::InputWidth(first.inputs()));
        }

        let mut width = FEATURE_LEN;
        for (layer, dense) in self.layers.iter().enumerate() {
            if dense.outputs() == 0 {
                return Err(ModelError::Shape {
                    layer,
                    reason: "no outputs".to_string(),
                });
            }
            if let Some(row) = dense.weights.iter().position(|row| row.len() != width) {
                return Err(ModelError::Shape {
                    layer,
                    reason: format!(
                        "weight row {row} has {} entries, expected {width}",
                        dense.weights[row].len()
                    ),
                });
            }
            if dense.biases.len() != dense.outputs() {
                return Err(ModelError::Shape {
                    layer,
                    reason: format!(
                        "{} biases for {} outputs",
                        dense.biases.len(),
                        dense.outputs()
                    ),
                });
            }
            width = dense.outputs();
        }

        if width != 1 {
            return Err(ModelError::OutputWidth(width));
        }
        Ok(())
    }

    /// Runs the network on one feature vector.
    pub fn forward(&self, features: &[f32]) -> Result<f32, EvalError> {
        if features.len() != FEATURE_LEN {
            return Err(EvalError::InputSize {
                expected: FEATURE_LEN,
                actual: features.len(),
            });
        }
        let mut activations = features.to_vec();
        for layer in &self.layers {
            activations = layer.forward(&activations);
        }
        activations
            .first()
            .copied()
            .ok_or_else(|| EvalError::Inference("model produced no output".to_string()))
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod model_tests;
