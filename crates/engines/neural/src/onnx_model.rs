//! ONNX model loading and inference
//!
//! This module handles loading ONNX models and running inference.
//! Requires the `onnx` feature to be enabled.

use std::path::Path;

use chess_core::EvalError;
use tract_onnx::prelude::*;

use crate::features::FEATURE_LEN;

/// Wrapper around an ONNX model for chess position evaluation.
pub struct OnnxModel {
    model: SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>,
    input_size: usize,
}

impl OnnxModel {
    /// Load an ONNX model from the given path, fixing the batch size to one.
    pub fn load(path: &Path) -> TractResult<Self> {
        let model = tract_onnx::onnx()
            .model_for_path(path)?
            .with_input_fact(0, f32::fact([1, FEATURE_LEN]).into())?
            .into_optimized()?
            .into_runnable()?;

        let input_fact = model.model().input_fact(0)?;
        let input_size = input_fact
            .shape
            .iter()
            .filter_map(|d| d.to_i64().ok())
            .product::<i64>() as usize;
        if input_size != FEATURE_LEN {
            return Err(TractError::msg(format!(
                "model takes {input_size} inputs, expected {FEATURE_LEN}"
            )));
        }

        Ok(Self { model, input_size })
    }

    /// Raw network output for one feature vector.
    pub fn evaluate(&self, features: &[f32]) -> Result<f32, EvalError> {
        if features.len() != self.input_size {
            return Err(EvalError::InputSize {
                expected: self.input_size,
                actual: features.len(),
            });
        }

        let input: Tensor =
            tract_ndarray::Array::from_shape_vec((1, self.input_size), features.to_vec())
                .map_err(|e| EvalError::Inference(e.to_string()))?
                .into();

        let outputs = self
            .model
            .run(tvec!(input.into()))
            .map_err(|e| EvalError::Inference(e.to_string()))?;
        let output = outputs[0]
            .to_array_view::<f32>()
            .map_err(|e| EvalError::Inference(e.to_string()))?;
        output
            .iter()
            .next()
            .copied()
            .ok_or_else(|| EvalError::Inference("model produced no output".to_string()))
    }

    /// Get the expected input size for this model.
    pub fn input_size(&self) -> usize {
        self.input_size
    }
}
