use thiserror::Error;

/// Failure while scoring a position.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("model expects {expected} inputs, got {actual}")]
    InputSize { expected: usize, actual: usize },
    #[error("inference failed: {0}")]
    Inference(String),
}

/// Scores non-terminal positions of type `P`.
///
/// Scores are from White's point of view: positive favours White. The search
/// flips them when Black is the side it maximizes for, and it never asks an
/// evaluator about checkmates or draws.
pub trait Evaluator<P: ?Sized>: Send {
    fn score(&mut self, position: &P) -> Result<f64, EvalError>;

    /// Short name for logs and status lines.
    fn name(&self) -> &str;
}
