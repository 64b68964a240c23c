//! Statistical Classifier
//!
//! Prediction interface for pre-trained heart disease classifiers, with an
//! averaged decision-tree ensemble and an ONNX backend using tract.

mod classifier;
mod forest;
mod onnx;

pub use classifier::{
    BatchInferenceError, ClassLabel, ClassProbabilities, Prediction, StatisticalClassifier,
};
pub use forest::{DecisionTree, ForestClassifier, TreeNode};
pub use onnx::OnnxClassifier;

use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model not loaded")]
    ModelNotLoaded,
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
    #[error("Invalid model: {0}")]
    InvalidModel(String),
}
