//! Engine Error Types

use feature_engine::SchemaError;
use inference_engine::InferenceError;
use thiserror::Error;

fn at_row(row: &Option<usize>) -> String {
    row.map(|r| format!(" at row {}", r)).unwrap_or_default()
}

/// Errors returned by `classify` and `classify_batch`
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed feature vector; fix the input and retry
    #[error("Schema error{}: {source}", at_row(.row))]
    Schema {
        /// Position within the batch
        row: Option<usize>,
        source: SchemaError,
    },

    /// Statistical classifier missing or failed; not retried
    #[error("Classifier unavailable{}: {source}", at_row(.row))]
    ClassifierUnavailable {
        /// Position within the batch
        row: Option<usize>,
        source: InferenceError,
    },
}

impl EngineError {
    /// Batch position the error refers to
    pub fn row(&self) -> Option<usize> {
        match self {
            EngineError::Schema { row, .. } | EngineError::ClassifierUnavailable { row, .. } => {
                *row
            }
        }
    }

    /// Tag the error with a batch position
    pub fn at(self, index: usize) -> Self {
        match self {
            EngineError::Schema { source, .. } => EngineError::Schema {
                row: Some(index),
                source,
            },
            EngineError::ClassifierUnavailable { source, .. } => {
                EngineError::ClassifierUnavailable {
                    row: Some(index),
                    source,
                }
            }
        }
    }

    /// Whether the caller can fix this by correcting the input
    pub fn is_schema(&self) -> bool {
        matches!(self, EngineError::Schema { .. })
    }
}

impl From<SchemaError> for EngineError {
    fn from(source: SchemaError) -> Self {
        EngineError::Schema { row: None, source }
    }
}

impl From<InferenceError> for EngineError {
    fn from(source: InferenceError) -> Self {
        EngineError::ClassifierUnavailable { row: None, source }
    }
}
