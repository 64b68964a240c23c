//! Schema and Encoding Error Types

use crate::Feature;
use thiserror::Error;

/// A feature vector that does not fit the schema
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// Vector has the wrong number of values
    #[error("Expected {expected} features, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    /// NaN or infinite value
    #[error("{feature} value {value} is not finite")]
    NonFinite { feature: Feature, value: f64 },

    /// Value is not an index into the feature's table
    #[error("{feature} value {value} is not a valid index (expected 0..{cardinality})")]
    CategoryOutOfRange {
        feature: Feature,
        value: f64,
        cardinality: usize,
    },
}

/// Failure turning a human-readable profile into a feature vector
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    /// Label is not present in the feature's encoding table
    #[error("Unknown {feature} category: {label:?}")]
    UnknownCategory { feature: Feature, label: String },

    /// No encoding table exists for the feature
    #[error("No encoding table for {0}")]
    MissingTable(Feature),

    /// Encoding table size disagrees with the schema
    #[error("{feature} table has {actual} labels, schema expects {expected}")]
    TableSize {
        feature: Feature,
        expected: usize,
        actual: usize,
    },
}
