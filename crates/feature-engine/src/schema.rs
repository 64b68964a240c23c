//! Schema-Checked Feature Row

use crate::error::SchemaError;
use crate::features::{Feature, FeatureKind, FeatureVector, FEATURE_DIMENSION};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Feature vector that passed the schema check.
///
/// Exactly [`FEATURE_DIMENSION`] finite values; every binary and categorical
/// slot holds a whole number inside its table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FeatureVector", into = "FeatureVector")]
pub struct FeatureRow([f64; FEATURE_DIMENSION]);

impl FeatureRow {
    /// Value of a feature
    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }

    /// Table index of a binary or categorical feature
    pub fn category(&self, feature: Feature) -> usize {
        // Checked on construction to be a whole number in range
        self.0[feature.index()] as usize
    }

    /// Whether a binary feature is set
    pub fn flag(&self, feature: Feature) -> bool {
        self.get(feature) == 1.0
    }

    /// Values in vector order
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Copy back into an unchecked vector
    pub fn to_vector(&self) -> FeatureVector {
        FeatureVector::from(self.0)
    }
}

fn check_value(feature: Feature, value: f64) -> Result<(), SchemaError> {
    if !value.is_finite() {
        return Err(SchemaError::NonFinite { feature, value });
    }

    if feature.kind() == FeatureKind::Continuous {
        return Ok(());
    }

    let cardinality = feature.cardinality().unwrap_or(0);
    let whole = value.fract() == 0.0;
    if !whole || value < 0.0 || value >= cardinality as f64 {
        return Err(SchemaError::CategoryOutOfRange {
            feature,
            value,
            cardinality,
        });
    }

    Ok(())
}

impl TryFrom<&[f64]> for FeatureRow {
    type Error = SchemaError;

    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        let row: [f64; FEATURE_DIMENSION] =
            values.try_into().map_err(|_| SchemaError::WrongLength {
                expected: FEATURE_DIMENSION,
                actual: values.len(),
            })?;

        for feature in Feature::ALL {
            if let Err(e) = check_value(feature, row[feature.index()]) {
                debug!("Schema check failed: {}", e);
                return Err(e);
            }
        }

        Ok(Self(row))
    }
}

impl TryFrom<&FeatureVector> for FeatureRow {
    type Error = SchemaError;

    fn try_from(vector: &FeatureVector) -> Result<Self, Self::Error> {
        Self::try_from(vector.values.as_slice())
    }
}

impl TryFrom<FeatureVector> for FeatureRow {
    type Error = SchemaError;

    fn try_from(vector: FeatureVector) -> Result<Self, Self::Error> {
        Self::try_from(vector.values.as_slice())
    }
}

impl From<FeatureRow> for FeatureVector {
    fn from(row: FeatureRow) -> Self {
        row.to_vector()
    }
}
