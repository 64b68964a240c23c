//! Classifier Capability

use crate::InferenceError;
use feature_engine::FeatureRow;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Binary heart disease class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassLabel {
    /// Class 0
    NoDisease,
    /// Class 1
    Disease,
}

impl ClassLabel {
    /// Label for a class index (0 or 1)
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(ClassLabel::NoDisease),
            1 => Some(ClassLabel::Disease),
            _ => None,
        }
    }

    /// Class index
    pub fn index(&self) -> usize {
        match self {
            ClassLabel::NoDisease => 0,
            ClassLabel::Disease => 1,
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassLabel::NoDisease => "no_disease",
            ClassLabel::Disease => "disease",
        }
    }
}

/// Class probability pair (p0, p1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    /// Probability of class 0
    pub no_disease: f64,
    /// Probability of class 1
    pub disease: f64,
}

impl ClassProbabilities {
    /// Create a pair
    pub const fn new(no_disease: f64, disease: f64) -> Self {
        Self {
            no_disease,
            disease,
        }
    }

    /// As a (p0, p1) tuple
    pub fn pair(&self) -> (f64, f64) {
        (self.no_disease, self.disease)
    }

    /// Class with the higher probability; ties go to class 0
    pub fn argmax(&self) -> ClassLabel {
        if self.disease > self.no_disease {
            ClassLabel::Disease
        } else {
            ClassLabel::NoDisease
        }
    }

    /// Whether both values lie in [0, 1] and sum to 1 within `tolerance`
    pub fn is_normalized(&self, tolerance: f64) -> bool {
        let in_unit = |p: f64| (0.0..=1.0).contains(&p);
        in_unit(self.no_disease)
            && in_unit(self.disease)
            && (self.no_disease + self.disease - 1.0).abs() <= tolerance
    }
}

/// Label and probabilities for one row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: ClassLabel,
    pub probabilities: ClassProbabilities,
}

/// Failure of a batched prediction, naming the row within the batch
#[derive(Debug, Error)]
#[error("Row {row}: {source}")]
pub struct BatchInferenceError {
    pub row: usize,
    #[source]
    pub source: InferenceError,
}

/// Pre-trained classifier consulted for inference only.
///
/// Implementations must not mutate internal state during prediction so that a
/// single instance can be shared across threads.
pub trait StatisticalClassifier: Send + Sync {
    /// Model identifier for logs
    fn name(&self) -> &str;

    /// Predict the class of one row
    fn predict(&self, row: &FeatureRow) -> Result<ClassLabel, InferenceError>;

    /// Predict class probabilities for one row
    fn predict_probability(&self, row: &FeatureRow) -> Result<ClassProbabilities, InferenceError>;

    /// Predict a batch of rows.
    ///
    /// Overrides must return exactly what `predict` and `predict_probability`
    /// return for each row.
    fn predict_batch(&self, rows: &[FeatureRow]) -> Result<Vec<Prediction>, BatchInferenceError> {
        rows.iter()
            .enumerate()
            .map(|(row, features)| {
                let label = self
                    .predict(features)
                    .map_err(|source| BatchInferenceError { row, source })?;
                let probabilities = self
                    .predict_probability(features)
                    .map_err(|source| BatchInferenceError { row, source })?;
                Ok(Prediction {
                    label,
                    probabilities,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::{Feature, FEATURE_DIMENSION};

    /// Predicts disease for rows whose BMI exceeds a cut, fails on BMI 0
    struct BmiCut(f64);

    impl StatisticalClassifier for BmiCut {
        fn name(&self) -> &str {
            "bmi-cut"
        }

        fn predict(&self, row: &FeatureRow) -> Result<ClassLabel, InferenceError> {
            Ok(self.predict_probability(row)?.argmax())
        }

        fn predict_probability(
            &self,
            row: &FeatureRow,
        ) -> Result<ClassProbabilities, InferenceError> {
            let bmi = row.get(Feature::Bmi);
            if bmi == 0.0 {
                return Err(InferenceError::InferenceFailed("zero bmi".to_string()));
            }
            Ok(if bmi > self.0 {
                ClassProbabilities::new(0.3, 0.7)
            } else {
                ClassProbabilities::new(0.6, 0.4)
            })
        }
    }

    fn row(bmi: f64) -> FeatureRow {
        let mut values = [0.0; FEATURE_DIMENSION];
        values[Feature::Bmi.index()] = bmi;
        FeatureRow::try_from(&values[..]).unwrap()
    }

    #[test]
    fn test_label_indices() {
        assert_eq!(ClassLabel::from_index(0), Some(ClassLabel::NoDisease));
        assert_eq!(ClassLabel::from_index(1), Some(ClassLabel::Disease));
        assert_eq!(ClassLabel::from_index(2), None);
        assert_eq!(ClassLabel::Disease.index(), 1);
    }

    #[test]
    fn test_argmax_tie_goes_to_no_disease() {
        assert_eq!(
            ClassProbabilities::new(0.5, 0.5).argmax(),
            ClassLabel::NoDisease
        );
        assert_eq!(
            ClassProbabilities::new(0.2, 0.8).argmax(),
            ClassLabel::Disease
        );
    }

    #[test]
    fn test_normalized() {
        assert!(ClassProbabilities::new(0.1, 0.9).is_normalized(1e-9));
        assert!(!ClassProbabilities::new(0.5, 0.6).is_normalized(1e-9));
        assert!(!ClassProbabilities::new(-0.1, 1.1).is_normalized(1e-9));
    }

    #[test]
    fn test_default_batch_matches_single_rows() {
        let model = BmiCut(30.0);
        let rows = [row(25.0), row(35.0)];
        let batch = model.predict_batch(&rows).unwrap();

        for (features, prediction) in rows.iter().zip(&batch) {
            assert_eq!(prediction.label, model.predict(features).unwrap());
            assert_eq!(
                prediction.probabilities,
                model.predict_probability(features).unwrap()
            );
        }
    }

    #[test]
    fn test_default_batch_names_failing_row() {
        let model = BmiCut(30.0);
        let err = model
            .predict_batch(&[row(25.0), row(40.0), row(0.0)])
            .unwrap_err();
        assert_eq!(err.row, 2);
    }
}
