//! Rule Thresholds and Forced Confidence

use inference_engine::{ClassLabel, ClassProbabilities};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Probabilities reported when a rule forces the disease class
pub const FORCED_DISEASE: ClassProbabilities = ClassProbabilities::new(0.1, 0.9);

/// Probabilities reported when a rule forces the no-disease class
pub const FORCED_NO_DISEASE: ClassProbabilities = ClassProbabilities::new(0.9, 0.1);

/// Policy constants used by the rule cascade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulePolicy {
    /// Rule A fires when BMI exceeds this (default: 35)
    pub obesity_bmi: f64,
    /// Rule A fires when poor physical health days exceed this (default: 15)
    pub poor_physical_health_days: f64,
    /// Rule B fires for smokers at or above this age bucket (default: 10, "70-74")
    pub senior_age_index: usize,
    /// Rule C fires at or above this many sleep hours (default: 8)
    pub restful_sleep_hours: f64,
    /// Rule C requires exactly this many poor mental health days (default: 0)
    pub calm_mental_health_days: f64,
    /// Probabilities returned when a rule forces disease
    pub forced_disease: ClassProbabilities,
    /// Probabilities returned when a rule forces no disease
    pub forced_no_disease: ClassProbabilities,
}

impl Default for RulePolicy {
    fn default() -> Self {
        Self {
            obesity_bmi: 35.0,
            poor_physical_health_days: 15.0,
            senior_age_index: 10,
            restful_sleep_hours: 8.0,
            calm_mental_health_days: 0.0,
            forced_disease: FORCED_DISEASE,
            forced_no_disease: FORCED_NO_DISEASE,
        }
    }
}

/// Rejected rule policy
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    #[error("{field} threshold {value} is not finite")]
    NonFinite { field: &'static str, value: f64 },
    #[error("Forced {label:?} probabilities {pair:?} must be in [0, 1] and sum to 1")]
    NotAProbability { label: ClassLabel, pair: (f64, f64) },
    #[error("Forced {label:?} probabilities {pair:?} favour the other class")]
    WrongFavourite { label: ClassLabel, pair: (f64, f64) },
}

/// Allowed deviation from 1.0 for a forced pair
const SUM_TOLERANCE: f64 = 1e-9;

impl RulePolicy {
    /// Verify thresholds are finite and forced pairs are probabilities favouring their class
    pub fn check(&self) -> Result<(), PolicyError> {
        for (field, value) in [
            ("obesity_bmi", self.obesity_bmi),
            ("poor_physical_health_days", self.poor_physical_health_days),
            ("restful_sleep_hours", self.restful_sleep_hours),
            ("calm_mental_health_days", self.calm_mental_health_days),
        ] {
            if !value.is_finite() {
                return Err(PolicyError::NonFinite { field, value });
            }
        }

        for (label, pair) in [
            (ClassLabel::Disease, self.forced_disease),
            (ClassLabel::NoDisease, self.forced_no_disease),
        ] {
            if !pair.is_normalized(SUM_TOLERANCE) {
                return Err(PolicyError::NotAProbability {
                    label,
                    pair: pair.pair(),
                });
            }
            if pair.argmax() != label {
                return Err(PolicyError::WrongFavourite {
                    label,
                    pair: pair.pair(),
                });
            }
        }

        Ok(())
    }

    /// Forced probabilities for a label
    pub fn forced(&self, label: ClassLabel) -> ClassProbabilities {
        match label {
            ClassLabel::Disease => self.forced_disease,
            ClassLabel::NoDisease => self.forced_no_disease,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_valid() {
        let policy = RulePolicy::default();
        assert!(policy.check().is_ok());
        assert_eq!(policy.forced(ClassLabel::Disease).pair(), (0.1, 0.9));
        assert_eq!(policy.forced(ClassLabel::NoDisease).pair(), (0.9, 0.1));
    }

    #[test]
    fn test_rejects_unnormalized_pair() {
        let policy = RulePolicy {
            forced_disease: ClassProbabilities::new(0.2, 0.9),
            ..Default::default()
        };
        assert!(matches!(
            policy.check(),
            Err(PolicyError::NotAProbability {
                label: ClassLabel::Disease,
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_swapped_pair() {
        let policy = RulePolicy {
            forced_no_disease: FORCED_DISEASE,
            ..Default::default()
        };
        assert!(matches!(
            policy.check(),
            Err(PolicyError::WrongFavourite {
                label: ClassLabel::NoDisease,
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_nan_threshold() {
        let policy = RulePolicy {
            obesity_bmi: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            policy.check(),
            Err(PolicyError::NonFinite {
                field: "obesity_bmi",
                ..
            })
        ));
    }
}
