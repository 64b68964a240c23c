//! Decision Output

use crate::rules::RuleId;
use inference_engine::{ClassLabel, ClassProbabilities};
use serde::{Deserialize, Serialize};

/// Where a verdict came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// A heuristic rule fired; probabilities are the policy's forced pair
    Rule,
    /// No rule fired; label and probabilities come from the classifier verbatim
    Model,
}

/// Engine decision for one feature vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub label: ClassLabel,
    pub probabilities: ClassProbabilities,
    pub source: Source,
    /// Rule that fired, when `source` is `Rule`
    pub rule: Option<RuleId>,
}

impl Verdict {
    /// Verdict forced by a rule
    pub fn from_rule(rule: RuleId, label: ClassLabel, probabilities: ClassProbabilities) -> Self {
        Self {
            label,
            probabilities,
            source: Source::Rule,
            rule: Some(rule),
        }
    }

    /// Verdict passed through from the classifier
    pub fn from_model(label: ClassLabel, probabilities: ClassProbabilities) -> Self {
        Self {
            label,
            probabilities,
            source: Source::Model,
            rule: None,
        }
    }

    /// Probability of disease
    pub fn risk(&self) -> f64 {
        self.probabilities.disease
    }

    /// Whether the high-risk class was chosen
    pub fn is_high_risk(&self) -> bool {
        self.label == ClassLabel::Disease
    }
}
