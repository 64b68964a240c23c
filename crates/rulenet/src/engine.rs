//! Hybrid Decision Engine
//!
//! Runs the rule cascade first and consults the statistical classifier only
//! for rows on which every rule defers.

use crate::error::EngineError;
use crate::policy::{PolicyError, RulePolicy};
use crate::rules::{RuleCascade, RuleMatch};
use crate::verdict::{Source, Verdict};
use feature_engine::{FeatureRow, FeatureVector};
use inference_engine::{InferenceError, StatisticalClassifier};
use std::sync::Arc;
use tracing::{debug, info};

/// Rule-plus-classifier decision engine.
///
/// Holds no mutable state; share it behind an `Arc` across threads.
pub struct RuleNet {
    cascade: RuleCascade,
    classifier: Arc<dyn StatisticalClassifier>,
}

impl RuleNet {
    /// Wire the engine to a pre-trained classifier using the default policy
    pub fn new(classifier: Arc<dyn StatisticalClassifier>) -> Self {
        info!("Creating RuleNet engine with classifier '{}'", classifier.name());
        Self {
            cascade: RuleCascade::default(),
            classifier,
        }
    }

    /// Wire the engine with a custom rule policy
    pub fn with_policy(
        classifier: Arc<dyn StatisticalClassifier>,
        policy: RulePolicy,
    ) -> Result<Self, PolicyError> {
        policy.check()?;
        info!(
            "Creating RuleNet engine with classifier '{}' and policy {:?}",
            classifier.name(),
            policy
        );
        Ok(Self {
            cascade: RuleCascade::new(policy),
            classifier,
        })
    }

    /// Active rule policy
    pub fn policy(&self) -> &RulePolicy {
        self.cascade.policy()
    }

    /// Injected classifier
    pub fn classifier(&self) -> &Arc<dyn StatisticalClassifier> {
        &self.classifier
    }

    /// Classify one feature vector
    pub fn classify(&self, vector: &FeatureVector) -> Result<Verdict, EngineError> {
        let row = FeatureRow::try_from(vector)?;
        self.classify_row(&row)
    }

    /// Classify a row that already passed the schema check
    pub fn classify_row(&self, row: &FeatureRow) -> Result<Verdict, EngineError> {
        if let Some(matched) = self.cascade.evaluate(row) {
            let verdict = self.rule_verdict(matched);
            record(&verdict);
            return Ok(verdict);
        }

        let label = self.classifier.predict(row)?;
        let probabilities = self.classifier.predict_probability(row)?;
        let verdict = Verdict::from_model(label, probabilities);
        record(&verdict);
        debug!(
            "Model verdict: {} {:?}",
            label.as_str(),
            probabilities.pair()
        );
        Ok(verdict)
    }

    /// Classify many vectors.
    ///
    /// Results and errors are the same as calling [`classify`](Self::classify)
    /// on each vector in order; rows on which every rule defers go to the
    /// classifier in a single batch. Verdict counters move only when the whole
    /// batch succeeds.
    pub fn classify_batch(&self, vectors: &[FeatureVector]) -> Result<Vec<Verdict>, EngineError> {
        let mut verdicts: Vec<Option<Verdict>> = Vec::with_capacity(vectors.len());
        let mut deferred_rows = Vec::new();
        let mut deferred_at = Vec::new();
        let mut schema_failure = None;

        for (index, vector) in vectors.iter().enumerate() {
            let row = match FeatureRow::try_from(vector) {
                Ok(row) => row,
                Err(e) => {
                    // Rows after the first malformed one are never reached sequentially
                    schema_failure = Some(EngineError::from(e).at(index));
                    break;
                }
            };

            match self.cascade.evaluate(&row) {
                Some(matched) => verdicts.push(Some(self.rule_verdict(matched))),
                None => {
                    verdicts.push(None);
                    deferred_rows.push(row);
                    deferred_at.push(index);
                }
            }
        }

        debug!(
            "Batch of {}: {} rule verdicts, {} deferred to classifier",
            vectors.len(),
            verdicts.len() - deferred_rows.len(),
            deferred_rows.len()
        );

        if !deferred_rows.is_empty() {
            let predictions = self.classifier.predict_batch(&deferred_rows).map_err(|e| {
                EngineError::ClassifierUnavailable {
                    row: deferred_at.get(e.row).copied(),
                    source: e.source,
                }
            })?;

            if predictions.len() != deferred_rows.len() {
                return Err(EngineError::ClassifierUnavailable {
                    row: deferred_at.get(predictions.len()).copied(),
                    source: InferenceError::InferenceFailed(format!(
                        "classifier returned {} predictions for {} rows",
                        predictions.len(),
                        deferred_rows.len()
                    )),
                });
            }

            for (index, prediction) in deferred_at.iter().zip(predictions) {
                verdicts[*index] = Some(Verdict::from_model(
                    prediction.label,
                    prediction.probabilities,
                ));
            }
        }

        if let Some(e) = schema_failure {
            return Err(e);
        }

        let verdicts: Vec<Verdict> = verdicts.into_iter().flatten().collect();
        verdicts.iter().for_each(record);
        Ok(verdicts)
    }

    fn rule_verdict(&self, matched: RuleMatch) -> Verdict {
        let probabilities = self.cascade.policy().forced(matched.label);
        Verdict::from_rule(matched.rule, matched.label, probabilities)
    }
}

fn record(verdict: &Verdict) {
    let rule = verdict.rule.map(|r| r.as_str()).unwrap_or("none");
    let source = match verdict.source {
        Source::Rule => "rule",
        Source::Model => "model",
    };
    metrics::counter!(
        "rulenet_verdicts_total",
        "source" => source,
        "rule" => rule,
        "label" => verdict.label.as_str()
    )
    .increment(1);
}
