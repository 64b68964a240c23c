//! RuleNet Decision Engine
//!
//! Hybrid heart disease risk classifier: a short cascade of medical
//! heuristic rules, falling back to a pre-trained statistical classifier
//! when no rule applies.

mod batcher;
mod engine;
mod error;
mod policy;
mod rules;
mod verdict;

pub use batcher::{BatcherError, BatcherHandle, ClassifyBatcher};
pub use engine::RuleNet;
pub use error::EngineError;
pub use policy::{PolicyError, RulePolicy, FORCED_DISEASE, FORCED_NO_DISEASE};
pub use rules::{
    protective_profile, severe_combined_risk, smoking_with_age, RuleCascade, RuleId, RuleMatch,
    RuleOutcome,
};
pub use verdict::{Source, Verdict};
