//! Verdict Advisory
//!
//! Turns a verdict into a risk band, the contributing risk factors found in
//! the patient row, and lifestyle recommendations.

mod advisor;

pub use advisor::{
    Advisor, Advisory, AdvisoryConfig, AdvisoryError, Recommendation, RiskBand, RiskFactor,
};
