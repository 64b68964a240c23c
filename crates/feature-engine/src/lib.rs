//! Patient Feature Schema
//!
//! Fixed 17-slot feature layout, schema checks and categorical encoding
//! for cardiovascular risk scoring.

mod encoding;
mod error;
mod features;
mod patient;
mod schema;

pub use encoding::{CategoricalTable, EncodingTables, AGE_CATEGORIES};
pub use error::{EncodeError, SchemaError};
pub use features::{Feature, FeatureKind, FeatureVector, FEATURE_DIMENSION};
pub use patient::PatientProfile;
pub use schema::FeatureRow;
