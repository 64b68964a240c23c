//! Patient Data Validation
//!
//! Range checking of encoded patient features against documented clinical bounds.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{ValidationConfig, ValidationResult, Validator};
