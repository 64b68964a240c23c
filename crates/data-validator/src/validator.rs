//! Data Validator for Range Checking

use crate::error::ValidationError;
use feature_engine::{Feature, FeatureRow};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Validation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// BMI valid range (kg/m²)
    pub bmi_range: (f64, f64),
    /// Poor physical/mental health days valid range (days per month)
    pub days_range: (f64, f64),
    /// Sleep valid range (hours)
    pub sleep_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            bmi_range: (10.0, 60.0),
            days_range: (0.0, 30.0),
            sleep_range: (0.0, 24.0),
        }
    }
}

impl ValidationConfig {
    /// Check that every range is finite and ordered
    pub fn check(&self) -> Result<(), ValidationError> {
        for (field, (min, max)) in [
            ("bmi", self.bmi_range),
            ("days", self.days_range),
            ("sleep", self.sleep_range),
        ] {
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(ValidationError::InvalidRange { field, min, max });
            }
        }
        Ok(())
    }
}

/// Result of validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether all values are valid
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Number of fields validated
    pub fields_checked: usize,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid(fields_checked: usize) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            fields_checked,
        }
    }

    /// Create an invalid result with errors
    pub fn invalid(errors: Vec<ValidationError>, fields_checked: usize) -> Self {
        Self {
            valid: false,
            errors,
            fields_checked,
        }
    }
}

/// Range validator for encoded patient rows
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Validate BMI
    pub fn validate_bmi(&self, bmi: f64) -> Result<(), ValidationError> {
        self.validate_range("bmi", bmi, self.config.bmi_range)
    }

    /// Validate a day count (physical or mental health)
    pub fn validate_days(&self, field: &'static str, days: f64) -> Result<(), ValidationError> {
        self.validate_range(field, days, self.config.days_range)
    }

    /// Validate sleep hours
    pub fn validate_sleep(&self, hours: f64) -> Result<(), ValidationError> {
        self.validate_range("sleep_hours", hours, self.config.sleep_range)
    }

    /// Validate every continuous feature of a row, collecting all failures
    pub fn validate(&self, row: &FeatureRow) -> ValidationResult {
        let checks = [
            self.validate_bmi(row.get(Feature::Bmi)),
            self.validate_days("physical_health_days", row.get(Feature::PhysicalHealthDays)),
            self.validate_days("mental_health_days", row.get(Feature::MentalHealthDays)),
            self.validate_sleep(row.get(Feature::SleepHours)),
        ];
        let fields_checked = checks.len();

        let errors: Vec<_> = checks.into_iter().filter_map(Result::err).collect();
        if errors.is_empty() {
            ValidationResult::valid(fields_checked)
        } else {
            debug!("Row failed validation with {} errors", errors.len());
            ValidationResult::invalid(errors, fields_checked)
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::FEATURE_DIMENSION;
    use proptest::prelude::*;

    fn row_with(bmi: f64, physical: f64, mental: f64, sleep: f64) -> FeatureRow {
        let mut values = [0.0; FEATURE_DIMENSION];
        values[Feature::Bmi.index()] = bmi;
        values[Feature::PhysicalHealthDays.index()] = physical;
        values[Feature::MentalHealthDays.index()] = mental;
        values[Feature::SleepHours.index()] = sleep;
        FeatureRow::try_from(&values[..]).unwrap()
    }

    #[test]
    fn test_valid_bmi() {
        let validator = Validator::default();
        assert!(validator.validate_bmi(25.0).is_ok());
        assert!(validator.validate_bmi(10.0).is_ok());
        assert!(validator.validate_bmi(60.0).is_ok());
    }

    #[test]
    fn test_invalid_bmi() {
        let validator = Validator::default();
        assert!(validator.validate_bmi(9.9).is_err());
        assert!(validator.validate_bmi(75.0).is_err());
    }

    #[test]
    fn test_day_and_sleep_ranges() {
        let validator = Validator::default();
        assert!(validator.validate_days("physical_health_days", 0.0).is_ok());
        assert!(validator.validate_days("physical_health_days", 30.0).is_ok());
        assert!(validator.validate_days("physical_health_days", 31.0).is_err());
        assert!(validator.validate_days("mental_health_days", -1.0).is_err());
        assert!(validator.validate_sleep(24.0).is_ok());
        assert!(validator.validate_sleep(25.0).is_err());
    }

    #[test]
    fn test_validate_row_collects_all_errors() {
        let validator = Validator::default();
        let result = validator.validate(&row_with(70.0, 40.0, 5.0, 30.0));
        assert!(!result.valid);
        assert_eq!(result.fields_checked, 4);
        assert_eq!(result.errors.len(), 3);
        assert_eq!(
            result.errors[0],
            ValidationError::OutOfRange {
                field: "bmi",
                value: 70.0,
                min: 10.0,
                max: 60.0
            }
        );
    }

    #[test]
    fn test_validate_row_ok() {
        let validator = Validator::default();
        let result = validator.validate(&row_with(25.0, 0.0, 5.0, 7.0));
        assert!(result.valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_config_check() {
        assert!(ValidationConfig::default().check().is_ok());
        let config = ValidationConfig {
            sleep_range: (12.0, 4.0),
            ..Default::default()
        };
        assert!(matches!(
            config.check(),
            Err(ValidationError::InvalidRange { field: "sleep", .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_in_range_rows_are_valid(
            bmi in 10.0f64..=60.0,
            physical in 0u8..=30,
            mental in 0u8..=30,
            sleep in 0u8..=24,
        ) {
            let validator = Validator::default();
            let row = row_with(bmi, physical as f64, mental as f64, sleep as f64);
            prop_assert!(validator.validate(&row).valid);
        }
    }
}
