//! Categorical Encoding Tables
//!
//! Maps the human-readable values of each categorical attribute to the
//! integer indices carried in a feature vector.

use crate::error::EncodeError;
use crate::features::{Feature, FeatureKind, FeatureVector, FEATURE_DIMENSION};
use crate::patient::PatientProfile;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Ordered label list for one categorical feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalTable {
    /// Feature the table encodes
    pub feature: Feature,
    /// Labels in index order
    pub labels: Vec<String>,
}

impl CategoricalTable {
    /// Create a table from labels in index order
    pub fn new(feature: Feature, labels: &[&str]) -> Self {
        Self {
            feature,
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    /// Index of a label (exact match)
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Label at an index
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Number of labels
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Check if the table has no labels
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Encode a label, failing on unknown values
    pub fn encode(&self, label: &str) -> Result<f64, EncodeError> {
        self.index_of(label)
            .map(|i| i as f64)
            .ok_or_else(|| EncodeError::UnknownCategory {
                feature: self.feature,
                label: label.to_string(),
            })
    }
}

/// Age buckets, youngest first
pub const AGE_CATEGORIES: [&str; 13] = [
    "18-24",
    "25-29",
    "30-34",
    "35-39",
    "40-44",
    "45-49",
    "50-54",
    "55-59",
    "60-64",
    "65-69",
    "70-74",
    "75-79",
    "80 or older",
];

/// Encoding tables for every categorical feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingTables {
    pub sex: CategoricalTable,
    pub age_category: CategoricalTable,
    pub race: CategoricalTable,
    pub diabetic: CategoricalTable,
    pub gen_health: CategoricalTable,
}

impl Default for EncodingTables {
    fn default() -> Self {
        Self {
            sex: CategoricalTable::new(Feature::Sex, &["Female", "Male"]),
            age_category: CategoricalTable::new(Feature::AgeCategory, &AGE_CATEGORIES),
            race: CategoricalTable::new(
                Feature::Race,
                &[
                    "White",
                    "Black",
                    "Asian",
                    "American Indian/Alaskan Native",
                    "Hispanic",
                    "Other",
                ],
            ),
            diabetic: CategoricalTable::new(
                Feature::Diabetic,
                &[
                    "No",
                    "Yes",
                    "No, borderline diabetes",
                    "Yes (during pregnancy)",
                ],
            ),
            gen_health: CategoricalTable::new(
                Feature::GenHealth,
                &["Excellent", "Very good", "Good", "Fair", "Poor"],
            ),
        }
    }
}

impl EncodingTables {
    /// Table for a categorical feature
    pub fn table(&self, feature: Feature) -> Option<&CategoricalTable> {
        match feature {
            Feature::Sex => Some(&self.sex),
            Feature::AgeCategory => Some(&self.age_category),
            Feature::Race => Some(&self.race),
            Feature::Diabetic => Some(&self.diabetic),
            Feature::GenHealth => Some(&self.gen_health),
            _ => None,
        }
    }

    /// Verify every table is attached to the right feature and matches its cardinality
    pub fn check(&self) -> Result<(), EncodeError> {
        for feature in Feature::ALL {
            if feature.kind() != FeatureKind::Categorical {
                continue;
            }
            let table = self.table(feature).ok_or(EncodeError::MissingTable(feature))?;
            let expected = feature.cardinality().unwrap_or(0);
            if table.feature != feature || table.len() != expected {
                return Err(EncodeError::TableSize {
                    feature,
                    expected,
                    actual: table.len(),
                });
            }
        }
        Ok(())
    }

    /// Encode a human-readable profile into a feature vector
    pub fn encode(&self, profile: &PatientProfile) -> Result<FeatureVector, EncodeError> {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        let mut values = vec![0.0; FEATURE_DIMENSION];

        values[Feature::Bmi.index()] = profile.bmi;
        values[Feature::Smoking.index()] = flag(profile.smoking);
        values[Feature::AlcoholDrinking.index()] = flag(profile.alcohol_drinking);
        values[Feature::Stroke.index()] = flag(profile.stroke);
        values[Feature::PhysicalHealthDays.index()] = profile.physical_health_days;
        values[Feature::MentalHealthDays.index()] = profile.mental_health_days;
        values[Feature::DiffWalking.index()] = flag(profile.diff_walking);
        values[Feature::Sex.index()] = self.sex.encode(&profile.sex)?;
        values[Feature::AgeCategory.index()] = self.age_category.encode(&profile.age_category)?;
        values[Feature::Race.index()] = self.race.encode(&profile.race)?;
        values[Feature::Diabetic.index()] = self.diabetic.encode(&profile.diabetic)?;
        values[Feature::PhysicalActivity.index()] = flag(profile.physical_activity);
        values[Feature::GenHealth.index()] = self.gen_health.encode(&profile.gen_health)?;
        values[Feature::SleepHours.index()] = profile.sleep_hours;
        values[Feature::Asthma.index()] = flag(profile.asthma);
        values[Feature::KidneyDisease.index()] = flag(profile.kidney_disease);
        values[Feature::SkinCancer.index()] = flag(profile.skin_cancer);

        debug!("Encoded patient profile into {} features", values.len());
        Ok(FeatureVector::new(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FeatureRow;

    #[test]
    fn test_default_tables_match_schema() {
        let tables = EncodingTables::default();
        assert!(tables.check().is_ok());
        assert_eq!(tables.age_category.index_of("70-74"), Some(10));
        assert_eq!(tables.age_category.index_of("80 or older"), Some(12));
        assert_eq!(tables.gen_health.index_of("Good"), Some(2));
        assert_eq!(tables.diabetic.index_of("No, borderline diabetes"), Some(2));
        assert_eq!(tables.sex.index_of("Female"), Some(0));
        assert_eq!(tables.race.label(3), Some("American Indian/Alaskan Native"));
    }

    #[test]
    fn test_check_rejects_short_table() {
        let mut tables = EncodingTables::default();
        tables.race.labels.pop();
        assert_eq!(
            tables.check(),
            Err(EncodeError::TableSize {
                feature: Feature::Race,
                expected: 6,
                actual: 5
            })
        );
    }

    #[test]
    fn test_check_rejects_swapped_table() {
        let mut tables = EncodingTables::default();
        tables.sex.feature = Feature::Race;
        assert!(tables.check().is_err());
    }

    #[test]
    fn test_encode_profile() {
        let tables = EncodingTables::default();
        let profile = PatientProfile {
            bmi: 31.5,
            smoking: true,
            age_category: "70-74".to_string(),
            gen_health: "Fair".to_string(),
            sleep_hours: 6.0,
            ..Default::default()
        };

        let vector = tables.encode(&profile).unwrap();
        assert_eq!(vector.len(), FEATURE_DIMENSION);

        let row = FeatureRow::try_from(&vector).unwrap();
        assert_eq!(row.get(Feature::Bmi), 31.5);
        assert!(row.flag(Feature::Smoking));
        assert_eq!(row.category(Feature::AgeCategory), 10);
        assert_eq!(row.category(Feature::GenHealth), 3);
        assert_eq!(row.get(Feature::SleepHours), 6.0);
        assert!(row.flag(Feature::PhysicalActivity));
    }

    #[test]
    fn test_encode_unknown_label() {
        let tables = EncodingTables::default();
        let profile = PatientProfile {
            race: "Martian".to_string(),
            ..Default::default()
        };

        assert_eq!(
            tables.encode(&profile),
            Err(EncodeError::UnknownCategory {
                feature: Feature::Race,
                label: "Martian".to_string()
            })
        );
    }
}
