//! Feature Vector Layout

use serde::{Deserialize, Serialize};

/// Number of features in the vector
pub const FEATURE_DIMENSION: usize = 17;

/// How a feature is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureKind {
    /// Real-valued measurement or count
    Continuous,
    /// 0 = no, 1 = yes
    Binary,
    /// Index into an encoding table
    Categorical,
}

/// Clinical attribute, in vector index order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    Bmi,
    Smoking,
    AlcoholDrinking,
    Stroke,
    PhysicalHealthDays,
    MentalHealthDays,
    DiffWalking,
    Sex,
    AgeCategory,
    Race,
    Diabetic,
    PhysicalActivity,
    GenHealth,
    SleepHours,
    Asthma,
    KidneyDisease,
    SkinCancer,
}

impl Feature {
    /// All features in vector order
    pub const ALL: [Feature; FEATURE_DIMENSION] = [
        Feature::Bmi,
        Feature::Smoking,
        Feature::AlcoholDrinking,
        Feature::Stroke,
        Feature::PhysicalHealthDays,
        Feature::MentalHealthDays,
        Feature::DiffWalking,
        Feature::Sex,
        Feature::AgeCategory,
        Feature::Race,
        Feature::Diabetic,
        Feature::PhysicalActivity,
        Feature::GenHealth,
        Feature::SleepHours,
        Feature::Asthma,
        Feature::KidneyDisease,
        Feature::SkinCancer,
    ];

    /// Position of the feature in a vector
    pub fn index(self) -> usize {
        self as usize
    }

    /// Feature at a vector position
    pub fn from_index(index: usize) -> Option<Feature> {
        Self::ALL.get(index).copied()
    }

    /// Column name used by the training data
    pub fn name(self) -> &'static str {
        match self {
            Feature::Bmi => "BMI",
            Feature::Smoking => "Smoking",
            Feature::AlcoholDrinking => "AlcoholDrinking",
            Feature::Stroke => "Stroke",
            Feature::PhysicalHealthDays => "PhysicalHealth",
            Feature::MentalHealthDays => "MentalHealth",
            Feature::DiffWalking => "DiffWalking",
            Feature::Sex => "Sex",
            Feature::AgeCategory => "AgeCategory",
            Feature::Race => "Race",
            Feature::Diabetic => "Diabetic",
            Feature::PhysicalActivity => "PhysicalActivity",
            Feature::GenHealth => "GenHealth",
            Feature::SleepHours => "SleepTime",
            Feature::Asthma => "Asthma",
            Feature::KidneyDisease => "KidneyDisease",
            Feature::SkinCancer => "SkinCancer",
        }
    }

    /// Encoding kind
    pub fn kind(self) -> FeatureKind {
        match self {
            Feature::Bmi
            | Feature::PhysicalHealthDays
            | Feature::MentalHealthDays
            | Feature::SleepHours => FeatureKind::Continuous,
            Feature::Sex
            | Feature::AgeCategory
            | Feature::Race
            | Feature::Diabetic
            | Feature::GenHealth => FeatureKind::Categorical,
            _ => FeatureKind::Binary,
        }
    }

    /// Number of valid indices for binary and categorical features
    pub fn cardinality(self) -> Option<usize> {
        match self {
            Feature::Sex => Some(2),
            Feature::AgeCategory => Some(13),
            Feature::Race => Some(6),
            Feature::Diabetic => Some(4),
            Feature::GenHealth => Some(5),
            f if f.kind() == FeatureKind::Binary => Some(2),
            _ => None,
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Untrusted numeric feature vector as supplied by a caller.
///
/// Nothing about length or encoding is guaranteed until it has been
/// converted into a [`FeatureRow`](crate::FeatureRow).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector {
    /// Raw feature values in [`Feature`] order
    pub values: Vec<f64>,
}

impl FeatureVector {
    /// Wrap raw values
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no values are present
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

impl From<[f64; FEATURE_DIMENSION]> for FeatureVector {
    fn from(values: [f64; FEATURE_DIMENSION]) -> Self {
        Self::new(values.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_order_matches_layout() {
        for (i, feature) in Feature::ALL.iter().enumerate() {
            assert_eq!(feature.index(), i);
            assert_eq!(Feature::from_index(i), Some(*feature));
        }
        assert_eq!(Feature::from_index(FEATURE_DIMENSION), None);
        assert_eq!(Feature::SleepHours.index(), 13);
        assert_eq!(Feature::AgeCategory.index(), 8);
    }

    #[test]
    fn test_cardinalities() {
        assert_eq!(Feature::Sex.cardinality(), Some(2));
        assert_eq!(Feature::AgeCategory.cardinality(), Some(13));
        assert_eq!(Feature::Race.cardinality(), Some(6));
        assert_eq!(Feature::Diabetic.cardinality(), Some(4));
        assert_eq!(Feature::GenHealth.cardinality(), Some(5));
        assert_eq!(Feature::Smoking.cardinality(), Some(2));
        assert_eq!(Feature::Bmi.cardinality(), None);
        assert_eq!(Feature::SleepHours.cardinality(), None);
    }

    #[test]
    fn test_vector_serializes_as_plain_array() {
        let vector = FeatureVector::new(vec![1.0, 2.5]);
        let json = serde_json::to_string(&vector).unwrap();
        assert_eq!(json, "[1.0,2.5]");
    }
}
