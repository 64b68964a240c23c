//! Advisory Builder

use feature_engine::{EncodingTables, Feature, FeatureRow};
use inference_engine::ClassLabel;
use rulenet::{Source, Verdict};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Advisory configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryConfig {
    /// Disease probability below this is a low risk band (default: 0.30)
    pub moderate_from: f64,
    /// Disease probability at or above this is a high risk band (default: 0.70)
    pub high_from: f64,
    /// BMI above this counts as obesity (default: 30)
    pub obesity_bmi: f64,
    /// BMI below this suggests weight gain (default: 18.5)
    pub underweight_bmi: f64,
    /// Physical health days above this are a risk factor (default: 15)
    pub poor_physical_days: f64,
    /// Physical health days above this warrant monitoring (default: 10)
    pub monitoring_physical_days: f64,
    /// Mental health days above this warrant support (default: 10)
    pub mental_support_days: f64,
    /// Age buckets at or above this index count as advanced age (default: 9, "65-69")
    pub advanced_age_index: usize,
    /// Healthy sleep window for risk factors (default: 6-9 hours)
    pub sleep_factor_range: (f64, f64),
    /// Recommended nightly sleep window (default: 7-9 hours)
    pub sleep_advice_range: (f64, f64),
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            moderate_from: 0.30,
            high_from: 0.70,
            obesity_bmi: 30.0,
            underweight_bmi: 18.5,
            poor_physical_days: 15.0,
            monitoring_physical_days: 10.0,
            mental_support_days: 10.0,
            advanced_age_index: 9,
            sleep_factor_range: (6.0, 9.0),
            sleep_advice_range: (7.0, 9.0),
        }
    }
}

/// Rejected advisory configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdvisoryError {
    #[error("Risk band cuts must satisfy 0 <= moderate ({moderate}) <= high ({high}) <= 1")]
    BandOrder { moderate: f64, high: f64 },
    #[error("Invalid {field} window: [{min}, {max}]")]
    Window {
        field: &'static str,
        min: f64,
        max: f64,
    },
}

impl AdvisoryConfig {
    /// Verify band cuts and sleep windows are ordered
    pub fn check(&self) -> Result<(), AdvisoryError> {
        let (moderate, high) = (self.moderate_from, self.high_from);
        if !(0.0..=1.0).contains(&moderate) || !(0.0..=1.0).contains(&high) || moderate > high {
            return Err(AdvisoryError::BandOrder { moderate, high });
        }
        for (field, (min, max)) in [
            ("sleep_factor_range", self.sleep_factor_range),
            ("sleep_advice_range", self.sleep_advice_range),
        ] {
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(AdvisoryError::Window { field, min, max });
            }
        }
        Ok(())
    }
}

/// Coarse risk level shown to the patient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    Low,
    Moderate,
    High,
}

/// Contributing factor present in the patient row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "factor", rename_all = "snake_case")]
pub enum RiskFactor {
    Obesity { bmi: f64 },
    Smoking,
    PoorPhysicalHealth { days: f64 },
    PriorStroke,
    AdvancedAge { age_category: String },
    Sedentary,
    AbnormalSleep { hours: f64 },
}

impl RiskFactor {
    /// Short title
    pub fn title(&self) -> &'static str {
        match self {
            RiskFactor::Obesity { .. } => "High BMI (obesity)",
            RiskFactor::Smoking => "Smoking habit",
            RiskFactor::PoorPhysicalHealth { .. } => "Poor physical health",
            RiskFactor::PriorStroke => "Previous stroke",
            RiskFactor::AdvancedAge { .. } => "Advanced age",
            RiskFactor::Sedentary => "Sedentary lifestyle",
            RiskFactor::AbnormalSleep { .. } => "Abnormal sleep",
        }
    }
}

/// Lifestyle recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    WeightManagement,
    WeightGain,
    SmokingCessation,
    ExerciseRoutine,
    SleepImprovement,
    SleepAssessment,
    RegularMonitoring,
    MentalHealthSupport,
    DiabetesManagement,
}

impl Recommendation {
    /// One-line advice
    pub fn advice(&self) -> &'static str {
        match self {
            Recommendation::WeightManagement => {
                "Balanced diet with a caloric deficit; aim for a BMI below 25"
            }
            Recommendation::WeightGain => {
                "Increase intake of nutrient-dense foods with a dietitian"
            }
            Recommendation::SmokingCessation => "Join a smoking cessation programme",
            Recommendation::ExerciseRoutine => {
                "Build up to 150 minutes of moderate activity a week"
            }
            Recommendation::SleepImprovement => "Keep a consistent schedule and aim for 7-9 hours",
            Recommendation::SleepAssessment => {
                "Long sleep can signal a disorder; consider a sleep study"
            }
            Recommendation::RegularMonitoring => {
                "Check blood pressure, cholesterol and blood sugar every 3-6 months"
            }
            Recommendation::MentalHealthSupport => "Consider counselling or therapy for stress",
            Recommendation::DiabetesManagement => {
                "Keep tight blood sugar control and monitor HbA1c"
            }
        }
    }
}

/// Explanation attached to a verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub band: RiskBand,
    /// Disease probability in percent
    pub risk_percent: f64,
    pub high_risk: bool,
    /// Whether a heuristic rule decided the verdict
    pub rule_based: bool,
    pub factors: Vec<RiskFactor>,
    pub recommendations: Vec<Recommendation>,
}

/// Builds advisories from verdicts
#[derive(Debug, Clone, Default)]
pub struct Advisor {
    config: AdvisoryConfig,
    tables: EncodingTables,
}

impl Advisor {
    /// Create an advisor with the given configuration
    pub fn new(config: AdvisoryConfig) -> Result<Self, AdvisoryError> {
        config.check()?;
        info!("Creating advisor with config: {:?}", config);
        Ok(Self {
            config,
            tables: EncodingTables::default(),
        })
    }

    /// Name categories with the tables the model was trained with
    pub fn with_tables(mut self, tables: EncodingTables) -> Self {
        self.tables = tables;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &AdvisoryConfig {
        &self.config
    }

    /// Band for a disease probability
    pub fn band(&self, risk: f64) -> RiskBand {
        if risk < self.config.moderate_from {
            RiskBand::Low
        } else if risk < self.config.high_from {
            RiskBand::Moderate
        } else {
            RiskBand::High
        }
    }

    /// Risk factors present in a row, in display order
    pub fn factors(&self, row: &FeatureRow) -> Vec<RiskFactor> {
        let cfg = &self.config;
        let bmi = row.get(Feature::Bmi);
        let physical = row.get(Feature::PhysicalHealthDays);
        let sleep = row.get(Feature::SleepHours);
        let age = row.category(Feature::AgeCategory);

        let mut factors = Vec::new();
        if bmi > cfg.obesity_bmi {
            factors.push(RiskFactor::Obesity { bmi });
        }
        if row.flag(Feature::Smoking) {
            factors.push(RiskFactor::Smoking);
        }
        if physical > cfg.poor_physical_days {
            factors.push(RiskFactor::PoorPhysicalHealth { days: physical });
        }
        if row.flag(Feature::Stroke) {
            factors.push(RiskFactor::PriorStroke);
        }
        if age >= cfg.advanced_age_index {
            let age_category = match self.tables.age_category.label(age) {
                Some(label) => label.to_string(),
                None => age.to_string(),
            };
            factors.push(RiskFactor::AdvancedAge { age_category });
        }
        if !row.flag(Feature::PhysicalActivity) {
            factors.push(RiskFactor::Sedentary);
        }
        let (short, long) = cfg.sleep_factor_range;
        if sleep < short || sleep > long {
            factors.push(RiskFactor::AbnormalSleep { hours: sleep });
        }
        factors
    }

    /// Recommendations for a row, in display order
    pub fn recommendations(&self, row: &FeatureRow) -> Vec<Recommendation> {
        let cfg = &self.config;
        let bmi = row.get(Feature::Bmi);
        let sleep = row.get(Feature::SleepHours);

        let mut recs = Vec::new();
        if bmi > cfg.obesity_bmi {
            recs.push(Recommendation::WeightManagement);
        } else if bmi < cfg.underweight_bmi {
            recs.push(Recommendation::WeightGain);
        }
        if row.flag(Feature::Smoking) {
            recs.push(Recommendation::SmokingCessation);
        }
        if !row.flag(Feature::PhysicalActivity) {
            recs.push(Recommendation::ExerciseRoutine);
        }
        let (short, long) = cfg.sleep_advice_range;
        if sleep < short {
            recs.push(Recommendation::SleepImprovement);
        } else if sleep > long {
            recs.push(Recommendation::SleepAssessment);
        }
        if row.get(Feature::PhysicalHealthDays) > cfg.monitoring_physical_days {
            recs.push(Recommendation::RegularMonitoring);
        }
        if row.get(Feature::MentalHealthDays) > cfg.mental_support_days {
            recs.push(Recommendation::MentalHealthSupport);
        }
        // Index 0 is "No"
        if row.category(Feature::Diabetic) != 0 {
            recs.push(Recommendation::DiabetesManagement);
        }
        recs
    }

    /// Full advisory for a verdict on a row
    pub fn advise(&self, row: &FeatureRow, verdict: &Verdict) -> Advisory {
        let risk = verdict.risk();
        let advisory = Advisory {
            band: self.band(risk),
            risk_percent: risk * 100.0,
            high_risk: verdict.label == ClassLabel::Disease,
            rule_based: verdict.source == Source::Rule,
            factors: self.factors(row),
            recommendations: self.recommendations(row),
        };
        debug!(
            "Advisory: {:?} band, {} factors, {} recommendations",
            advisory.band,
            advisory.factors.len(),
            advisory.recommendations.len()
        );
        advisory
    }
}
