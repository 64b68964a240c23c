//! Medical Heuristic Rules
//!
//! Each rule is a pure function of a feature row and the policy. The cascade
//! evaluates them in fixed priority order and stops at the first rule that
//! does not defer.

use crate::policy::RulePolicy;
use feature_engine::{Feature, FeatureRow};
use inference_engine::ClassLabel;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Outcome of a single rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleOutcome {
    ForceDisease,
    ForceNoDisease,
    /// Rule does not apply
    Defer,
}

impl RuleOutcome {
    /// Forced label, `None` on defer
    pub fn label(&self) -> Option<ClassLabel> {
        match self {
            RuleOutcome::ForceDisease => Some(ClassLabel::Disease),
            RuleOutcome::ForceNoDisease => Some(ClassLabel::NoDisease),
            RuleOutcome::Defer => None,
        }
    }
}

/// Rule identifiers, in cascade order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleId {
    /// Rule A: BMI and poor physical health
    SevereCombinedRisk,
    /// Rule B: smoker in an older age bucket
    SmokingWithAge,
    /// Rule C: restful sleep and no poor mental health days
    ProtectiveProfile,
}

impl RuleId {
    /// Priority order of the cascade
    pub const CASCADE: [RuleId; 3] = [
        RuleId::SevereCombinedRisk,
        RuleId::SmokingWithAge,
        RuleId::ProtectiveProfile,
    ];

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::SevereCombinedRisk => "severe_combined_risk",
            RuleId::SmokingWithAge => "smoking_with_age",
            RuleId::ProtectiveProfile => "protective_profile",
        }
    }

    /// Evaluate this rule
    pub fn evaluate(&self, row: &FeatureRow, policy: &RulePolicy) -> RuleOutcome {
        match self {
            RuleId::SevereCombinedRisk => severe_combined_risk(row, policy),
            RuleId::SmokingWithAge => smoking_with_age(row, policy),
            RuleId::ProtectiveProfile => protective_profile(row, policy),
        }
    }
}

/// BMI above the obesity cut with many poor physical health days
pub fn severe_combined_risk(row: &FeatureRow, policy: &RulePolicy) -> RuleOutcome {
    if row.get(Feature::Bmi) > policy.obesity_bmi
        && row.get(Feature::PhysicalHealthDays) > policy.poor_physical_health_days
    {
        RuleOutcome::ForceDisease
    } else {
        RuleOutcome::Defer
    }
}

/// Current smoker aged 70 or older
pub fn smoking_with_age(row: &FeatureRow, policy: &RulePolicy) -> RuleOutcome {
    if row.flag(Feature::Smoking) && row.category(Feature::AgeCategory) >= policy.senior_age_index {
        RuleOutcome::ForceDisease
    } else {
        RuleOutcome::Defer
    }
}

/// Enough sleep and no poor mental health days
pub fn protective_profile(row: &FeatureRow, policy: &RulePolicy) -> RuleOutcome {
    if row.get(Feature::SleepHours) >= policy.restful_sleep_hours
        && row.get(Feature::MentalHealthDays) == policy.calm_mental_health_days
    {
        RuleOutcome::ForceNoDisease
    } else {
        RuleOutcome::Defer
    }
}

/// A rule that fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch {
    pub rule: RuleId,
    pub label: ClassLabel,
}

/// Ordered rule list with its policy
#[derive(Debug, Clone, Default)]
pub struct RuleCascade {
    policy: RulePolicy,
}

impl RuleCascade {
    /// Create a cascade with the given policy
    pub fn new(policy: RulePolicy) -> Self {
        Self { policy }
    }

    /// Active policy
    pub fn policy(&self) -> &RulePolicy {
        &self.policy
    }

    /// First rule that does not defer, if any
    pub fn evaluate(&self, row: &FeatureRow) -> Option<RuleMatch> {
        RuleId::CASCADE.iter().find_map(|rule| {
            let outcome = rule.evaluate(row, &self.policy);
            outcome.label().map(|label| {
                debug!("Rule {} fired: {:?}", rule.as_str(), outcome);
                RuleMatch { rule: *rule, label }
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::FEATURE_DIMENSION;

    /// No rule fires on this row
    fn neutral() -> [f64; FEATURE_DIMENSION] {
        let mut values = [0.0; FEATURE_DIMENSION];
        values[Feature::Bmi.index()] = 25.0;
        values[Feature::MentalHealthDays.index()] = 5.0;
        values[Feature::AgeCategory.index()] = 3.0;
        values[Feature::GenHealth.index()] = 2.0;
        values[Feature::SleepHours.index()] = 7.0;
        values
    }

    fn row(values: [f64; FEATURE_DIMENSION]) -> FeatureRow {
        FeatureRow::try_from(&values[..]).unwrap()
    }

    fn with(mut values: [f64; FEATURE_DIMENSION], pairs: &[(Feature, f64)]) -> FeatureRow {
        for (feature, value) in pairs {
            values[feature.index()] = *value;
        }
        row(values)
    }

    #[test]
    fn test_rule_a_thresholds_are_strict() {
        let policy = RulePolicy::default();
        let fire = with(
            neutral(),
            &[(Feature::Bmi, 35.1), (Feature::PhysicalHealthDays, 16.0)],
        );
        assert_eq!(severe_combined_risk(&fire, &policy), RuleOutcome::ForceDisease);

        let bmi_edge = with(
            neutral(),
            &[(Feature::Bmi, 35.0), (Feature::PhysicalHealthDays, 20.0)],
        );
        assert_eq!(severe_combined_risk(&bmi_edge, &policy), RuleOutcome::Defer);

        let days_edge = with(
            neutral(),
            &[(Feature::Bmi, 40.0), (Feature::PhysicalHealthDays, 15.0)],
        );
        assert_eq!(severe_combined_risk(&days_edge, &policy), RuleOutcome::Defer);
    }

    #[test]
    fn test_rule_b_age_boundary() {
        let policy = RulePolicy::default();
        let at_70 = with(neutral(), &[(Feature::Smoking, 1.0), (Feature::AgeCategory, 10.0)]);
        assert_eq!(smoking_with_age(&at_70, &policy), RuleOutcome::ForceDisease);

        let at_65 = with(neutral(), &[(Feature::Smoking, 1.0), (Feature::AgeCategory, 9.0)]);
        assert_eq!(smoking_with_age(&at_65, &policy), RuleOutcome::Defer);

        let non_smoker = with(neutral(), &[(Feature::AgeCategory, 12.0)]);
        assert_eq!(smoking_with_age(&non_smoker, &policy), RuleOutcome::Defer);
    }

    #[test]
    fn test_rule_c_needs_zero_mental_days() {
        let policy = RulePolicy::default();
        let fire = with(
            neutral(),
            &[(Feature::SleepHours, 8.0), (Feature::MentalHealthDays, 0.0)],
        );
        assert_eq!(protective_profile(&fire, &policy), RuleOutcome::ForceNoDisease);

        let one_day = with(
            neutral(),
            &[(Feature::SleepHours, 9.0), (Feature::MentalHealthDays, 1.0)],
        );
        assert_eq!(protective_profile(&one_day, &policy), RuleOutcome::Defer);

        let short_sleep = with(
            neutral(),
            &[(Feature::SleepHours, 7.5), (Feature::MentalHealthDays, 0.0)],
        );
        assert_eq!(protective_profile(&short_sleep, &policy), RuleOutcome::Defer);
    }

    #[test]
    fn test_rule_c_reads_sleep_not_asthma() {
        let policy = RulePolicy::default();
        let asthma_only = with(
            neutral(),
            &[
                (Feature::Asthma, 1.0),
                (Feature::SleepHours, 6.0),
                (Feature::MentalHealthDays, 0.0),
            ],
        );
        assert_eq!(protective_profile(&asthma_only, &policy), RuleOutcome::Defer);
    }

    #[test]
    fn test_cascade_precedence_a_before_c() {
        let cascade = RuleCascade::default();
        let both = with(
            neutral(),
            &[
                (Feature::Bmi, 40.0),
                (Feature::PhysicalHealthDays, 20.0),
                (Feature::SleepHours, 9.0),
                (Feature::MentalHealthDays, 0.0),
            ],
        );
        assert_eq!(
            cascade.evaluate(&both),
            Some(RuleMatch {
                rule: RuleId::SevereCombinedRisk,
                label: ClassLabel::Disease
            })
        );
    }

    #[test]
    fn test_cascade_precedence_b_before_c() {
        let cascade = RuleCascade::default();
        let both = with(
            neutral(),
            &[
                (Feature::Smoking, 1.0),
                (Feature::AgeCategory, 11.0),
                (Feature::SleepHours, 8.0),
                (Feature::MentalHealthDays, 0.0),
            ],
        );
        assert_eq!(
            cascade.evaluate(&both).map(|m| m.rule),
            Some(RuleId::SmokingWithAge)
        );
    }

    #[test]
    fn test_cascade_defers_on_neutral_row() {
        assert_eq!(RuleCascade::default().evaluate(&row(neutral())), None);
    }

    #[test]
    fn test_custom_policy_thresholds() {
        let cascade = RuleCascade::new(RulePolicy {
            senior_age_index: 8,
            ..Default::default()
        });
        let at_60 = with(neutral(), &[(Feature::Smoking, 1.0), (Feature::AgeCategory, 8.0)]);
        assert_eq!(
            cascade.evaluate(&at_60).map(|m| m.rule),
            Some(RuleId::SmokingWithAge)
        );
    }
}
