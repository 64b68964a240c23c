//! Human-Readable Patient Profile

use serde::{Deserialize, Serialize};

/// Patient attributes as entered on the assessment form.
///
/// Categorical fields carry the labels of [`EncodingTables`](crate::EncodingTables);
/// use [`EncodingTables::encode`](crate::EncodingTables::encode) to obtain a vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientProfile {
    /// Body mass index (10-60)
    pub bmi: f64,
    /// Current smoker
    pub smoking: bool,
    /// Heavy alcohol consumption
    pub alcohol_drinking: bool,
    /// Ever had a stroke
    pub stroke: bool,
    /// Days of poor physical health in the last month (0-30)
    pub physical_health_days: f64,
    /// Days of poor mental health in the last month (0-30)
    pub mental_health_days: f64,
    /// Serious difficulty walking or climbing stairs
    pub diff_walking: bool,
    pub sex: String,
    pub age_category: String,
    pub race: String,
    pub diabetic: String,
    /// Exercise in the past month outside of work
    pub physical_activity: bool,
    pub gen_health: String,
    /// Average hours of sleep (0-24)
    pub sleep_hours: f64,
    pub asthma: bool,
    pub kidney_disease: bool,
    pub skin_cancer: bool,
}

impl Default for PatientProfile {
    fn default() -> Self {
        Self {
            bmi: 25.0,
            smoking: false,
            alcohol_drinking: false,
            stroke: false,
            physical_health_days: 0.0,
            mental_health_days: 0.0,
            diff_walking: false,
            sex: "Male".to_string(),
            age_category: "18-24".to_string(),
            race: "White".to_string(),
            diabetic: "No".to_string(),
            physical_activity: true,
            gen_health: "Excellent".to_string(),
            sleep_hours: 7.0,
            asthma: false,
            kidney_disease: false,
            skin_cancer: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_form_defaults() {
        let profile: PatientProfile =
            serde_json::from_str(r#"{"bmi": 38.2, "smoking": true, "age_category": "75-79"}"#)
                .unwrap();
        assert_eq!(profile.bmi, 38.2);
        assert!(profile.smoking);
        assert_eq!(profile.age_category, "75-79");
        assert_eq!(profile.sleep_hours, 7.0);
        assert_eq!(profile.gen_health, "Excellent");
        assert!(profile.physical_activity);
    }
}
