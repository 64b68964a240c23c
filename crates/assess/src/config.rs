//! Application Configuration
//!
//! Built from an optional file named by `HEART_RISK_CONFIG`, then overridden
//! by `HEART_RISK__*` environment variables (e.g. `HEART_RISK__BATCH_SIZE=64`,
//! `HEART_RISK__MODEL__KIND=onnx`).

use advisory::AdvisoryConfig;
use config::{Config, ConfigError, Environment, File};
use data_validator::ValidationConfig;
use rulenet::RulePolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the config file
pub const CONFIG_PATH_VAR: &str = "HEART_RISK_CONFIG";

/// Prefix of override variables
pub const ENV_PREFIX: &str = "HEART_RISK";

/// Where the statistical classifier comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSource {
    /// Bundle in a file model store; the newest bundle when `id` is unset
    Store { dir: PathBuf, id: Option<String> },
    /// ONNX graph exported from the training pipeline
    Onnx { path: PathBuf },
}

impl Default for ModelSource {
    fn default() -> Self {
        ModelSource::Store {
            dir: PathBuf::from("models"),
            id: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Max level: trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON records instead of text
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub model: ModelSource,
    pub rules: RulePolicy,
    pub validation: ValidationConfig,
    pub advisory: AdvisoryConfig,
    pub log: LogConfig,
    /// Valid rows per `classify_batch` call
    pub batch_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: ModelSource::default(),
            rules: RulePolicy::default(),
            validation: ValidationConfig::default(),
            advisory: AdvisoryConfig::default(),
            log: LogConfig::default(),
            batch_size: 256,
        }
    }
}

impl AppConfig {
    /// Load from `HEART_RISK_CONFIG` (if set) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from);
        Self::from_sources(path.as_deref(), Environment::with_prefix(ENV_PREFIX).separator("__"))
    }

    /// Load from a file only
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()?;
        settings.try_deserialize()
    }

    fn from_sources(path: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let settings = builder.add_source(env.try_parsing(true)).build()?;
        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn write_config(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "heart-risk-{}-{}.toml",
            name,
            std::process::id()
        ));
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.batch_size, 256);
        assert_eq!(config.rules, RulePolicy::default());
        assert!(matches!(config.model, ModelSource::Store { id: None, .. }));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let path = write_config(
            "partial",
            r#"
batch_size = 32

[model]
kind = "onnx"
path = "heart.onnx"

[rules]
obesity_bmi = 40.0
"#,
        );
        let config = AppConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.batch_size, 32);
        assert_eq!(
            config.model,
            ModelSource::Onnx {
                path: PathBuf::from("heart.onnx")
            }
        );
        assert_eq!(config.rules.obesity_bmi, 40.0);
        assert_eq!(config.rules.poor_physical_health_days, 15.0);
        assert_eq!(config.log, LogConfig::default());
    }

    #[test]
    fn test_environment_overrides_file() {
        let path = write_config("env", "batch_size = 32\n");
        let env = Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .source(Some(HashMap::from([
                ("HEART_RISK__BATCH_SIZE".to_string(), "8".to_string()),
                ("HEART_RISK__LOG__JSON".to_string(), "true".to_string()),
            ])));
        let config = AppConfig::from_sources(Some(&path), env).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.batch_size, 8);
        assert!(config.log.json);
    }
}
