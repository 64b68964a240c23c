//! Heart Disease Risk Assessment
//!
//! Wires configuration, model loading and logging around the JSON-lines
//! assessment pipeline.

mod config;
mod pipeline;

pub use config::{AppConfig, LogConfig, ModelSource, CONFIG_PATH_VAR, ENV_PREFIX};
pub use pipeline::{LineError, Pipeline, RunSummary};

use advisory::Advisor;
use anyhow::{anyhow, bail, Context, Result};
use data_validator::Validator;
use feature_engine::EncodingTables;
use inference_engine::{OnnxClassifier, StatisticalClassifier};
use rulenet::RuleNet;
use std::path::Path;
use std::sync::Arc;
use storage::{FileModelStore, ModelBundle, ModelHandle, ModelStore};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Initialize logging on stderr; stdout carries the records
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let level: Level = config
        .level
        .parse()
        .map_err(|_| anyhow!("Unknown log level '{}'", config.level))?;

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    let installed = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    installed.context("Failed to set tracing subscriber")
}

/// Load the newest bundle, or the one named by `id`
pub fn load_bundle(dir: &Path, id: Option<&str>) -> Result<ModelBundle> {
    let store = FileModelStore::open(dir)
        .with_context(|| format!("Failed to open model store {}", dir.display()))?;

    if let Some(id) = id {
        let handle: ModelHandle = id
            .parse()
            .with_context(|| format!("Invalid model id '{}'", id))?;
        return store
            .load(&handle)
            .with_context(|| format!("Failed to load model {}", handle));
    }

    let mut newest: Option<ModelBundle> = None;
    for handle in store.list()? {
        let bundle = store
            .load(&handle)
            .with_context(|| format!("Failed to load model {}", handle))?;
        if newest.as_ref().map_or(true, |n| bundle.created_at > n.created_at) {
            newest = Some(bundle);
        }
    }
    newest.ok_or_else(|| anyhow!("No models in {}", dir.display()))
}

/// Build the classifier and the encoding tables it expects
pub fn load_classifier(
    source: &ModelSource,
) -> Result<(Arc<dyn StatisticalClassifier>, EncodingTables)> {
    match source {
        ModelSource::Store { dir, id } => {
            let bundle = load_bundle(dir, id.as_deref())?;
            info!(
                "Using model '{}' ({} trees, created {})",
                bundle.name,
                bundle.classifier.len(),
                bundle.created_at
            );
            let classifier: Arc<dyn StatisticalClassifier> = Arc::new(bundle.classifier);
            Ok((classifier, bundle.encoders))
        }
        ModelSource::Onnx { path } => {
            let classifier = OnnxClassifier::load(path)
                .with_context(|| format!("Failed to load ONNX model {}", path.display()))?;
            let classifier: Arc<dyn StatisticalClassifier> = Arc::new(classifier);
            Ok((classifier, EncodingTables::default()))
        }
    }
}

/// Assemble the pipeline described by `config`
pub fn build_pipeline(config: &AppConfig) -> Result<Pipeline> {
    if config.batch_size == 0 {
        bail!("batch_size must be at least 1");
    }
    config
        .validation
        .check()
        .context("Invalid validation config")?;

    let (classifier, tables) = load_classifier(&config.model)?;
    let engine = RuleNet::with_policy(classifier, config.rules.clone())
        .context("Invalid rule policy")?;
    let advisor = Advisor::new(config.advisory.clone())
        .context("Invalid advisory config")?
        .with_tables(tables.clone());

    Ok(Pipeline::new(
        engine,
        tables,
        Validator::new(config.validation.clone()),
        advisor,
        config.batch_size,
    ))
}
