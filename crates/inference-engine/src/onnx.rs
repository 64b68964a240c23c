//! ONNX Classifier using tract
//!
//! Expects a binary classifier export with a `[1, 17]` float input and two
//! outputs: the label tensor and a `[1, 2]` probability tensor (skl2onnx
//! export with ZipMap disabled).

use crate::classifier::{ClassLabel, ClassProbabilities, StatisticalClassifier};
use crate::InferenceError;
use feature_engine::{FeatureRow, FEATURE_DIMENSION};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tract_onnx::prelude::*;

type OnnxPlan = TypedRunnableModel<TypedModel>;

/// Classifier backed by an optimized tract plan
pub struct OnnxClassifier {
    /// Model path
    model_path: PathBuf,
    /// Runnable plan
    plan: OnnxPlan,
}

impl OnnxClassifier {
    /// Load and optimize an ONNX model
    pub fn load(model_path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let model_path = model_path.as_ref().to_path_buf();
        info!("Loading ONNX classifier from {}", model_path.display());

        let load_error = |e: TractError| InferenceError::ModelLoadError(e.to_string());
        let plan = tract_onnx::onnx()
            .model_for_path(&model_path)
            .map_err(load_error)?
            .with_input_fact(0, f32::fact([1, FEATURE_DIMENSION]).into())
            .map_err(load_error)?
            .into_optimized()
            .map_err(load_error)?
            .into_runnable()
            .map_err(load_error)?;

        info!("ONNX classifier loaded successfully");
        Ok(Self { model_path, plan })
    }

    /// Get model path
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    fn run(&self, row: &FeatureRow) -> Result<TVec<TValue>, InferenceError> {
        let values: Vec<f32> = row.as_slice().iter().map(|v| *v as f32).collect();
        let input: Tensor = tract_ndarray::Array2::from_shape_vec((1, FEATURE_DIMENSION), values)
            .map_err(|e| InferenceError::InvalidInputShape {
                expected: format!("[1, {}]", FEATURE_DIMENSION),
                actual: e.to_string(),
            })?
            .into();

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        if outputs.len() < 2 {
            return Err(InferenceError::InvalidModel(format!(
                "expected label and probability outputs, got {}",
                outputs.len()
            )));
        }
        Ok(outputs)
    }
}

impl StatisticalClassifier for OnnxClassifier {
    fn name(&self) -> &str {
        self.model_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("onnx")
    }

    fn predict(&self, row: &FeatureRow) -> Result<ClassLabel, InferenceError> {
        let outputs = self.run(row)?;
        let labels = outputs[0]
            .to_array_view::<i64>()
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let raw = labels
            .iter()
            .next()
            .copied()
            .ok_or_else(|| InferenceError::InferenceFailed("empty label output".to_string()))?;

        usize::try_from(raw)
            .ok()
            .and_then(ClassLabel::from_index)
            .ok_or_else(|| InferenceError::InferenceFailed(format!("unexpected class {}", raw)))
    }

    fn predict_probability(&self, row: &FeatureRow) -> Result<ClassProbabilities, InferenceError> {
        let outputs = self.run(row)?;
        let probabilities = outputs[1]
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let values: Vec<f32> = probabilities.iter().copied().collect();
        if values.len() != 2 {
            return Err(InferenceError::InvalidInputShape {
                expected: "[1, 2] probabilities".to_string(),
                actual: format!("{:?}", probabilities.shape()),
            });
        }

        debug!("ONNX probabilities: {:?}", values);
        Ok(ClassProbabilities::new(values[0] as f64, values[1] as f64))
    }
}
