//! tract-backed ONNX Regressor

use std::path::Path;

use feature_engine::FEATURE_COUNT;
use tract_onnx::prelude::*;
use tract_onnx::tract_hir::infer::Factoid;
use tracing::{info, warn};

use crate::engine::Regressor;
use crate::InferenceError;

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Regression model exported to ONNX, optimized once and run per row
pub struct OnnxRegressor {
    plan: OnnxPlan,
    feature_count: usize,
}

impl OnnxRegressor {
    /// Load a model and optimize it for single-row f32 input.
    ///
    /// The row width is the model's declared input width when its last
    /// dimension is concrete, otherwise `FEATURE_COUNT`.
    pub fn load(path: &str) -> Result<Self, InferenceError> {
        if !Path::new(path).is_file() {
            return Err(InferenceError::MissingAsset(path.to_string()));
        }

        info!("Loading ONNX model from {}", path);

        let model = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(|e| InferenceError::ModelLoadError(e.to_string()))?;

        let feature_count = match declared_width(&model)? {
            Some(width) => width,
            None => {
                warn!("Model does not declare its input width, assuming {}", FEATURE_COUNT);
                FEATURE_COUNT
            }
        };

        let plan = model
            .with_input_fact(0, f32::fact([1, feature_count]).into())
            // declared output shapes may carry a symbolic batch dimension
            .and_then(|m| m.with_output_fact(0, InferenceFact::default()))
            .and_then(|m| m.into_optimized())
            .and_then(|m| m.into_runnable())
            .map_err(|e| InferenceError::ModelLoadError(format!("{:#}", e)))?;

        info!("Model loaded successfully ({} input features)", feature_count);

        Ok(Self {
            plan,
            feature_count,
        })
    }
}

/// Last input dimension as written in the model file, if concrete
fn declared_width(model: &InferenceModel) -> Result<Option<usize>, InferenceError> {
    let fact = model
        .input_fact(0)
        .map_err(|e| InferenceError::ModelLoadError(e.to_string()))?;

    if fact.shape.is_open() {
        return Ok(None);
    }

    Ok(fact
        .shape
        .dims()
        .last()
        .and_then(|dim| dim.concretize())
        .and_then(|dim| dim.to_i64().ok())
        .and_then(|width| usize::try_from(width).ok()))
}

impl Regressor for OnnxRegressor {
    fn feature_count(&self) -> usize {
        self.feature_count
    }

    fn predict_row(&self, row: &[f32]) -> Result<f64, InferenceError> {
        let input = Tensor::from_shape(&[1, row.len()], row)
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let output = outputs
            .first()
            .ok_or_else(|| InferenceError::InferenceFailed("model produced no output".to_string()))?;
        let view = output
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        view.iter()
            .next()
            .map(|v| f64::from(*v))
            .ok_or_else(|| InferenceError::InferenceFailed("model output is empty".to_string()))
    }
}
