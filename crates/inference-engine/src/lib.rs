//! ONNX Inference Engine
//!
//! Runs the pre-trained energy regression model with tract and converts its
//! output into consumption and CO₂ estimates.

mod emissions;
mod engine;
mod onnx;

pub use emissions::{carbon_footprint, estimated_emissions, PredictionResult, EMISSION_FACTOR};
pub use engine::{InferenceEngine, Regressor};
pub use onnx::OnnxRegressor;

use thiserror::Error;

/// Errors during model loading and inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Required asset not found: {0}")]
    MissingAsset(String),
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Input does not match the model schema: expected {expected}, got {actual}")]
    SchemaMismatch { expected: String, actual: String },
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
