//! Inference Engine Implementation

use feature_engine::{FeatureRow, FEATURE_COUNT};
use tracing::{debug, info, warn};

use crate::emissions::PredictionResult;
use crate::onnx::OnnxRegressor;
use crate::InferenceError;

/// A loaded regression model taking one flat f32 row per call
pub trait Regressor: Send + Sync {
    /// Number of input columns the model was trained on
    fn feature_count(&self) -> usize;

    /// Predict the target for one row. NaN marks a missing value.
    fn predict_row(&self, row: &[f32]) -> Result<f64, InferenceError>;
}

/// Read-only model handle, created once at startup and shared by handlers
pub struct InferenceEngine {
    regressor: Box<dyn Regressor>,
    model_path: String,
}

impl InferenceEngine {
    /// Load the ONNX model at `model_path`; it must take `FEATURE_COUNT` inputs
    pub fn load(model_path: &str) -> Result<Self, InferenceError> {
        info!("Creating inference engine with model: {}", model_path);
        let regressor = OnnxRegressor::load(model_path)?;
        if regressor.feature_count() != FEATURE_COUNT {
            return Err(InferenceError::SchemaMismatch {
                expected: format!("{} features", FEATURE_COUNT),
                actual: format!("model declares {} features", regressor.feature_count()),
            });
        }
        Ok(Self::with_regressor(model_path, Box::new(regressor)))
    }

    /// Wrap an already constructed regressor
    pub fn with_regressor(model_path: &str, regressor: Box<dyn Regressor>) -> Self {
        Self {
            regressor,
            model_path: model_path.to_string(),
        }
    }

    /// Predict consumption and emissions for one feature row
    pub fn predict(&self, row: &FeatureRow) -> Result<PredictionResult, InferenceError> {
        let start = std::time::Instant::now();
        self.check_schema(row)?;

        let energy = self.regressor.predict_row(&row.to_model_input())?;
        if !energy.is_finite() {
            warn!("Model returned non-finite prediction: {}", energy);
            return Err(InferenceError::InferenceFailed(format!(
                "model returned non-finite value {}",
                energy
            )));
        }

        debug!("Inference completed in {}us", start.elapsed().as_micros());
        Ok(PredictionResult::from_energy(energy))
    }

    /// Predict every row of a table, one result per row in input order
    pub fn predict_batch(&self, rows: &[FeatureRow]) -> Result<Vec<PredictionResult>, InferenceError> {
        let start = std::time::Instant::now();
        let results = rows
            .iter()
            .map(|row| self.predict(row))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            "Predicted {} rows in {}ms",
            results.len(),
            start.elapsed().as_millis()
        );
        Ok(results)
    }

    fn check_schema(&self, row: &FeatureRow) -> Result<(), InferenceError> {
        let expected = self.regressor.feature_count();
        if row.len() != expected {
            return Err(InferenceError::SchemaMismatch {
                expected: format!("{} features", expected),
                actual: format!("{} features", row.len()),
            });
        }
        Ok(())
    }

    /// Number of input features the model expects
    pub fn feature_count(&self) -> usize {
        self.regressor.feature_count()
    }

    /// Get model path
    pub fn model_path(&self) -> &str {
        &self.model_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Sums present values so predictions depend on the row
    struct SumRegressor {
        width: usize,
    }

    impl Regressor for SumRegressor {
        fn feature_count(&self) -> usize {
            self.width
        }

        fn predict_row(&self, row: &[f32]) -> Result<f64, InferenceError> {
            Ok(row.iter().filter(|v| !v.is_nan()).map(|v| f64::from(*v)).sum())
        }
    }

    struct NanRegressor;

    impl Regressor for NanRegressor {
        fn feature_count(&self) -> usize {
            FEATURE_COUNT
        }

        fn predict_row(&self, _row: &[f32]) -> Result<f64, InferenceError> {
            Ok(f64::NAN)
        }
    }

    fn engine(width: usize) -> InferenceEngine {
        InferenceEngine::with_regressor("test", Box::new(SumRegressor { width }))
    }

    fn row_with(first: f64) -> FeatureRow {
        let mut row = FeatureRow::default();
        row.values[0] = Some(first);
        row
    }

    #[test]
    fn test_prediction_with_emissions() {
        let result = engine(FEATURE_COUNT).predict(&row_with(100.0)).unwrap();
        assert_eq!(result.predicted_energy, 100.0);
        assert_eq!(result.estimated_co2, 47.5);
    }

    #[test]
    fn test_schema_mismatch() {
        let result = engine(37).predict(&row_with(1.0));
        assert!(matches!(result, Err(InferenceError::SchemaMismatch { .. })));
    }

    #[test]
    fn test_non_finite_output_rejected() {
        let engine = InferenceEngine::with_regressor("nan", Box::new(NanRegressor));
        let result = engine.predict(&row_with(1.0));
        assert!(matches!(result, Err(InferenceError::InferenceFailed(_))));
    }

    #[test]
    fn test_batch_fails_as_a_whole() {
        let engine = engine(12);
        let result = engine.predict_batch(&[row_with(1.0), row_with(2.0)]);
        assert!(result.is_err());
    }

    fn fixture(name: &str) -> String {
        format!("{}/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    #[test]
    fn test_load_onnx_model() {
        let engine = InferenceEngine::load(&fixture("row_sum_41.onnx")).unwrap();
        assert_eq!(engine.feature_count(), FEATURE_COUNT);

        let row = FeatureRow::new([Some(1.0); FEATURE_COUNT]);
        let result = engine.predict(&row).unwrap();
        assert_eq!(result.predicted_energy, 41.0);
    }

    #[test]
    fn test_load_rejects_model_of_other_width() {
        let result = InferenceEngine::load(&fixture("row_sum_37.onnx"));
        match result {
            Err(InferenceError::SchemaMismatch { actual, .. }) => assert!(actual.contains("37")),
            other => panic!("expected schema mismatch, got {:?}", other.map(|_| ())),
        }
    }

    proptest! {
        #[test]
        fn prop_batch_matches_single(values in proptest::collection::vec(0.0f64..1000.0, 0..20)) {
            let engine = engine(FEATURE_COUNT);
            let rows: Vec<_> = values.iter().map(|v| row_with(*v)).collect();
            let batch = engine.predict_batch(&rows).unwrap();
            prop_assert_eq!(batch.len(), rows.len());
            for (row, result) in rows.iter().zip(&batch) {
                prop_assert_eq!(*result, engine.predict(row).unwrap());
            }
        }
    }
}
