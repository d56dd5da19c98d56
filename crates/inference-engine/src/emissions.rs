//! Carbon Emission Estimates

use serde::{Deserialize, Serialize};

use crate::InferenceError;

/// Grid emission factor (kg CO₂ per kWh)
pub const EMISSION_FACTOR: f64 = 0.475;

/// Estimated CO₂ (kg) for an amount of energy (kWh)
pub fn estimated_emissions(energy_kwh: f64) -> f64 {
    energy_kwh * EMISSION_FACTOR
}

/// Carbon footprint calculator for a user-entered consumption.
/// Only strictly positive consumption is accepted.
pub fn carbon_footprint(energy_kwh: f64) -> Result<f64, InferenceError> {
    if !energy_kwh.is_finite() || energy_kwh <= 0.0 {
        return Err(InferenceError::InvalidInput(
            "please enter a valid energy consumption to calculate CO₂ emissions".to_string(),
        ));
    }
    Ok(estimated_emissions(energy_kwh))
}

/// Model output for one row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted consumption (kWh)
    pub predicted_energy: f64,
    /// Estimated emissions (kg CO₂)
    pub estimated_co2: f64,
}

impl PredictionResult {
    pub fn from_energy(predicted_energy: f64) -> Self {
        Self {
            predicted_energy,
            estimated_co2: estimated_emissions(predicted_energy),
        }
    }
}
