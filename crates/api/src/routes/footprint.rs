//! Carbon Footprint Calculator Route

use axum::{
    extract::{rejection::QueryRejection, Query},
    Json,
};
use inference_engine::{carbon_footprint, EMISSION_FACTOR};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Query parameters for the footprint calculator
#[derive(Debug, Deserialize)]
pub struct FootprintQuery {
    /// Energy consumed (kWh)
    pub kwh: f64,
}

/// Response for the footprint calculator
#[derive(Debug, Serialize)]
pub struct FootprintResponse {
    pub energy_kwh: f64,
    pub estimated_co2: f64,
    pub emission_factor: f64,
}

/// Estimate CO₂ for a user-entered consumption
pub async fn calculate(
    params: Result<Query<FootprintQuery>, QueryRejection>,
) -> Result<Json<FootprintResponse>, AppError> {
    let Query(params) = params?;
    let estimated_co2 = carbon_footprint(params.kwh)?;
    Ok(Json(FootprintResponse {
        energy_kwh: params.kwh,
        estimated_co2,
        emission_factor: EMISSION_FACTOR,
    }))
}
