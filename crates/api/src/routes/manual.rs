//! Manual Input Routes

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::{FixedOffset, NaiveDateTime, Utc};
use dataset::manual_csv;
use feature_engine::{parse_timestamp, DerivedFeatureVector, RawObservation};
use inference_engine::PredictionResult;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppError;
use crate::routes::MANUAL_SUGGESTIONS;
use crate::AppState;

/// Manual form submission; omitted fields take the form defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ManualInput {
    /// Observation time; "now" in the configured offset when omitted
    pub datetime: Option<String>,
    pub temp: f64,
    pub dew: f64,
    pub humidity: f64,
    pub windgust: f64,
    pub windspeed: f64,
    pub sealevelpressure: f64,
    pub cloudcover: f64,
    pub visibility: f64,
    pub solarradiation: f64,
    pub uvindex: f64,
    pub winddir_degree: f64,
}

impl Default for ManualInput {
    fn default() -> Self {
        Self {
            datetime: None,
            temp: 25.0,
            dew: 10.0,
            humidity: 60.0,
            windgust: 20.0,
            windspeed: 10.0,
            sealevelpressure: 1013.0,
            cloudcover: 0.5,
            visibility: 10.0,
            solarradiation: 500.0,
            uvindex: 5.0,
            winddir_degree: 90.0,
        }
    }
}

impl ManualInput {
    /// Resolve the timestamp and build the observation
    pub fn into_observation(self, offset: FixedOffset) -> Result<RawObservation, AppError> {
        let timestamp = match self.datetime.as_deref() {
            Some(raw) => parse_timestamp(raw)?,
            None => Utc::now().with_timezone(&offset).naive_local(),
        };

        Ok(RawObservation {
            timestamp,
            temp: self.temp,
            dew: self.dew,
            humidity: self.humidity,
            windgust: self.windgust,
            windspeed: self.windspeed,
            sealevelpressure: self.sealevelpressure,
            cloudcover: self.cloudcover,
            visibility: self.visibility,
            solarradiation: self.solarradiation,
            uvindex: self.uvindex,
            winddir_degree: self.winddir_degree,
        })
    }
}

/// Response for a manual prediction
#[derive(Debug, Serialize)]
pub struct ManualPredictionResponse {
    pub datetime: NaiveDateTime,
    pub features: DerivedFeatureVector,
    pub prediction: PredictionResult,
    pub suggestions: Vec<&'static str>,
}

fn run_manual(
    state: &AppState,
    input: ManualInput,
) -> Result<(RawObservation, DerivedFeatureVector, PredictionResult), AppError> {
    let offset = state.config.utc_offset().ok_or_else(|| {
        AppError::Internal(format!(
            "invalid timezone offset {}",
            state.config.timezone_offset_hours
        ))
    })?;
    let observation = input.into_observation(offset)?;

    let validation = state.validator.validate_observation(&observation);
    if !validation.valid {
        return Err(AppError::InvalidInput(validation.message()));
    }

    let features = state.deriver.derive(&observation);
    let prediction = state.engine.predict(&features.to_row())?;
    metrics::counter!("predictions_total", "path" => "manual").increment(1);

    info!(
        "Manual prediction for {}: {:.2} kWh, {:.2} kg CO2",
        observation.timestamp, prediction.predicted_energy, prediction.estimated_co2
    );

    Ok((observation, features, prediction))
}

/// Predict consumption for one manually entered observation
pub async fn predict(
    State(state): State<Arc<AppState>>,
    input: Result<Json<ManualInput>, JsonRejection>,
) -> Result<Json<ManualPredictionResponse>, AppError> {
    let Json(input) = input?;
    let (observation, features, prediction) = run_manual(&state, input)?;

    Ok(Json(ManualPredictionResponse {
        datetime: observation.timestamp,
        features,
        prediction,
        suggestions: MANUAL_SUGGESTIONS.to_vec(),
    }))
}

/// Manual prediction as a one-row CSV download
pub async fn download(
    State(state): State<Arc<AppState>>,
    input: Result<Json<ManualInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = input?;
    let (observation, features, prediction) = run_manual(&state, input)?;
    let body = manual_csv(observation.timestamp, &features, &prediction)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"datetime_energy_prediction.csv\"",
            ),
        ],
        body,
    ))
}
