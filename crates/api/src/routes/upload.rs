//! Uploaded Table Routes

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::header,
    response::IntoResponse,
    Json,
};
use dataset::{PredictedRow, PredictionSummary, PredictionTable, TableKind, TablePreview, UploadedTable};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::AppError;
use crate::routes::UPLOAD_SUGGESTIONS;
use crate::AppState;

/// Multipart field carrying the CSV file
const FILE_FIELD: &str = "file";

/// Rows shown in the upload preview
const PREVIEW_ROWS: usize = 5;

/// Response for an uploaded table
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub kind: TableKind,
    pub warnings: Vec<String>,
    pub preview: TablePreview,
    /// Column headers of `rows[].cells`
    pub columns: Vec<String>,
    pub rows: Vec<PredictedRow>,
    pub summary: PredictionSummary,
    pub suggestions: Vec<&'static str>,
}

async fn read_file(mut multipart: Multipart) -> Result<Vec<u8>, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            let bytes = field.bytes().await?;
            debug!("Received upload of {} bytes", bytes.len());
            return Ok(bytes.to_vec());
        }
    }
    Err(AppError::InvalidInput(format!(
        "no '{}' field in the upload",
        FILE_FIELD
    )))
}

async fn run_upload(state: &AppState, multipart: Multipart) -> Result<PredictionTable, AppError> {
    let bytes = read_file(multipart).await?;
    let table = UploadedTable::from_reader(bytes.as_slice())?;

    let predictions = state.engine.predict_batch(&table.rows)?;
    metrics::counter!("predictions_total", "path" => "upload").increment(predictions.len() as u64);
    metrics::counter!("upload_rows_total").increment(table.len() as u64);

    info!("Predicted {} uploaded rows", predictions.len());
    Ok(PredictionTable::new(table, predictions)?)
}

/// Predict consumption for every row of an uploaded CSV
pub async fn predict(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let predicted = run_upload(&state, multipart?).await?;
    let table = predicted.table();

    Ok(Json(UploadResponse {
        kind: table.kind,
        warnings: table.warnings.clone(),
        preview: table.head(PREVIEW_ROWS),
        columns: table.headers.clone(),
        rows: predicted.rows(),
        summary: predicted.summary(),
        suggestions: UPLOAD_SUGGESTIONS.to_vec(),
    }))
}

/// Uploaded table with prediction columns appended, as CSV
pub async fn download(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let predicted = run_upload(&state, multipart?).await?;
    let body = predicted.to_csv()?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"energy_predictions.csv\"",
            ),
        ],
        body,
    ))
}
