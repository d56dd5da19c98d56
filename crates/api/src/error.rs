//! Error handling for the dashboard API
//!
//! Every failure of an interaction becomes one JSON message for the user.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dataset::DatasetError;
use feature_engine::FeatureError;
use inference_engine::InferenceError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    SchemaMismatch(String),

    #[error("Prediction failed: {0}")]
    Inference(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}

impl AppError {
    fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::SchemaMismatch(_) => "schema_mismatch",
            AppError::Inference(_) => "inference_failed",
            AppError::Internal(_) => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::SchemaMismatch(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Inference(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }
        metrics::counter!("prediction_errors_total", "kind" => self.kind()).increment(1);

        let body = ErrorResponse {
            error: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<FeatureError> for AppError {
    fn from(err: FeatureError) -> Self {
        match err {
            FeatureError::InvalidInput(msg) => AppError::InvalidInput(msg),
        }
    }
}

impl From<InferenceError> for AppError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::InvalidInput(msg) => AppError::InvalidInput(msg),
            InferenceError::SchemaMismatch { .. } => AppError::SchemaMismatch(format!(
                "the data does not match the model's expected features ({})",
                err
            )),
            InferenceError::InferenceFailed(msg) => AppError::Inference(msg),
            InferenceError::MissingAsset(_) | InferenceError::ModelLoadError(_) => {
                AppError::Internal(err.to_string())
            }
        }
    }
}

impl From<DatasetError> for AppError {
    fn from(err: DatasetError) -> Self {
        match err {
            DatasetError::InvalidInput(msg) => AppError::InvalidInput(msg),
            DatasetError::SchemaMismatch(msg) => AppError::SchemaMismatch(msg),
            DatasetError::LengthMismatch { .. } | DatasetError::WriteError(_) => {
                AppError::Internal(err.to_string())
            }
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::InvalidInput(format!("malformed upload: {}", err))
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::InvalidInput(format!("malformed upload: {}", rejection.body_text()))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::InvalidInput("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::SchemaMismatch("x".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::Inference("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_schema_mismatch_from_inference() {
        let err: AppError = InferenceError::SchemaMismatch {
            expected: "41 features".into(),
            actual: "37 features".into(),
        }
        .into();
        assert!(matches!(err, AppError::SchemaMismatch(_)));
        assert!(err.to_string().contains("37 features"));
    }
}
