//! Energy Prediction Dashboard API Server
//!
//! HTTP service for predicting hourly energy consumption from weather
//! observations and estimating the resulting CO₂ emissions.

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use data_validator::Validator;
use feature_engine::FeatureDeriver;
use inference_engine::InferenceEngine;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, subscriber::SetGlobalDefaultError, Level};
use tracing_subscriber::FmtSubscriber;

pub mod config;
pub mod error;
pub mod routes;

pub use config::DashboardConfig;
pub use error::{AppError, ErrorResponse};

/// Application state shared across handlers
pub struct AppState {
    /// Loaded regression model
    pub engine: InferenceEngine,
    pub validator: Validator,
    pub deriver: FeatureDeriver,
    pub config: DashboardConfig,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
    /// Prometheus exporter, absent when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state around a loaded model
    pub fn new(engine: InferenceEngine, config: DashboardConfig) -> Self {
        Self {
            engine,
            validator: Validator::default(),
            deriver: FeatureDeriver::new(),
            config,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub model: ModelStatus,
}

#[derive(Debug, Serialize)]
pub struct ModelStatus {
    pub path: String,
    pub feature_count: usize,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.upload.max_bytes;

    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/predict/manual", post(routes::manual::predict))
        .route("/api/v1/predict/manual/download", post(routes::manual::download))
        .route("/api/v1/predict/upload", post(routes::upload::predict))
        .route("/api/v1/predict/upload/download", post(routes::upload::download))
        .route("/api/v1/footprint", get(routes::footprint::calculate))
        .route("/metrics", get(metrics_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model: ModelStatus {
            path: state.engine.model_path().to_string(),
            feature_count: state.engine.feature_count(),
        },
    })
}

/// Prometheus text exposition
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed".to_string()),
    }
}

/// Initialize logging at the given maximum level; unknown levels fall back to INFO
pub fn init_logging(level: &str) -> Result<(), SetGlobalDefaultError> {
    let level = level.parse::<Level>().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
}

/// Check assets, load the model and serve until shutdown
pub async fn run_server(config: DashboardConfig) -> anyhow::Result<()> {
    let missing = config.missing_assets();
    if !missing.is_empty() {
        anyhow::bail!("required files are missing: {}", missing.join(", "));
    }

    let engine = InferenceEngine::load(&config.model.path)?;
    let handle = PrometheusBuilder::new().install_recorder()?;
    let addr = config.addr();

    let state = Arc::new(AppState::new(engine, config).with_metrics(handle));
    let app = create_router(state);

    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
