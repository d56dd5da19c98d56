//! Dataset Layer
//!
//! Reads uploaded feature tables, writes prediction tables back out as CSV,
//! and aggregates predictions for the dashboard charts.

mod export;
mod summary;
mod table;

pub use export::{
    manual_csv, PredictedRow, PredictionTable, ESTIMATED_CO2_COLUMN, PREDICTED_ENERGY_COLUMN,
};
pub use summary::{ChartPoint, MonthlyTotal, PredictionSummary, SAVINGS_RATE};
pub use table::{TableKind, TablePreview, UploadedTable, DATETIME_COLUMN, ENERGY_COLUMN};

use thiserror::Error;

/// Dataset errors
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),
    #[error("Row count mismatch: {rows} rows, {predictions} predictions")]
    LengthMismatch { rows: usize, predictions: usize },
    #[error("CSV write error: {0}")]
    WriteError(String),
}
