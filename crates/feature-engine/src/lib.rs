//! Feature Engineering Engine
//!
//! Turns weather observations and timestamps into the fixed-order feature
//! row the energy regression model was trained on.

mod calendar;
mod features;
mod history;
mod observation;
mod schema;
mod statistics;

pub use calendar::{CalendarFeatures, MonthFlags, Season, SeasonFlags};
pub use features::{DerivedFeatureVector, FeatureDeriver};
pub use history::{derive_series, LagFeatures, SeriesPoint, ROLLING_WINDOW};
pub use observation::{parse_timestamp, RawObservation, RAW_COLUMNS};
pub use schema::{column_index, FeatureRow, FEATURE_COLUMNS, FEATURE_COUNT};
pub use statistics::RollingStatistics;

use thiserror::Error;

/// Errors raised while deriving features
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    /// Timestamp or raw value could not be interpreted
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
