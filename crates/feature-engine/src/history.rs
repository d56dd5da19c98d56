//! Lag and Rolling Features for Time-Ordered Tables

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::features::{DerivedFeatureVector, FeatureDeriver};
use crate::observation::RawObservation;
use crate::statistics::RollingStatistics;

/// Trailing window length (rows) for the 24-hour statistics
pub const ROLLING_WINDOW: usize = 24;

/// Lag and rolling feature group; `None` means no history for that value
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LagFeatures {
    pub rolling_mean_24hr: Option<f64>,
    pub lag_1: Option<f64>,
    pub lag_24: Option<f64>,
    pub lag_168: Option<f64>,
    pub rolling_std_24hr: Option<f64>,
    pub rolling_mean: Option<f64>,
}

impl LagFeatures {
    /// All values missing, as for a single manual observation
    pub fn missing() -> Self {
        Self::default()
    }

    /// Number of values that are present
    pub fn present_count(&self) -> usize {
        [
            self.rolling_mean_24hr,
            self.lag_1,
            self.lag_24,
            self.lag_168,
            self.rolling_std_24hr,
            self.rolling_mean,
        ]
        .iter()
        .filter(|v| v.is_some())
        .count()
    }
}

/// An observation with the energy actually consumed at that time, if known
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub observation: RawObservation,
    /// Observed consumption (kWh)
    pub energy: Option<f64>,
}

/// Derive features for a table of observations.
///
/// Lags and rolling statistics come from the observed energy of earlier rows
/// in timestamp order; the current row never contributes to its own window.
/// Output is aligned with the input order.
pub fn derive_series(points: &[SeriesPoint]) -> Vec<DerivedFeatureVector> {
    let deriver = FeatureDeriver::new();

    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by_key(|&i| points[i].observation.timestamp);

    let series: Vec<Option<f64>> = order.iter().map(|&i| points[i].energy).collect();

    let mut derived: Vec<Option<DerivedFeatureVector>> = vec![None; points.len()];
    let mut running_sum = 0.0;
    let mut running_count = 0usize;

    for (pos, &idx) in order.iter().enumerate() {
        let lag = |n: usize| if pos >= n { series[pos - n] } else { None };

        let (rolling_mean_24hr, rolling_std_24hr) = if pos >= ROLLING_WINDOW {
            let window: Option<Vec<f64>> = series[pos - ROLLING_WINDOW..pos].iter().copied().collect();
            match window {
                Some(values) => {
                    let stats = RollingStatistics::compute(&values);
                    (stats.mean_opt(), stats.std_dev_opt())
                }
                None => (None, None),
            }
        } else {
            (None, None)
        };

        let lags = LagFeatures {
            rolling_mean_24hr,
            lag_1: lag(1),
            lag_24: lag(24),
            lag_168: lag(168),
            rolling_std_24hr,
            rolling_mean: (running_count > 0).then(|| running_sum / running_count as f64),
        };

        derived[idx] = Some(deriver.derive_with_history(&points[idx].observation, lags));

        if let Some(value) = series[pos] {
            running_sum += value;
            running_count += 1;
        }
    }

    debug!(
        "Derived series features for {} rows ({} with observed energy)",
        points.len(),
        running_count
    );

    derived.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDateTime};

    fn start() -> NaiveDateTime {
        crate::parse_timestamp("2024-03-01 00:00").unwrap()
    }

    fn point(hours: i64, energy: Option<f64>) -> SeriesPoint {
        SeriesPoint {
            observation: RawObservation::from_values(
                start() + Duration::hours(hours),
                [20.0, 8.0, 55.0, 15.0, 8.0, 1010.0, 0.3, 10.0, 300.0, 3.0, 180.0],
            ),
            energy,
        }
    }

    fn hourly(n: usize) -> Vec<SeriesPoint> {
        (0..n).map(|h| point(h as i64, Some(h as f64))).collect()
    }

    #[test]
    fn test_first_row_has_no_history() {
        let derived = derive_series(&hourly(3));
        assert_eq!(derived[0].lag_features(), LagFeatures::missing());
        assert_eq!(derived[1].lag_1, Some(0.0));
        assert_eq!(derived[2].lag_1, Some(1.0));
        assert_eq!(derived[2].rolling_mean, Some(0.5));
    }

    #[test]
    fn test_rolling_window_needs_full_day() {
        let derived = derive_series(&hourly(26));
        assert_eq!(derived[23].rolling_mean_24hr, None);
        assert_eq!(derived[23].lag_24, None);

        // Row 24 sees values 0..=23
        assert_eq!(derived[24].rolling_mean_24hr, Some(11.5));
        assert_eq!(derived[24].lag_24, Some(0.0));
        let expected_std = RollingStatistics::compute(&(0..24).map(|v| v as f64).collect::<Vec<_>>()).std_dev;
        assert_eq!(derived[24].rolling_std_24hr, Some(expected_std));

        // Row 25 sees values 1..=24
        assert_eq!(derived[25].rolling_mean_24hr, Some(12.5));
        assert_eq!(derived[25].lag_168, None);
    }

    #[test]
    fn test_weekly_lag() {
        let derived = derive_series(&hourly(170));
        assert_eq!(derived[167].lag_168, None);
        assert_eq!(derived[168].lag_168, Some(0.0));
        assert_eq!(derived[169].lag_168, Some(1.0));
    }

    #[test]
    fn test_unsorted_input_uses_timestamp_order() {
        let points = vec![point(2, Some(30.0)), point(0, Some(10.0)), point(1, Some(20.0))];
        let derived = derive_series(&points);

        // Output stays aligned with input rows
        assert_eq!(derived[1].lag_1, None);
        assert_eq!(derived[2].lag_1, Some(10.0));
        assert_eq!(derived[0].lag_1, Some(20.0));
        assert_eq!(derived[0].rolling_mean, Some(15.0));
        assert_eq!(derived[0].hour, 2);
    }

    #[test]
    fn test_gap_in_energy_leaves_window_missing() {
        let mut points = hourly(25);
        points[10].energy = None;
        let derived = derive_series(&points);
        assert_eq!(derived[24].rolling_mean_24hr, None);
        assert_eq!(derived[11].lag_1, None);
        assert_eq!(derived[24].lag_1, Some(23.0));
    }

    #[test]
    fn test_no_energy_column() {
        let points: Vec<_> = (0..30).map(|h| point(h, None)).collect();
        for features in derive_series(&points) {
            assert_eq!(features.lag_features().present_count(), 0);
        }
    }
}
