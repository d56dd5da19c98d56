//! Consumption Summaries for Charts

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDateTime};
use serde::Serialize;

use crate::export::PredictionTable;

/// Share of predicted consumption assumed recoverable by optimizing usage
pub const SAVINGS_RATE: f64 = 0.10;

/// Forecast point for the time-series charts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub datetime: NaiveDateTime,
    pub predicted_energy: f64,
    pub estimated_co2: f64,
}

/// Predicted consumption summed over a calendar month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotal {
    /// Month (1-12); years are pooled
    pub month: u32,
    pub predicted_energy: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionSummary {
    pub row_count: usize,
    pub total_energy: f64,
    pub total_co2: f64,
    /// Potential savings (kWh)
    pub savings_estimate: f64,
    /// Empty when the upload had no datetime column
    pub timeline: Vec<ChartPoint>,
    /// Empty when the upload had no datetime column
    pub monthly: Vec<MonthlyTotal>,
}

impl PredictionSummary {
    pub fn from_table(table: &PredictionTable) -> Self {
        let mut total_energy = 0.0;
        let mut total_co2 = 0.0;
        let mut timeline = Vec::new();
        let mut by_month: BTreeMap<u32, f64> = BTreeMap::new();

        for (datetime, prediction) in table.ordered() {
            total_energy += prediction.predicted_energy;
            total_co2 += prediction.estimated_co2;

            if let Some(datetime) = datetime {
                timeline.push(ChartPoint {
                    datetime,
                    predicted_energy: prediction.predicted_energy,
                    estimated_co2: prediction.estimated_co2,
                });
                *by_month.entry(datetime.month()).or_default() += prediction.predicted_energy;
            }
        }

        Self {
            row_count: table.len(),
            total_energy,
            total_co2,
            savings_estimate: total_energy * SAVINGS_RATE,
            timeline,
            monthly: by_month
                .into_iter()
                .map(|(month, predicted_energy)| MonthlyTotal {
                    month,
                    predicted_energy,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UploadedTable;
    use feature_engine::FEATURE_COLUMNS;
    use inference_engine::PredictionResult;

    fn table(timestamps: &[&str], energies: &[f64]) -> PredictionTable {
        let with_datetime = !timestamps.is_empty();
        let mut header: Vec<&str> = FEATURE_COLUMNS.to_vec();
        if with_datetime {
            header.insert(0, "datetime");
        }
        let mut csv = header.join(",") + "\n";
        for i in 0..energies.len() {
            let mut cells = vec!["0"; FEATURE_COLUMNS.len()];
            if with_datetime {
                cells.insert(0, timestamps[i]);
            }
            csv.push_str(&cells.join(","));
            csv.push('\n');
        }
        let upload = UploadedTable::from_reader(csv.as_bytes()).unwrap();
        let predictions = energies.iter().copied().map(PredictionResult::from_energy).collect();
        PredictionTable::new(upload, predictions).unwrap()
    }

    #[test]
    fn test_monthly_totals() {
        let summary = table(
            &["2024-03-02 00:00", "2024-01-05 00:00", "2024-01-20 00:00", "2023-03-10 00:00"],
            &[10.0, 20.0, 30.0, 5.0],
        )
        .summary();

        assert_eq!(
            summary.monthly,
            vec![
                MonthlyTotal { month: 1, predicted_energy: 50.0 },
                MonthlyTotal { month: 3, predicted_energy: 15.0 },
            ]
        );
        assert_eq!(summary.timeline.len(), 4);
        assert_eq!(summary.timeline[0].predicted_energy, 5.0);
    }

    #[test]
    fn test_totals_and_savings() {
        let summary = table(&[], &[100.0, 300.0]).summary();
        assert_eq!(summary.row_count, 2);
        assert_eq!(summary.total_energy, 400.0);
        assert!((summary.total_co2 - 190.0).abs() < 1e-9);
        assert!((summary.savings_estimate - 40.0).abs() < 1e-9);
        assert!(summary.timeline.is_empty());
        assert!(summary.monthly.is_empty());
    }
}
