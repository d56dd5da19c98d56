//! Prediction Tables and CSV Export

use chrono::NaiveDateTime;
use feature_engine::{DerivedFeatureVector, FEATURE_COLUMNS};
use inference_engine::PredictionResult;
use serde::Serialize;
use tracing::debug;

use crate::summary::PredictionSummary;
use crate::table::{UploadedTable, DATETIME_COLUMN};
use crate::DatasetError;

/// Appended prediction column
pub const PREDICTED_ENERGY_COLUMN: &str = "Predicted Energy Consumption (kWh)";

/// Appended emission column
pub const ESTIMATED_CO2_COLUMN: &str = "Estimated CO₂ Emissions (kg)";

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One uploaded row with its prediction, as displayed
#[derive(Debug, Clone, Serialize)]
pub struct PredictedRow {
    pub datetime: Option<String>,
    pub cells: Vec<String>,
    pub predicted_energy: f64,
    pub estimated_co2: f64,
}

/// Uploaded table joined with one prediction per row.
///
/// Rows are presented in datetime order when the upload had a datetime
/// column, otherwise in upload order.
#[derive(Debug, Clone)]
pub struct PredictionTable {
    table: UploadedTable,
    predictions: Vec<PredictionResult>,
    order: Vec<usize>,
}

impl PredictionTable {
    pub fn new(table: UploadedTable, predictions: Vec<PredictionResult>) -> Result<Self, DatasetError> {
        if table.len() != predictions.len() {
            return Err(DatasetError::LengthMismatch {
                rows: table.len(),
                predictions: predictions.len(),
            });
        }

        let mut order: Vec<usize> = (0..table.len()).collect();
        if let Some(datetimes) = &table.datetimes {
            order.sort_by_key(|&i| datetimes[i]);
        }

        Ok(Self {
            table,
            predictions,
            order,
        })
    }

    pub fn table(&self) -> &UploadedTable {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }

    /// Predictions in display order with their timestamps
    pub fn ordered(&self) -> impl Iterator<Item = (Option<NaiveDateTime>, &PredictionResult)> + '_ {
        self.order.iter().map(move |&i| {
            let datetime = self.table.datetimes.as_ref().map(|d| d[i]);
            (datetime, &self.predictions[i])
        })
    }

    /// Rows in display order
    pub fn rows(&self) -> Vec<PredictedRow> {
        self.order
            .iter()
            .map(|&i| PredictedRow {
                datetime: self
                    .table
                    .datetimes
                    .as_ref()
                    .map(|d| d[i].format(DATETIME_FORMAT).to_string()),
                cells: self.table.records[i].clone(),
                predicted_energy: self.predictions[i].predicted_energy,
                estimated_co2: self.predictions[i].estimated_co2,
            })
            .collect()
    }

    pub fn summary(&self) -> PredictionSummary {
        PredictionSummary::from_table(self)
    }

    /// Upload columns, the two prediction columns, then `datetime` when present
    pub fn to_csv(&self) -> Result<Vec<u8>, DatasetError> {
        let mut wtr = csv::Writer::from_writer(vec![]);

        let mut header: Vec<&str> = self.table.headers.iter().map(String::as_str).collect();
        header.push(PREDICTED_ENERGY_COLUMN);
        header.push(ESTIMATED_CO2_COLUMN);
        if self.table.datetimes.is_some() {
            header.push(DATETIME_COLUMN);
        }
        write_record(&mut wtr, header)?;

        for row in self.rows() {
            let mut record = row.cells;
            record.push(row.predicted_energy.to_string());
            record.push(row.estimated_co2.to_string());
            if let Some(datetime) = row.datetime {
                record.push(datetime);
            }
            write_record(&mut wtr, &record)?;
        }

        debug!("Exported {} prediction rows", self.len());
        finish(wtr)
    }
}

/// Single-row export for a manual prediction: `datetime`, the feature
/// columns, then the prediction columns. Missing values are empty cells.
pub fn manual_csv(
    timestamp: NaiveDateTime,
    features: &DerivedFeatureVector,
    prediction: &PredictionResult,
) -> Result<Vec<u8>, DatasetError> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec![DATETIME_COLUMN];
    header.extend(FEATURE_COLUMNS);
    header.push(PREDICTED_ENERGY_COLUMN);
    header.push(ESTIMATED_CO2_COLUMN);
    write_record(&mut wtr, header)?;

    let mut record = vec![timestamp.format(DATETIME_FORMAT).to_string()];
    record.extend(
        features
            .to_row()
            .values
            .iter()
            .map(|v| v.map(|x| x.to_string()).unwrap_or_default()),
    );
    record.push(prediction.predicted_energy.to_string());
    record.push(prediction.estimated_co2.to_string());
    write_record(&mut wtr, &record)?;

    finish(wtr)
}

fn write_record<I, T>(wtr: &mut csv::Writer<Vec<u8>>, record: I) -> Result<(), DatasetError>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    wtr.write_record(record)
        .map_err(|e| DatasetError::WriteError(e.to_string()))
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, DatasetError> {
    wtr.into_inner()
        .map_err(|e| DatasetError::WriteError(e.to_string()))
}
