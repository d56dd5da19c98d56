//! Uploaded Feature Tables

use std::collections::HashSet;
use std::io::Read;

use chrono::NaiveDateTime;
use feature_engine::{
    column_index, derive_series, parse_timestamp, FeatureRow, RawObservation, SeriesPoint,
    FEATURE_COLUMNS, FEATURE_COUNT, RAW_COLUMNS,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::DatasetError;

/// Timestamp column, kept out of the model input
pub const DATETIME_COLUMN: &str = "datetime";

/// Optional observed consumption column of raw observation tables (kWh)
pub const ENERGY_COLUMN: &str = "energy";

/// How the uploaded columns map onto the model schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// Every schema column is present already
    PreEngineered,
    /// Raw weather columns; features are derived from them
    RawObservations,
}

/// First rows of a table for display
#[derive(Debug, Clone, Serialize)]
pub struct TablePreview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A parsed CSV upload
#[derive(Debug, Clone)]
pub struct UploadedTable {
    /// Non-datetime columns in upload order
    pub headers: Vec<String>,
    /// Cells for `headers`, one vector per row
    pub records: Vec<Vec<String>>,
    /// Parsed datetime column, when the upload has one
    pub datetimes: Option<Vec<NaiveDateTime>>,
    /// Model input rows, aligned with `records`
    pub rows: Vec<FeatureRow>,
    pub kind: TableKind,
    /// Non-fatal problems worth showing to the user
    pub warnings: Vec<String>,
}

impl UploadedTable {
    /// Parse an uploaded CSV
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let all_headers: Vec<String> = rdr
            .headers()
            .map_err(|e| DatasetError::InvalidInput(format!("unreadable CSV header: {}", e)))?
            .iter()
            .map(str::to_string)
            .collect();

        if all_headers.iter().all(|h| h.is_empty()) {
            return Err(DatasetError::InvalidInput("uploaded file is empty".to_string()));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = all_headers.iter().find(|h| !seen.insert(h.as_str())) {
            return Err(DatasetError::InvalidInput(format!("duplicate column '{}'", dup)));
        }

        let mut all_records = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let record = result
                .map_err(|e| DatasetError::InvalidInput(format!("row {}: {}", i + 1, e)))?;
            all_records.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        if all_records.is_empty() {
            return Err(DatasetError::InvalidInput("uploaded file has no data rows".to_string()));
        }

        let datetime_idx = all_headers.iter().position(|h| h == DATETIME_COLUMN);
        let mut warnings = Vec::new();

        let datetimes = match datetime_idx {
            Some(idx) => Some(
                all_records
                    .iter()
                    .enumerate()
                    .map(|(i, rec)| {
                        parse_timestamp(&rec[idx])
                            .map_err(|e| DatasetError::InvalidInput(format!("row {}: {}", i + 1, e)))
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            None => {
                warn!("Upload has no datetime column");
                warnings.push("No datetime column found in the uploaded file.".to_string());
                None
            }
        };

        let (headers, records) = strip_column(all_headers, all_records, datetime_idx);

        let (kind, rows) = if FEATURE_COLUMNS.iter().all(|c| headers.iter().any(|h| h == c)) {
            reject_unknown_columns(&headers, |h| column_index(h).is_some())?;
            (TableKind::PreEngineered, pre_engineered_rows(&headers, &records)?)
        } else if RAW_COLUMNS.iter().all(|c| headers.iter().any(|h| h == c)) {
            reject_unknown_columns(&headers, |h| RAW_COLUMNS.contains(&h) || h == ENERGY_COLUMN)?;
            let datetimes = datetimes.as_deref().ok_or_else(|| {
                DatasetError::InvalidInput(
                    "raw observation uploads need a datetime column to derive calendar features"
                        .to_string(),
                )
            })?;
            (TableKind::RawObservations, raw_rows(&headers, &records, datetimes)?)
        } else {
            let missing: Vec<&str> = FEATURE_COLUMNS
                .iter()
                .filter(|c| !headers.iter().any(|h| h == *c))
                .copied()
                .collect();
            return Err(DatasetError::InvalidInput(format!(
                "missing required columns: {}",
                missing.join(", ")
            )));
        };

        info!("Parsed upload: {} rows, kind={:?}", rows.len(), kind);

        Ok(Self {
            headers,
            records,
            datetimes,
            rows,
            kind,
            warnings,
        })
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First `n` rows as uploaded, without the datetime column
    pub fn head(&self, n: usize) -> TablePreview {
        TablePreview {
            headers: self.headers.clone(),
            rows: self.records.iter().take(n).cloned().collect(),
        }
    }
}

fn strip_column(
    mut headers: Vec<String>,
    mut records: Vec<Vec<String>>,
    idx: Option<usize>,
) -> (Vec<String>, Vec<Vec<String>>) {
    if let Some(idx) = idx {
        headers.remove(idx);
        for record in &mut records {
            record.remove(idx);
        }
    }
    (headers, records)
}

fn reject_unknown_columns(headers: &[String], known: impl Fn(&str) -> bool) -> Result<(), DatasetError> {
    let unknown: Vec<&str> = headers
        .iter()
        .map(String::as_str)
        .filter(|h| !known(*h))
        .collect();
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(DatasetError::SchemaMismatch(format!(
            "columns not in the model schema: {}",
            unknown.join(", ")
        )))
    }
}

/// Parse one cell; empty and NaN-like cells are missing, booleans are 0/1
fn parse_cell(raw: &str) -> Result<Option<f64>, String> {
    match raw {
        "" | "nan" | "NaN" | "NAN" | "NA" | "null" | "None" => Ok(None),
        "True" | "true" | "TRUE" => Ok(Some(1.0)),
        "False" | "false" | "FALSE" => Ok(Some(0.0)),
        other => other
            .parse::<f64>()
            .map(|v| (!v.is_nan()).then_some(v))
            .map_err(|_| format!("'{}' is not a number", other)),
    }
}

fn pre_engineered_rows(headers: &[String], records: &[Vec<String>]) -> Result<Vec<FeatureRow>, DatasetError> {
    let positions: Vec<usize> = FEATURE_COLUMNS
        .iter()
        .filter_map(|c| headers.iter().position(|h| h == c))
        .collect();
    debug_assert_eq!(positions.len(), FEATURE_COUNT);

    records
        .iter()
        .enumerate()
        .map(|(i, record)| -> Result<FeatureRow, DatasetError> {
            let mut row = FeatureRow::default();
            for (slot, &pos) in positions.iter().enumerate() {
                row.values[slot] = parse_cell(&record[pos]).map_err(|e| {
                    DatasetError::InvalidInput(format!("row {}, column {}: {}", i + 1, headers[pos], e))
                })?;
            }
            Ok(row)
        })
        .collect()
}

fn raw_rows(
    headers: &[String],
    records: &[Vec<String>],
    datetimes: &[NaiveDateTime],
) -> Result<Vec<FeatureRow>, DatasetError> {
    let positions: Vec<usize> = RAW_COLUMNS
        .iter()
        .filter_map(|c| headers.iter().position(|h| h == c))
        .collect();
    let energy_pos = headers.iter().position(|h| h == ENERGY_COLUMN);

    let points = records
        .iter()
        .zip(datetimes)
        .enumerate()
        .map(|(i, (record, timestamp))| -> Result<SeriesPoint, DatasetError> {
            let cell_error = |pos: usize, e: String| {
                DatasetError::InvalidInput(format!("row {}, column {}: {}", i + 1, headers[pos], e))
            };

            let mut values = [0.0; 11];
            for (slot, &pos) in positions.iter().enumerate() {
                values[slot] = parse_cell(&record[pos])
                    .map_err(|e| cell_error(pos, e))?
                    .ok_or_else(|| cell_error(pos, "value is required".to_string()))?;
            }

            let energy = match energy_pos {
                Some(pos) => parse_cell(&record[pos]).map_err(|e| cell_error(pos, e))?,
                None => None,
            };

            Ok(SeriesPoint {
                observation: RawObservation::from_values(*timestamp, values),
                energy,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Deriving features for {} raw observations", points.len());
    Ok(derive_series(&points).iter().map(|f| f.to_row()).collect())
}
