//! Raw Weather Observations

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::FeatureError;

/// Raw measurement columns of an observation table, in form order
pub const RAW_COLUMNS: [&str; 11] = [
    "temp",
    "dew",
    "humidity",
    "windgust",
    "windspeed",
    "sealevelpressure",
    "cloudcover",
    "visibility",
    "solarradiation",
    "uvindex",
    "winddir_degree",
];

/// Date-time layouts accepted besides RFC 3339. `%.f` is optional when parsing.
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// A single weather observation at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    /// Local wall-clock time of the observation
    pub timestamp: NaiveDateTime,
    /// Temperature (°C)
    pub temp: f64,
    /// Dew point (°C)
    pub dew: f64,
    /// Relative humidity (%)
    pub humidity: f64,
    /// Wind gust (km/h)
    pub windgust: f64,
    /// Wind speed (km/h)
    pub windspeed: f64,
    /// Sea level pressure (hPa)
    pub sealevelpressure: f64,
    /// Cloud cover fraction (0 to 1)
    pub cloudcover: f64,
    /// Visibility (km)
    pub visibility: f64,
    /// Solar radiation (W/m²)
    pub solarradiation: f64,
    /// UV index
    pub uvindex: f64,
    /// Wind direction in degrees
    pub winddir_degree: f64,
}

impl RawObservation {
    /// Build an observation from the raw columns in `RAW_COLUMNS` order
    pub fn from_values(timestamp: NaiveDateTime, values: [f64; 11]) -> Self {
        let [temp, dew, humidity, windgust, windspeed, sealevelpressure, cloudcover, visibility, solarradiation, uvindex, winddir_degree] =
            values;
        Self {
            timestamp,
            temp,
            dew,
            humidity,
            windgust,
            windspeed,
            sealevelpressure,
            cloudcover,
            visibility,
            solarradiation,
            uvindex,
            winddir_degree,
        }
    }
}

/// Parse a timestamp the way dashboard inputs write them.
///
/// Offsets in RFC 3339 strings are dropped after conversion to the local
/// wall time they describe; calendar features are taken from that wall time.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, FeatureError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(FeatureError::InvalidInput("missing timestamp".to_string()));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_local());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(dt);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| FeatureError::InvalidInput(format!("unparseable timestamp '{}'", raw)))
}
