//! Data Validator for Range Checking

use crate::error::ValidationError;
use feature_engine::RawObservation;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Validation configuration, matching the bounds of the manual input form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Relative humidity valid range (%)
    pub humidity_range: (f64, f64),
    /// Cloud cover valid range (fraction)
    pub cloudcover_range: (f64, f64),
    /// UV index valid range
    pub uvindex_range: (f64, f64),
    /// Wind direction valid range (degrees)
    pub winddir_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            humidity_range: (0.0, 100.0),
            cloudcover_range: (0.0, 1.0),
            uvindex_range: (0.0, 11.0),
            winddir_range: (0.0, 360.0),
        }
    }
}

/// Result of validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether all values are valid
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Number of fields validated
    pub fields_checked: usize,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid(fields_checked: usize) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            fields_checked,
        }
    }

    /// Create an invalid result with errors
    pub fn invalid(errors: Vec<ValidationError>, fields_checked: usize) -> Self {
        Self {
            valid: false,
            errors,
            fields_checked,
        }
    }

    /// All error messages joined for display
    pub fn message(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Validator for manually entered observations
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if !value.is_finite() {
            Err(ValidationError::NonFinite(field))
        } else if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Validate humidity
    pub fn validate_humidity(&self, humidity: f64) -> Result<(), ValidationError> {
        self.validate_range("humidity", humidity, self.config.humidity_range)
    }

    /// Validate cloud cover
    pub fn validate_cloudcover(&self, cloudcover: f64) -> Result<(), ValidationError> {
        self.validate_range("cloudcover", cloudcover, self.config.cloudcover_range)
    }

    /// Validate UV index
    pub fn validate_uvindex(&self, uvindex: f64) -> Result<(), ValidationError> {
        self.validate_range("uvindex", uvindex, self.config.uvindex_range)
    }

    /// Validate wind direction
    pub fn validate_winddir(&self, degrees: f64) -> Result<(), ValidationError> {
        self.validate_range("winddir_degree", degrees, self.config.winddir_range)
    }

    /// Check every field of an observation, collecting all failures
    pub fn validate_observation(&self, obs: &RawObservation) -> ValidationResult {
        let unbounded = [
            ("temp", obs.temp),
            ("dew", obs.dew),
            ("windgust", obs.windgust),
            ("windspeed", obs.windspeed),
            ("sealevelpressure", obs.sealevelpressure),
            ("visibility", obs.visibility),
            ("solarradiation", obs.solarradiation),
        ];

        let mut errors: Vec<ValidationError> = unbounded
            .iter()
            .filter(|(_, value)| !value.is_finite())
            .map(|(field, _)| ValidationError::NonFinite(*field))
            .collect();

        let bounded = [
            self.validate_humidity(obs.humidity),
            self.validate_cloudcover(obs.cloudcover),
            self.validate_uvindex(obs.uvindex),
            self.validate_winddir(obs.winddir_degree),
        ];
        errors.extend(bounded.into_iter().filter_map(Result::err));

        let fields_checked = unbounded.len() + 4;
        if errors.is_empty() {
            ValidationResult::valid(fields_checked)
        } else {
            debug!("Observation rejected with {} errors", errors.len());
            ValidationResult::invalid(errors, fields_checked)
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
