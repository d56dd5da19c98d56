//! Configuration management for the energy dashboard
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Optional `config/dashboard.toml`
//! 3. Environment variable overrides with ECP_ prefix (`ECP_MODEL__PATH`,
//!    `ECP_SERVER__PORT`)

use std::path::Path;

use chrono::FixedOffset;
use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Model artifact
    pub model: ModelConfig,

    /// Static assets that must exist before serving
    pub assets: AssetConfig,

    /// Upload limits
    pub upload: UploadConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Offset from UTC used when a manual form omits its datetime
    pub timezone_offset_hours: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// Path to the ONNX regression model
    pub path: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AssetConfig {
    /// Files checked at startup
    pub required: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    /// Maximum request body size in bytes
    pub max_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Maximum log level (trace, debug, info, warn, error)
    pub level: String,
}

impl DashboardConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(environment())
    }

    fn load_with(env: Environment) -> Result<Self, ConfigError> {
        let config: Self = config::Config::builder()
            .set_default("server.port", 8501)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("model.path", "models/energy_model.onnx")?
            .set_default("assets.required", Vec::<String>::new())?
            .set_default("upload.max_bytes", 10 * 1024 * 1024)?
            .set_default("logging.level", "info")?
            .set_default("timezone_offset_hours", 5.5)?
            .add_source(File::with_name("config/dashboard").required(false))
            .add_source(env)
            .build()?
            .try_deserialize()?;

        if config.utc_offset().is_none() {
            return Err(ConfigError::Message(format!(
                "timezone_offset_hours must be within (-24, 24), got {}",
                config.timezone_offset_hours
            )));
        }

        Ok(config)
    }

    /// Fixed offset used for the manual form's "now", if the configured hours are valid
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        let hours = self.timezone_offset_hours;
        if !hours.is_finite() {
            return None;
        }
        FixedOffset::east_opt((hours * 3600.0).round() as i32)
    }

    /// Socket address to bind
    pub fn addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Model and asset paths that do not exist on disk
    pub fn missing_assets(&self) -> Vec<String> {
        std::iter::once(&self.model.path)
            .chain(self.assets.required.iter())
            .filter(|p| !Path::new(p.as_str()).is_file())
            .cloned()
            .collect()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("ECP")
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("assets.required")
        .try_parsing(true)
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            model: ModelConfig {
                path: "models/energy_model.onnx".to_string(),
            },
            assets: AssetConfig::default(),
            upload: UploadConfig {
                max_bytes: 10 * 1024 * 1024,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            timezone_offset_hours: 5.5,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8501,
            host: "0.0.0.0".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:8501");
        assert_eq!(config.timezone_offset_hours, 5.5);
    }

    fn env(vars: &[(&str, &str)]) -> Environment {
        let source = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(source))
    }

    #[test]
    fn test_environment_overrides() {
        let config = DashboardConfig::load_with(env(&[
            ("ECP_MODEL__PATH", "/srv/models/energy.onnx"),
            ("ECP_SERVER__PORT", "9000"),
            ("ECP_ASSETS__REQUIRED", "a.png,b.png"),
        ]))
        .unwrap();

        assert_eq!(config.model.path, "/srv/models/energy.onnx");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.assets.required, vec!["a.png".to_string(), "b.png".to_string()]);
        assert_eq!(config.timezone_offset_hours, 5.5);
    }

    #[test]
    fn test_rejects_out_of_range_offset() {
        let result = DashboardConfig::load_with(env(&[("ECP_TIMEZONE_OFFSET_HOURS", "30")]));
        assert!(matches!(result, Err(ConfigError::Message(_))));

        let config = DashboardConfig::load_with(env(&[("ECP_TIMEZONE_OFFSET_HOURS", "-3.5")])).unwrap();
        assert_eq!(config.utc_offset().map(|o| o.local_minus_utc()), Some(-12600));
    }

    #[test]
    fn test_missing_assets() {
        let mut config = DashboardConfig::default();
        config.model.path = "models/absent.onnx".to_string();
        config.assets.required = vec!["Cargo.toml".to_string(), "assets/logo.png".to_string()];

        let missing = config.missing_assets();
        assert_eq!(missing, vec!["models/absent.onnx".to_string(), "assets/logo.png".to_string()]);
    }
}
