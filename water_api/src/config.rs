//! Service configuration
//!
//! Loaded from `config/water_api.toml` when present, with environment
//! overrides under the `WATER_API_` prefix
//! (e.g. `WATER_API_SERVER__PORT=9000`).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Top-level service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS origins; empty means allow any (development mode)
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Model and forecasting settings
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Path to the fitted SARIMAX model file
    #[serde(default = "default_model_path")]
    pub path: String,
    /// Fallback supply capacity when no region is requested
    #[serde(default = "default_capacity")]
    pub capacity_mld: f64,
    /// Upper bound on the forecast horizon
    #[serde(default = "default_max_days")]
    pub max_forecast_days: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_model_path() -> String {
    "models/sarimax_model.json".to_string()
}

fn default_capacity() -> f64 {
    demand_forecast::alerts::DEFAULT_CAPACITY_MLD
}

fn default_max_days() -> usize {
    90
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: Vec::new(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            capacity_mld: default_capacity(),
            max_forecast_days: default_max_days(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            model: ModelConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/water_api").required(false))
            .add_source(
                Environment::with_prefix("WATER_API")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}
