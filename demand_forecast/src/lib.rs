//! # Demand Forecast
//!
//! A Rust library for forecasting urban water demand from weather,
//! demographic and industrial-activity covariates.
//!
//! ## Features
//!
//! - Demand series handling (daily observations with exogenous covariates)
//! - Forecasting models (SARIMAX with exogenous regressors, Gradient Boosting)
//! - Scenario adjustments (heatwave, festival, population growth, industrial surge)
//! - Capacity threshold alerting with recommended actions
//! - Forecast accuracy metrics and chronological train/test splitting
//! - JSON persistence for fitted models
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use demand_forecast::data::DataLoader;
//! use demand_forecast::models::sarimax::SarimaxModel;
//! use demand_forecast::models::{ForecastModel, TrainedForecastModel};
//! use demand_forecast::scenario::{Conditions, Scenario};
//! use demand_forecast::alerts::CapacityPlan;
//!
//! # fn main() -> demand_forecast::error::Result<()> {
//! // Load data
//! let data = DataLoader::from_csv("data/water_ts_data.csv")?;
//!
//! // Fit the weekly-seasonal model the planning service uses
//! let model = SarimaxModel::daily()?;
//! let trained = model.train(&data)?;
//!
//! // Project a heatwave scenario over the next week
//! let conditions = Conditions {
//!     avg_temp: 30.0,
//!     rainfall: 5.0,
//!     population_index: 1.5,
//!     industrial_index: 1.2,
//! };
//! let exog = Scenario::heatwave().project(&conditions, 7)?;
//! let forecast = trained.forecast(7, &exog)?;
//!
//! // Flag days over capacity
//! let alerts = CapacityPlan::default().assess(forecast.values());
//! # Ok(())
//! # }
//! ```

pub mod alerts;
pub mod data;
pub mod error;
pub mod metrics;
pub mod models;
pub mod persist;
pub mod scenario;
pub mod utils;

// Re-export commonly used types
pub use crate::data::{CovariateFrame, DataLoader, DemandSeries, EXOG_COLUMNS};
pub use crate::error::ForecastError;
pub use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
