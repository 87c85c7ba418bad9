//! # Urban Water Insights
//!
//! Workspace umbrella crate for the Urban Water Insights project.
//!
//! The interesting pieces live in the member crates:
//!
//! - [`demand_forecast`] - water demand forecasting models, scenario
//!   adjustments, and capacity alerting
//! - `water_api` - the HTTP service that serves forecasts
//!
//! ## Example
//!
//! ```
//! use water_insights_workspace::Scenario;
//!
//! let scenario = Scenario::heatwave();
//! assert!(scenario.heatwave);
//! ```

pub use demand_forecast::alerts::{CapacityPlan, ShortageAlert};
pub use demand_forecast::scenario::{Conditions, Scenario};
pub use demand_forecast::{DataLoader, DemandSeries, ForecastError, ForecastResult};
