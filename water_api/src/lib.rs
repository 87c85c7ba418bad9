//! # Water API
//!
//! HTTP service for the Urban Water Insights project. Loads a pre-fit
//! SARIMAX demand model and serves scenario-adjusted forecasts with
//! capacity alerts.
//!
//! Endpoints:
//!
//! - `GET /health` - liveness check
//! - `GET /regions` - region catalog with capacities and default conditions
//! - `POST /forecast` - scenario-adjusted demand forecast with alerts

pub mod config;
pub mod error;
pub mod handlers;
pub mod regions;
pub mod routes;
pub mod state;

pub use crate::config::AppConfig;
pub use crate::error::ApiError;
pub use crate::state::AppState;
