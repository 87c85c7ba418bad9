//! Forecast endpoint
//!
//! Applies the requested scenario to the baseline conditions, forecasts
//! demand with the pre-fit model, and assesses the result against the
//! supply capacity.

use axum::extract::State;
use axum::Json;
use demand_forecast::alerts::CapacityPlan;
use demand_forecast::scenario::{Conditions, Scenario};
use demand_forecast::TrainedForecastModel;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::regions;
use crate::state::AppState;

/// Forecast request body
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastRequest {
    /// Number of days to forecast
    pub days: usize,
    /// Average temperature in degrees Celsius
    pub avg_temp: f64,
    /// Rainfall in millimetres
    pub rainfall: f64,
    /// Population index relative to the reference year
    pub population_index: f64,
    /// Industrial activity index relative to the reference year
    pub industrial_index: f64,
    /// Festival period over the window (0 or 1)
    #[serde(default)]
    pub festival: u8,
    /// Heatwave over the window (0 or 1)
    #[serde(default)]
    pub heatwave: u8,
    /// Population growth scenario in percent
    #[serde(default)]
    pub population_growth_pct: f64,
    /// Industrial surge scenario in percent
    #[serde(default)]
    pub industrial_surge_pct: f64,
    /// Optional region id; selects that region's supply capacity
    #[serde(default)]
    pub region: Option<String>,
}

/// Forecast response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResponse {
    /// Forecasted demand per day, rounded to 2 decimals
    pub forecast: Vec<f64>,
    /// Alert messages for days over capacity
    pub alerts: Vec<String>,
    /// Recommended actions matching the alerts
    pub actions: Vec<String>,
}

impl ForecastRequest {
    fn validate(&self, max_days: usize) -> Result<(), ApiError> {
        if self.days == 0 {
            return Err(ApiError::Validation(
                "days must be at least 1".to_string(),
            ));
        }
        if self.days > max_days {
            return Err(ApiError::Validation(format!(
                "days must be at most {max_days}"
            )));
        }
        if self.festival > 1 || self.heatwave > 1 {
            return Err(ApiError::Validation(
                "festival and heatwave flags must be 0 or 1".to_string(),
            ));
        }
        Ok(())
    }

    fn conditions(&self) -> Conditions {
        Conditions {
            avg_temp: self.avg_temp,
            rainfall: self.rainfall,
            population_index: self.population_index,
            industrial_index: self.industrial_index,
        }
    }

    fn scenario(&self) -> Scenario {
        Scenario {
            heatwave: self.heatwave == 1,
            festival: self.festival == 1,
            population_growth_pct: self.population_growth_pct,
            industrial_surge_pct: self.industrial_surge_pct,
        }
    }
}

/// POST /forecast
pub async fn forecast(
    State(state): State<AppState>,
    Json(request): Json<ForecastRequest>,
) -> Result<Json<ForecastResponse>, ApiError> {
    request.validate(state.config.model.max_forecast_days)?;

    let capacity_mld = match &request.region {
        Some(id) => {
            regions::find(&state.regions, id)
                .ok_or_else(|| ApiError::UnknownRegion(id.clone()))?
                .capacity_mld
        }
        None => state.config.model.capacity_mld,
    };

    let exog = request
        .scenario()
        .project(&request.conditions(), request.days)?;
    let result = state.model.forecast(request.days, &exog)?;

    let response = build_response(result.values(), capacity_mld)?;

    tracing::info!(
        days = request.days,
        region = request.region.as_deref().unwrap_or("-"),
        alerts = response.alerts.len(),
        "Forecast served"
    );

    Ok(Json(response))
}

/// Assess the raw predictions against capacity, then round the reported
/// values to 2 decimals
fn build_response(raw: &[f64], capacity_mld: f64) -> Result<ForecastResponse, ApiError> {
    let shortage_alerts = CapacityPlan::new(capacity_mld)?.assess(raw);

    let forecast = raw.iter().map(|v| (v * 100.0).round() / 100.0).collect();
    let alerts = shortage_alerts.iter().map(|a| a.message.clone()).collect();
    let actions = shortage_alerts.iter().map(|a| a.action.clone()).collect();

    Ok(ForecastResponse {
        forecast,
        alerts,
        actions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ForecastRequest {
        ForecastRequest {
            days: 7,
            avg_temp: 28.0,
            rainfall: 2.0,
            population_index: 1.5,
            industrial_index: 1.2,
            festival: 0,
            heatwave: 0,
            population_growth_pct: 0.0,
            industrial_surge_pct: 0.0,
            region: None,
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(request().validate(90).is_ok());
    }

    #[test]
    fn zero_days_rejected() {
        let mut req = request();
        req.days = 0;
        assert!(req.validate(90).is_err());
    }

    #[test]
    fn oversized_horizon_rejected() {
        let mut req = request();
        req.days = 91;
        assert!(req.validate(90).is_err());
    }

    #[test]
    fn flags_must_be_binary() {
        let mut req = request();
        req.heatwave = 2;
        assert!(req.validate(90).is_err());
    }

    #[test]
    fn scenario_mapping() {
        let mut req = request();
        req.heatwave = 1;
        req.festival = 1;
        req.population_growth_pct = 5.0;

        let scenario = req.scenario();
        assert!(scenario.heatwave);
        assert!(scenario.festival);
        assert_eq!(scenario.population_growth_pct, 5.0);
    }

    #[test]
    fn alerts_assess_raw_predictions() {
        // 500.004 rounds down to the capacity, but the raw value is over it
        let response = build_response(&[500.004, 480.0], 500.0).unwrap();

        assert_eq!(response.forecast, vec![500.0, 480.0]);
        assert_eq!(response.alerts, vec!["Shortage expected on Day 1".to_string()]);
        assert_eq!(response.actions.len(), 1);
    }

    #[test]
    fn optional_fields_default() {
        let req: ForecastRequest = serde_json::from_str(
            r#"{"days":7,"avg_temp":28.0,"rainfall":2.0,"population_index":1.5,"industrial_index":1.2}"#,
        )
        .unwrap();
        assert_eq!(req.festival, 0);
        assert_eq!(req.heatwave, 0);
        assert_eq!(req.population_growth_pct, 0.0);
        assert!(req.region.is_none());
    }
}
