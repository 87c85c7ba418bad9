//! Integration tests for the HTTP API

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::{Duration, NaiveDate};
use demand_forecast::data::{CovariateFrame, DemandSeries};
use demand_forecast::models::sarimax::SarimaxModel;
use demand_forecast::models::ForecastModel;
use serde_json::json;
use water_api::config::AppConfig;
use water_api::handlers::forecast::ForecastResponse;
use water_api::regions::{self, Region};
use water_api::routes::create_router;
use water_api::state::AppState;

/// Synthetic demand history with a positive temperature effect
fn synthetic_series(days: usize) -> DemandSeries {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let dates: Vec<NaiveDate> = (0..days)
        .map(|i| start + Duration::days(i as i64))
        .collect();

    let mut demand = Vec::with_capacity(days);
    let mut columns = vec![Vec::with_capacity(days); 5];
    for i in 0..days {
        let temp = 28.0 + ((i % 7) as f64) * 0.8;
        let rain = ((i % 5) as f64) * 2.0;
        let festival = if i % 30 == 0 { 1.0 } else { 0.0 };
        let pop = 1.5 + i as f64 * 0.001;
        let ind = 1.2 + ((i % 11) as f64) * 0.01;

        columns[0].push(temp);
        columns[1].push(rain);
        columns[2].push(festival);
        columns[3].push(pop);
        columns[4].push(ind);
        demand.push(
            250.0 + 5.0 * temp - rain + 30.0 * festival + 50.0 * pop + 12.0 * ind
                + ((i * 31) % 7) as f64 * 0.5,
        );
    }

    let covariates = CovariateFrame::new(columns).unwrap();
    DemandSeries::new(dates, demand, covariates).unwrap()
}

fn test_server_with_config(config: AppConfig) -> TestServer {
    let data = synthetic_series(90);
    let model = SarimaxModel::daily().unwrap().train(&data).unwrap();
    let state = AppState::new(model, config, regions::catalog());
    TestServer::new(create_router(state)).unwrap()
}

fn test_server() -> TestServer {
    test_server_with_config(AppConfig::default())
}

fn forecast_request(days: usize) -> serde_json::Value {
    json!({
        "days": days,
        "avg_temp": 28.0,
        "rainfall": 2.0,
        "population_index": 1.5,
        "industrial_index": 1.2,
        "festival": 0,
        "heatwave": 0,
        "population_growth_pct": 0.0,
        "industrial_surge_pct": 0.0,
    })
}

#[tokio::test]
async fn health_returns_ok() {
    let server = test_server();
    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn regions_catalog_is_served() {
    let server = test_server();
    let response = server.get("/regions").await;

    response.assert_status_ok();
    let regions: Vec<Region> = response.json();
    assert_eq!(regions.len(), 4);
    assert!(regions.iter().any(|r| r.id == "mumbai"));
}

#[tokio::test]
async fn forecast_returns_requested_horizon() {
    let server = test_server();
    let response = server.post("/forecast").json(&forecast_request(7)).await;

    response.assert_status_ok();
    let body: ForecastResponse = response.json();

    assert_eq!(body.forecast.len(), 7);
    for value in &body.forecast {
        assert!(value.is_finite());
        assert!(*value >= 0.0);
        // Rounded to 2 decimals
        let scaled = value * 100.0;
        assert!((scaled - scaled.round()).abs() < 1e-6);
    }
    assert_eq!(body.alerts.len(), body.actions.len());
}

#[tokio::test]
async fn heatwave_increases_forecast() {
    let server = test_server();

    let baseline: ForecastResponse = server
        .post("/forecast")
        .json(&forecast_request(7))
        .await
        .json();

    let mut heatwave_request = forecast_request(7);
    heatwave_request["heatwave"] = json!(1);
    let heatwave: ForecastResponse = server
        .post("/forecast")
        .json(&heatwave_request)
        .await
        .json();

    let baseline_total: f64 = baseline.forecast.iter().sum();
    let heatwave_total: f64 = heatwave.forecast.iter().sum();
    assert!(
        heatwave_total > baseline_total,
        "heatwave {heatwave_total} vs baseline {baseline_total}"
    );
}

#[tokio::test]
async fn low_capacity_triggers_alerts() {
    let mut config = AppConfig::default();
    config.model.capacity_mld = 100.0;
    let server = test_server_with_config(config);

    let response = server.post("/forecast").json(&forecast_request(3)).await;
    response.assert_status_ok();
    let body: ForecastResponse = response.json();

    assert_eq!(body.alerts.len(), 3);
    assert_eq!(body.alerts[0], "Shortage expected on Day 1");
    assert!(body.actions[0].starts_with("Increase supply by"));
}

#[tokio::test]
async fn region_capacity_overrides_default() {
    // Mumbai's capacity (3850) is far above the synthetic demand, so the
    // same request that alerts under the 500 default goes quiet
    let mut config = AppConfig::default();
    config.model.capacity_mld = 100.0;
    let server = test_server_with_config(config);

    let mut request = forecast_request(3);
    request["region"] = json!("mumbai");
    let response = server.post("/forecast").json(&request).await;

    response.assert_status_ok();
    let body: ForecastResponse = response.json();
    assert!(body.alerts.is_empty());
}

#[tokio::test]
async fn unknown_region_is_not_found() {
    let server = test_server();

    let mut request = forecast_request(3);
    request["region"] = json!("atlantis");
    let response = server.post("/forecast").json(&request).await;

    response.assert_status_not_found();
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("atlantis"));
}

#[tokio::test]
async fn zero_days_rejected() {
    let server = test_server();
    let response = server.post("/forecast").json(&forecast_request(0)).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn oversized_horizon_rejected() {
    let server = test_server();
    let response = server.post("/forecast").json(&forecast_request(91)).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn invalid_flag_rejected() {
    let server = test_server();

    let mut request = forecast_request(7);
    request["heatwave"] = json!(2);
    let response = server.post("/forecast").json(&request).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn missing_fields_rejected() {
    let server = test_server();
    let response = server.post("/forecast").json(&json!({ "days": 7 })).await;
    assert!(response.status_code().is_client_error());
}
