//! HTTP error mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use demand_forecast::ForecastError;
use serde_json::json;
use thiserror::Error;

/// Errors returned by the HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request failed validation
    #[error("{0}")]
    Validation(String),

    /// Requested region is not in the catalog
    #[error("Unknown region: {0}")]
    UnknownRegion(String),

    /// The forecasting library failed
    #[error("Forecast failed: {0}")]
    Forecast(#[from] ForecastError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::UnknownRegion(_) => StatusCode::NOT_FOUND,
            Self::Forecast(ForecastError::ValidationError(_))
            | Self::Forecast(ForecastError::InvalidParameter(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Forecast(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_unprocessable() {
        let error = ApiError::Validation("days must be at least 1".to_string());
        assert_eq!(error.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn unknown_region_maps_to_not_found() {
        let error = ApiError::UnknownRegion("atlantis".to_string());
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn model_failure_maps_to_server_error() {
        let error = ApiError::Forecast(ForecastError::MathError("singular".to_string()));
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn forecast_validation_maps_to_unprocessable() {
        let error =
            ApiError::Forecast(ForecastError::ValidationError("bad horizon".to_string()));
        assert_eq!(error.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
