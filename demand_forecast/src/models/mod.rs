//! Forecasting models for daily water demand

use crate::data::{CovariateFrame, DemandSeries};
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::fmt::Debug;

/// Forecast result containing predicted demand values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Forecasted values
    pub(crate) values: Vec<f64>,
    /// Number of days forecasted
    horizon: usize,
    /// Prediction intervals (optional)
    pub(crate) intervals: Option<Vec<(f64, f64)>>,
    /// Dates of the forecasted days (optional)
    pub(crate) dates: Option<Vec<NaiveDate>>,
}

impl ForecastResult {
    /// Create a new forecast result
    pub fn new(values: Vec<f64>, horizon: usize) -> Result<Self> {
        if values.len() != horizon {
            return Err(ForecastError::ValidationError(format!(
                "Values length ({}) doesn't match horizon ({})",
                values.len(),
                horizon
            )));
        }

        Ok(Self {
            values,
            horizon,
            intervals: None,
            dates: None,
        })
    }

    /// Create a new forecast result with prediction intervals
    pub fn new_with_intervals(
        values: Vec<f64>,
        horizon: usize,
        intervals: Vec<(f64, f64)>,
    ) -> Result<Self> {
        if values.len() != horizon {
            return Err(ForecastError::ValidationError(format!(
                "Values length ({}) doesn't match horizon ({})",
                values.len(),
                horizon
            )));
        }

        if values.len() != intervals.len() {
            return Err(ForecastError::ValidationError(format!(
                "Values length ({}) doesn't match intervals length ({})",
                values.len(),
                intervals.len()
            )));
        }

        Ok(Self {
            values,
            horizon,
            intervals: Some(intervals),
            dates: None,
        })
    }

    /// Attach forecast dates, consuming self
    pub fn with_dates(mut self, dates: Vec<NaiveDate>) -> Result<Self> {
        if dates.len() != self.horizon {
            return Err(ForecastError::ValidationError(format!(
                "Dates length ({}) doesn't match horizon ({})",
                dates.len(),
                self.horizon
            )));
        }
        self.dates = Some(dates);
        Ok(self)
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the number of days forecasted
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Get the prediction intervals, if available
    pub fn intervals(&self) -> Option<&[(f64, f64)]> {
        self.intervals.as_deref()
    }

    /// Get the forecast dates, if available
    pub fn dates(&self) -> Option<&[NaiveDate]> {
        self.dates.as_deref()
    }

    /// Calculate mean absolute error between forecast and actual values
    pub fn mean_absolute_error(&self, actual: &[f64]) -> Result<f64> {
        if self.values.len() != actual.len() {
            return Err(ForecastError::ValidationError(format!(
                "Forecast length ({}) doesn't match actual length ({})",
                self.values.len(),
                actual.len()
            )));
        }

        let sum: f64 = self
            .values
            .iter()
            .zip(actual.iter())
            .map(|(f, a)| (f - a).abs())
            .sum();

        Ok(sum / self.values.len() as f64)
    }

    /// Calculate mean squared error between forecast and actual values
    pub fn mean_squared_error(&self, actual: &[f64]) -> Result<f64> {
        if self.values.len() != actual.len() {
            return Err(ForecastError::ValidationError(format!(
                "Forecast length ({}) doesn't match actual length ({})",
                self.values.len(),
                actual.len()
            )));
        }

        let sum: f64 = self
            .values
            .iter()
            .zip(actual.iter())
            .map(|(f, a)| (f - a).powi(2))
            .sum();

        Ok(sum / self.values.len() as f64)
    }
}

/// Two-sided normal quantile for a confidence level in (0, 1)
pub(crate) fn normal_quantile(confidence_level: f64) -> Result<f64> {
    if confidence_level <= 0.0 || confidence_level >= 1.0 {
        return Err(ForecastError::ValidationError(
            "Confidence level must be between 0 and 1".to_string(),
        ));
    }

    let standard_normal = Normal::new(0.0, 1.0)
        .map_err(|e| ForecastError::MathError(format!("Standard normal: {e}")))?;

    Ok(standard_normal.inverse_cdf(0.5 + confidence_level / 2.0))
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Generate a demand forecast for future days given exogenous covariates
    ///
    /// `exog` must have exactly `horizon` rows, one per future day.
    fn forecast(&self, horizon: usize, exog: &CovariateFrame) -> Result<ForecastResult>;

    /// Predict in-sample values for observed data
    fn predict(&self, data: &DemandSeries) -> Result<ForecastResult>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on a demand series
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on a demand series
    fn train(&self, data: &DemandSeries) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// Check that an exogenous frame covers the requested horizon
pub(crate) fn check_exog_horizon(horizon: usize, exog: &CovariateFrame) -> Result<()> {
    if horizon == 0 {
        return Err(ForecastError::InvalidParameter(
            "Forecast horizon must be at least 1".to_string(),
        ));
    }

    if exog.len() != horizon {
        return Err(ForecastError::ValidationError(format!(
            "Exogenous frame has {} rows but horizon is {}",
            exog.len(),
            horizon
        )));
    }

    Ok(())
}

pub mod gradient_boosting;
pub mod sarimax;
