//! SARIMAX model for daily water demand
//!
//! Seasonal ARIMA with exogenous regressors. Estimation is split in two
//! stages: ordinary least squares for the exogenous coefficients, then
//! Yule-Walker / moment estimates for the (seasonal) ARMA structure of the
//! regression residuals. Forecasts re-integrate the differenced residual
//! process and add the exogenous contribution for each future day.

use crate::data::{CovariateFrame, DemandSeries, EXOG_COLUMNS};
use crate::error::{ForecastError, Result};
use crate::models::{
    check_exog_horizon, normal_quantile, ForecastModel, ForecastResult, TrainedForecastModel,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default confidence level for prediction intervals
const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// SARIMAX model specification
#[derive(Debug, Clone)]
pub struct SarimaxModel {
    /// Name of the model
    name: String,
    /// Non-seasonal order (p, d, q)
    order: (usize, usize, usize),
    /// Seasonal order (P, D, Q, s)
    seasonal_order: (usize, usize, usize, usize),
    /// Confidence level for prediction intervals
    confidence_level: f64,
}

/// One differencing operation applied during fitting
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DiffOp {
    /// Lag of the difference (1 for regular, season length for seasonal)
    lag: usize,
}

/// Trained SARIMAX model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedSarimaxModel {
    /// Name of the model
    name: String,
    /// Non-seasonal order (p, d, q)
    order: (usize, usize, usize),
    /// Seasonal order (P, D, Q, s)
    seasonal_order: (usize, usize, usize, usize),
    /// Regression intercept
    intercept: f64,
    /// Exogenous regression coefficients, in [`EXOG_COLUMNS`] order
    exog_coefficients: Vec<f64>,
    /// AR coefficients
    ar_coefficients: Vec<f64>,
    /// Seasonal AR coefficients
    seasonal_ar_coefficients: Vec<f64>,
    /// MA coefficients
    ma_coefficients: Vec<f64>,
    /// Seasonal MA coefficients
    seasonal_ma_coefficients: Vec<f64>,
    /// Innovation standard deviation
    sigma: f64,
    /// Chain of progressively differenced residual series; first entry is
    /// the raw regression residuals, last entry is the fully differenced
    /// series the ARMA structure was fitted on
    diff_chain: Vec<Vec<f64>>,
    /// Differencing operations matching `diff_chain` transitions
    diff_ops: Vec<DiffOp>,
    /// Innovations of the fully differenced series
    innovations: Vec<f64>,
    /// One-step-ahead fitted values for the training data
    fitted_values: Vec<f64>,
    /// Last observed date of the training data
    last_date: Option<NaiveDate>,
    /// Confidence level for prediction intervals
    confidence_level: f64,
}

impl SarimaxModel {
    /// Create a new SARIMAX model with non-seasonal order (p, d, q)
    pub fn new(p: usize, d: usize, q: usize) -> Result<Self> {
        if p == 0 && q == 0 && d == 0 {
            return Err(ForecastError::InvalidParameter(
                "At least one of p, d, q must be non-zero".to_string(),
            ));
        }

        Ok(Self {
            name: format!("SARIMAX({},{},{})", p, d, q),
            order: (p, d, q),
            seasonal_order: (0, 0, 0, 0),
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
        })
    }

    /// Add a seasonal order (P, D, Q, s)
    pub fn with_seasonal(mut self, sp: usize, sd: usize, sq: usize, s: usize) -> Result<Self> {
        if (sp > 0 || sd > 0 || sq > 0) && s < 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "Season length must be at least 2, got {s}"
            )));
        }

        self.seasonal_order = (sp, sd, sq, s);
        self.name = format!(
            "SARIMAX({},{},{})({},{},{},{})",
            self.order.0, self.order.1, self.order.2, sp, sd, sq, s
        );
        Ok(self)
    }

    /// Set the confidence level for prediction intervals
    pub fn with_confidence_level(mut self, confidence_level: f64) -> Result<Self> {
        if confidence_level <= 0.0 || confidence_level >= 1.0 {
            return Err(ForecastError::InvalidParameter(
                "Confidence level must be between 0 and 1".to_string(),
            ));
        }
        self.confidence_level = confidence_level;
        Ok(self)
    }

    /// The configuration used for the daily demand trainer:
    /// SARIMAX(1,1,1)(1,1,1,7) with weekly seasonality
    pub fn daily() -> Result<Self> {
        Self::new(1, 1, 1)?.with_seasonal(1, 1, 1, 7)
    }

    /// Minimum number of observations required for this specification
    fn min_observations(&self) -> usize {
        let (p, d, q) = self.order;
        let (sp, sd, sq, s) = self.seasonal_order;
        let max_lag = p.max(q).max(sp * s).max(sq * s);
        // Exogenous columns plus intercept for the regression stage
        d + sd * s + max_lag + EXOG_COLUMNS.len() + 2
    }
}

impl ForecastModel for SarimaxModel {
    type Trained = TrainedSarimaxModel;

    fn train(&self, data: &DemandSeries) -> Result<TrainedSarimaxModel> {
        let y = data.demand_values();
        if y.len() < self.min_observations() {
            return Err(ForecastError::ValidationError(format!(
                "Insufficient data for {}. Need at least {} observations, got {}.",
                self.name,
                self.min_observations(),
                y.len()
            )));
        }

        let exog = data.covariates()?;

        // Stage 1: exogenous regression by ordinary least squares
        let (intercept, exog_coefficients) = fit_ols(&y, &exog)?;

        let residuals: Vec<f64> = y
            .iter()
            .zip(exog.rows())
            .map(|(value, row)| value - exog_contribution(intercept, &exog_coefficients, &row))
            .collect();

        // Stage 2: difference the residuals per the model orders
        let (_, d, _) = self.order;
        let (_, sd, _, s) = self.seasonal_order;

        let mut diff_ops = Vec::new();
        let mut diff_chain = vec![residuals];
        for _ in 0..d {
            let next = difference(diff_chain.last().unwrap(), 1);
            diff_chain.push(next);
            diff_ops.push(DiffOp { lag: 1 });
        }
        for _ in 0..sd {
            let next = difference(diff_chain.last().unwrap(), s);
            diff_chain.push(next);
            diff_ops.push(DiffOp { lag: s });
        }

        let w = diff_chain.last().unwrap().clone();

        // Stage 3: ARMA structure of the differenced residuals
        let (p, _, q) = self.order;
        let (sp, _, sq, _) = self.seasonal_order;

        let ar_coefficients = yule_walker(&w, p, 1)?;
        let seasonal_ar_coefficients = yule_walker(&w, sp, s)?;

        let innovations = compute_innovations(&w, &ar_coefficients, &seasonal_ar_coefficients, s);

        let ma_coefficients = moment_ma(&innovations, q, 1);
        let seasonal_ma_coefficients = moment_ma(&innovations, sq, s);

        let sigma = std_dev(&innovations);

        // One-step-ahead fitted values on the original scale
        let offset = y.len() - innovations.len();
        let mut fitted_values = Vec::with_capacity(y.len());
        for (i, value) in y.iter().enumerate() {
            if i < offset {
                let row = exog.row(i)?;
                fitted_values.push(exog_contribution(intercept, &exog_coefficients, &row));
            } else {
                fitted_values.push(value - innovations[i - offset]);
            }
        }

        Ok(TrainedSarimaxModel {
            name: self.name.clone(),
            order: self.order,
            seasonal_order: self.seasonal_order,
            intercept,
            exog_coefficients,
            ar_coefficients,
            seasonal_ar_coefficients,
            ma_coefficients,
            seasonal_ma_coefficients,
            sigma,
            diff_chain,
            diff_ops,
            innovations,
            fitted_values,
            last_date: data.last_date().ok(),
            confidence_level: self.confidence_level,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedForecastModel for TrainedSarimaxModel {
    fn forecast(&self, horizon: usize, exog: &CovariateFrame) -> Result<ForecastResult> {
        check_exog_horizon(horizon, exog)?;

        let w = self.diff_chain.last().ok_or_else(|| {
            ForecastError::ForecastingError("Model has no fitted residual series".to_string())
        })?;

        let s = self.seasonal_order.3;

        // Forecast the fully differenced residual process. Future
        // innovations are zero in expectation, so MA terms only reach back
        // into observed innovations.
        let e_len = self.innovations.len();
        let mut extended = w.clone();
        for h in 0..horizon {
            let t = extended.len();
            let mut value = 0.0;

            for (i, phi) in self.ar_coefficients.iter().enumerate() {
                if t > i {
                    value += phi * extended[t - 1 - i];
                }
            }
            for (j, phi) in self.seasonal_ar_coefficients.iter().enumerate() {
                let lag = (j + 1) * s;
                if t >= lag {
                    value += phi * extended[t - lag];
                }
            }
            for (j, theta) in self.ma_coefficients.iter().enumerate() {
                let lag = j + 1;
                if lag > h && e_len + h >= lag {
                    value += theta * self.innovations[e_len + h - lag];
                }
            }
            for (j, theta) in self.seasonal_ma_coefficients.iter().enumerate() {
                let lag = (j + 1) * s;
                if lag > h && e_len + h >= lag {
                    value += theta * self.innovations[e_len + h - lag];
                }
            }

            extended.push(value);
        }

        // Re-integrate through the differencing chain, last level first
        let mut forecast_level: Vec<f64> = extended[w.len()..].to_vec();
        for (depth, op) in self.diff_ops.iter().enumerate().rev() {
            let base = &self.diff_chain[depth];
            let mut integrated = base.clone();
            for value in &forecast_level {
                let t = integrated.len();
                let previous = if t >= op.lag {
                    integrated[t - op.lag]
                } else {
                    *integrated.last().unwrap_or(&0.0)
                };
                integrated.push(value + previous);
            }
            forecast_level = integrated[base.len()..].to_vec();
        }

        // Add the exogenous contribution and clamp at zero; demand is
        // non-negative by definition
        let z = normal_quantile(self.confidence_level)?;
        let mut values = Vec::with_capacity(horizon);
        let mut intervals = Vec::with_capacity(horizon);
        for (h, row) in exog.rows().enumerate() {
            let point = exog_contribution(self.intercept, &self.exog_coefficients, &row)
                + forecast_level[h];
            let point = point.max(0.0);

            // Interval width grows with the square root of the horizon
            let margin = z * self.sigma * ((h + 1) as f64).sqrt();
            values.push(point);
            intervals.push(((point - margin).max(0.0), point + margin));
        }

        let result = ForecastResult::new_with_intervals(values, horizon, intervals)?;
        match self.last_date {
            Some(last) => result.with_dates(
                (1..=horizon)
                    .map(|h| last + chrono::Duration::days(h as i64))
                    .collect(),
            ),
            None => Ok(result),
        }
    }

    fn predict(&self, data: &DemandSeries) -> Result<ForecastResult> {
        let y = data.demand_values();
        if y.is_empty() {
            return Err(ForecastError::DataError(
                "Empty demand series".to_string(),
            ));
        }

        // Training data: reuse the stored one-step-ahead fitted values.
        // Length alone is not enough; the stored innovations must actually
        // reproduce the observed values.
        let is_training_series = y.len() == self.fitted_values.len()
            && self
                .fitted_values
                .len()
                .checked_sub(self.innovations.len())
                .map_or(false, |offset| {
                    y.iter()
                        .skip(offset)
                        .zip(self.fitted_values.iter().skip(offset))
                        .zip(self.innovations.iter())
                        .all(|((value, fitted), e)| (value - fitted - e).abs() < 1e-9)
                });
        if is_training_series {
            return ForecastResult::new(self.fitted_values.clone(), y.len());
        }

        // Other data: exogenous regression only
        let exog = data.covariates()?;
        let predictions: Vec<f64> = exog
            .rows()
            .map(|row| exog_contribution(self.intercept, &self.exog_coefficients, &row))
            .collect();

        ForecastResult::new(predictions, y.len())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedSarimaxModel {
    /// Exogenous regression coefficients, in [`EXOG_COLUMNS`] order
    pub fn exog_coefficients(&self) -> &[f64] {
        &self.exog_coefficients
    }

    /// AR coefficients of the fitted model
    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar_coefficients
    }

    /// Innovation standard deviation
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Last observed date of the training data
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.last_date
    }
}

/// Exogenous contribution for one covariate row
fn exog_contribution(intercept: f64, coefficients: &[f64], row: &[f64; 5]) -> f64 {
    intercept
        + coefficients
            .iter()
            .zip(row.iter())
            .map(|(b, x)| b * x)
            .sum::<f64>()
}

/// Ordinary least squares of y on the covariates plus an intercept
fn fit_ols(y: &[f64], exog: &CovariateFrame) -> Result<(f64, Vec<f64>)> {
    let n = y.len();
    let k = EXOG_COLUMNS.len() + 1;

    if exog.len() != n {
        return Err(ForecastError::ValidationError(format!(
            "Demand values ({}) and covariates ({}) must have the same length",
            n,
            exog.len()
        )));
    }

    // Normal equations: (X'X) b = X'y
    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];

    for (i, row) in exog.rows().enumerate() {
        let mut x = [0.0; 6];
        x[0] = 1.0;
        x[1..].copy_from_slice(&row);

        for a in 0..k {
            xty[a] += x[a] * y[i];
            for b in 0..k {
                xtx[a][b] += x[a] * x[b];
            }
        }
    }

    let solution = solve_linear_system(xtx, xty)?;
    Ok((solution[0], solution[1..].to_vec()))
}

/// Solve a small dense linear system by Gaussian elimination with
/// partial pivoting
fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| {
                a[i][col]
                    .abs()
                    .partial_cmp(&a[j][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);

        if a[pivot_row][col].abs() < 1e-12 {
            return Err(ForecastError::MathError(
                "Singular system in least squares fit".to_string(),
            ));
        }

        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            for c in col..n {
                a[row][c] -= factor * a[col][c];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let mut sum = b[row];
        for c in (row + 1)..n {
            sum -= a[row][c] * x[c];
        }
        x[row] = sum / a[row][row];
    }

    Ok(x)
}

/// Difference a series at the given lag
fn difference(series: &[f64], lag: usize) -> Vec<f64> {
    if series.len() <= lag {
        return Vec::new();
    }
    series
        .iter()
        .skip(lag)
        .zip(series.iter())
        .map(|(current, lagged)| current - lagged)
        .collect()
}

/// Sample autocorrelation at the given lag
fn autocorrelation(series: &[f64], lag: usize) -> f64 {
    let n = series.len();
    if n <= lag || n < 2 {
        return 0.0;
    }

    let mean = series.iter().sum::<f64>() / n as f64;
    let variance: f64 = series.iter().map(|v| (v - mean).powi(2)).sum();
    if variance < 1e-12 {
        return 0.0;
    }

    let covariance: f64 = series
        .windows(lag + 1)
        .map(|window| (window[0] - mean) * (window[lag] - mean))
        .sum();

    covariance / variance
}

/// Yule-Walker estimation of `order` AR coefficients at multiples of
/// `lag_step` (1 for the regular AR part, the season length for the
/// seasonal AR part)
fn yule_walker(series: &[f64], order: usize, lag_step: usize) -> Result<Vec<f64>> {
    if order == 0 {
        return Ok(Vec::new());
    }

    // Degenerate series (constant, or shorter than the largest lag) carry
    // no AR structure
    if autocorrelation(series, 0) == 0.0 {
        return Ok(vec![0.0; order]);
    }

    let acf: Vec<f64> = (0..=order)
        .map(|i| autocorrelation(series, i * lag_step))
        .collect();

    // Toeplitz system R phi = r
    let mut r_matrix = vec![vec![0.0; order]; order];
    let mut r_vector = vec![0.0; order];
    for i in 0..order {
        r_vector[i] = acf[i + 1];
        for j in 0..order {
            r_matrix[i][j] = acf[i.abs_diff(j)];
        }
    }

    let mut coefficients = solve_linear_system(r_matrix, r_vector)?;

    // Shrink explosive estimates back inside the stationary region
    let total: f64 = coefficients.iter().map(|c| c.abs()).sum();
    if total >= 1.0 {
        for c in &mut coefficients {
            *c *= 0.98 / total;
        }
    }

    Ok(coefficients)
}

/// Innovations of the differenced series under the fitted AR structure
fn compute_innovations(
    series: &[f64],
    ar: &[f64],
    seasonal_ar: &[f64],
    season_length: usize,
) -> Vec<f64> {
    let max_lag = ar.len().max(seasonal_ar.len() * season_length);
    if series.len() <= max_lag {
        return series.to_vec();
    }

    (max_lag..series.len())
        .map(|t| {
            let mut expected = 0.0;
            for (i, phi) in ar.iter().enumerate() {
                expected += phi * series[t - 1 - i];
            }
            for (j, phi) in seasonal_ar.iter().enumerate() {
                expected += phi * series[t - (j + 1) * season_length];
            }
            series[t] - expected
        })
        .collect()
}

/// Moment estimate of MA coefficients from innovation autocorrelations
fn moment_ma(innovations: &[f64], order: usize, lag_step: usize) -> Vec<f64> {
    (1..=order)
        .map(|j| autocorrelation(innovations, j * lag_step).clamp(-0.98, 0.98))
        .collect()
}

/// Standard deviation of a series
fn std_dev(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    let mean = series.iter().sum::<f64>() / series.len() as f64;
    let variance =
        series.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / series.len() as f64;
    variance.sqrt()
}
