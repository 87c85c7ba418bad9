//! Demand series handling for forecasting

use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Exogenous regressor columns, in the order the models expect them
pub const EXOG_COLUMNS: [&str; 5] = [
    "avg_temp",
    "rainfall",
    "festival",
    "population_index",
    "industrial_index",
];

/// Column-major frame of exogenous regressor values
///
/// Columns follow [`EXOG_COLUMNS`] order. Every column has the same length,
/// one entry per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CovariateFrame {
    columns: Vec<Vec<f64>>,
}

impl CovariateFrame {
    /// Create a frame from column-major data in [`EXOG_COLUMNS`] order
    pub fn new(columns: Vec<Vec<f64>>) -> Result<Self> {
        if columns.len() != EXOG_COLUMNS.len() {
            return Err(ForecastError::ValidationError(format!(
                "Expected {} covariate columns, got {}",
                EXOG_COLUMNS.len(),
                columns.len()
            )));
        }

        let len = columns[0].len();
        if columns.iter().any(|c| c.len() != len) {
            return Err(ForecastError::ValidationError(
                "Covariate columns must all have the same length".to_string(),
            ));
        }

        Ok(Self { columns })
    }

    /// Create a frame by repeating a single row `n` times
    ///
    /// This mirrors how forecast requests work: one set of adjusted
    /// conditions is assumed to hold for every day of the horizon.
    pub fn replicate(row: [f64; 5], n: usize) -> Self {
        Self {
            columns: row.iter().map(|v| vec![*v; n]).collect(),
        }
    }

    /// Number of rows (days) in the frame
    pub fn len(&self) -> usize {
        self.columns[0].len()
    }

    /// Check if the frame has no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get a column by name, if it is one of [`EXOG_COLUMNS`]
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        EXOG_COLUMNS
            .iter()
            .position(|c| *c == name)
            .map(|i| self.columns[i].as_slice())
    }

    /// Get the values of row `i` in [`EXOG_COLUMNS`] order
    pub fn row(&self, i: usize) -> Result<[f64; 5]> {
        if i >= self.len() {
            return Err(ForecastError::ValidationError(format!(
                "Row index {} out of bounds for frame of length {}",
                i,
                self.len()
            )));
        }

        let mut row = [0.0; 5];
        for (j, col) in self.columns.iter().enumerate() {
            row[j] = col[i];
        }
        Ok(row)
    }

    /// Iterate over rows in [`EXOG_COLUMNS`] order
    pub fn rows(&self) -> impl Iterator<Item = [f64; 5]> + '_ {
        (0..self.len()).map(|i| {
            let mut row = [0.0; 5];
            for (j, col) in self.columns.iter().enumerate() {
                row[j] = col[i];
            }
            row
        })
    }
}

/// Observed daily water demand with exogenous covariates
#[derive(Debug, Clone)]
pub struct DemandSeries {
    /// Data frame containing the observed series
    df: DataFrame,
    /// Name of the date column
    date_column: String,
    /// Name of the demand column
    demand_column: String,
}

/// Data loader for demand series
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a demand series from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<DemandSeries> {
        let file = File::open(path)?;
        // Use polars DataFrame reader directly
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::detect_and_create_series(df)
    }

    /// Create a demand series from an existing DataFrame
    pub fn from_dataframe(df: DataFrame) -> Result<DemandSeries> {
        Self::detect_and_create_series(df)
    }

    /// Detect date and demand columns and validate covariates
    fn detect_and_create_series(df: DataFrame) -> Result<DemandSeries> {
        if df.height() == 0 {
            return Err(ForecastError::DataError(
                "Demand series is empty".to_string(),
            ));
        }

        let date_column = Self::detect_date_column(&df)?;
        let demand_column = Self::detect_demand_column(&df)?;
        Self::validate_covariates(&df)?;

        Ok(DemandSeries {
            df,
            date_column,
            demand_column,
        })
    }

    /// Detect the date column in a DataFrame
    fn detect_date_column(df: &DataFrame) -> Result<String> {
        let column_names = df.get_column_names();

        // Look for common date column names
        for name in &column_names {
            let lower_name = name.to_lowercase();
            if lower_name.contains("date") || lower_name.contains("time") {
                return Ok(name.to_string());
            }
        }

        // If not found, use the first column if it looks like a date
        if let Some(first_col) = df.get_columns().first() {
            if first_col.dtype().is_temporal() {
                return Ok(first_col.name().to_string());
            }
        }

        Err(ForecastError::DataError(
            "No date column found in data".to_string(),
        ))
    }

    /// Detect the demand column in a DataFrame
    fn detect_demand_column(df: &DataFrame) -> Result<String> {
        let column_names = df.get_column_names();

        for name in &column_names {
            if name.to_lowercase().contains("demand") {
                return Ok(name.to_string());
            }
        }

        Err(ForecastError::DataError(
            "No demand column found in data".to_string(),
        ))
    }

    /// Check that every exogenous regressor column is present
    fn validate_covariates(df: &DataFrame) -> Result<()> {
        let column_names = df.get_column_names();

        let missing: Vec<&str> = EXOG_COLUMNS
            .iter()
            .filter(|required| !column_names.iter().any(|name| name == *required))
            .copied()
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ForecastError::DataError(format!(
                "Missing covariate columns: {}",
                missing.join(", ")
            )))
        }
    }
}

impl DemandSeries {
    /// Create a demand series from dates, demand values and covariates
    pub fn new(
        dates: Vec<NaiveDate>,
        demand: Vec<f64>,
        covariates: CovariateFrame,
    ) -> Result<Self> {
        if dates.len() != demand.len() || dates.len() != covariates.len() {
            return Err(ForecastError::ValidationError(format!(
                "Dates ({}), demand ({}) and covariates ({}) must have the same length",
                dates.len(),
                demand.len(),
                covariates.len()
            )));
        }

        if dates.is_empty() {
            return Err(ForecastError::DataError(
                "Demand series is empty".to_string(),
            ));
        }

        let date_series = Series::new(
            "date",
            dates
                .iter()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .collect::<Vec<String>>(),
        );
        let demand_series = Series::new("water_demand", demand);

        let mut columns = vec![date_series, demand_series];
        for name in EXOG_COLUMNS {
            let values = covariates
                .column(name)
                .ok_or_else(|| {
                    ForecastError::DataError(format!("Missing covariate column: {name}"))
                })?
                .to_vec();
            columns.push(Series::new(name, values));
        }

        let df = DataFrame::new(columns)?;

        Ok(Self {
            df,
            date_column: "date".to_string(),
            demand_column: "water_demand".to_string(),
        })
    }

    /// Get the underlying DataFrame
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Get the date column name
    pub fn date_column(&self) -> &str {
        &self.date_column
    }

    /// Get the demand column name
    pub fn demand_column(&self) -> &str {
        &self.demand_column
    }

    /// Get the observed demand values as a vector
    pub fn demand_values(&self) -> Vec<f64> {
        self.column_as_f64(&self.demand_column).unwrap_or_default()
    }

    /// Get the exogenous covariates as a frame
    pub fn covariates(&self) -> Result<CovariateFrame> {
        let mut columns = Vec::with_capacity(EXOG_COLUMNS.len());
        for name in EXOG_COLUMNS {
            columns.push(self.column_as_f64(name)?);
        }
        CovariateFrame::new(columns)
    }

    /// Get the observation dates as a vector
    pub fn dates(&self) -> Vec<NaiveDate> {
        let col = match self.df.column(&self.date_column) {
            Ok(col) => col,
            Err(_) => return Vec::new(),
        };

        match col.dtype() {
            DataType::Utf8 => col
                .utf8()
                .unwrap()
                .into_iter()
                .flatten()
                .filter_map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
                .collect(),
            DataType::Date => col
                .date()
                .unwrap()
                .into_iter()
                .flatten()
                .filter_map(|days| {
                    NaiveDate::from_ymd_opt(1970, 1, 1)
                        .unwrap()
                        .checked_add_days(chrono::Days::new(days as u64))
                })
                .collect(),
            DataType::Datetime(_, _) => col
                .datetime()
                .unwrap()
                .into_iter()
                .flatten()
                .filter_map(|ts| {
                    chrono::NaiveDateTime::from_timestamp_opt(
                        ts / 1_000_000_000,
                        (ts % 1_000_000_000) as u32,
                    )
                    .map(|dt| dt.date())
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Get the last observation date
    pub fn last_date(&self) -> Result<NaiveDate> {
        self.dates()
            .last()
            .copied()
            .ok_or_else(|| ForecastError::DataError("No parseable dates in series".to_string()))
    }

    /// Get the calendar month (1-12) of each observation
    pub fn months(&self) -> Vec<u32> {
        // Prefer an explicit month column when the dataset carries one
        if let Ok(values) = self.column_as_f64("month") {
            return values.iter().map(|m| *m as u32).collect();
        }

        self.dates().iter().map(|d| d.month()).collect()
    }

    /// Get a slice of the series from start to end index
    pub fn slice(&self, start: usize, end: Option<usize>) -> Result<Self> {
        let end = end.unwrap_or(self.df.height());
        let sliced_df = self.df.slice(start as i64, end - start);

        Ok(DemandSeries {
            df: sliced_df,
            date_column: self.date_column.clone(),
            demand_column: self.demand_column.clone(),
        })
    }

    /// Helper method to get a column as f64 values
    fn column_as_f64(&self, column_name: &str) -> Result<Vec<f64>> {
        let col = self.df.column(column_name).map_err(|e| {
            ForecastError::DataError(format!("Column '{}' not found: {}", column_name, e))
        })?;

        match col.dtype() {
            DataType::Float64 => Ok(col.f64().unwrap().into_iter().flatten().collect()),
            DataType::Float32 => Ok(col
                .f32()
                .unwrap()
                .into_iter()
                .flatten()
                .map(|v| v as f64)
                .collect()),
            DataType::Int64 => Ok(col
                .i64()
                .unwrap()
                .into_iter()
                .flatten()
                .map(|v| v as f64)
                .collect()),
            DataType::Int32 => Ok(col
                .i32()
                .unwrap()
                .into_iter()
                .flatten()
                .map(|v| v as f64)
                .collect()),
            DataType::UInt64 => Ok(col
                .u64()
                .unwrap()
                .into_iter()
                .flatten()
                .map(|v| v as f64)
                .collect()),
            DataType::UInt32 => Ok(col
                .u32()
                .unwrap()
                .into_iter()
                .flatten()
                .map(|v| v as f64)
                .collect()),
            _ => Err(ForecastError::DataError(format!(
                "Column '{}' cannot be converted to f64",
                column_name
            ))),
        }
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Get the length of the series
    pub fn len(&self) -> usize {
        self.df.height()
    }

    /// Calculate the mean of the demand values
    pub fn mean(&self) -> Result<f64> {
        let demand = self.demand_values();
        if demand.is_empty() {
            return Err(ForecastError::DataError(
                "No demand values available".to_string(),
            ));
        }

        let sum: f64 = demand.iter().sum();
        Ok(sum / demand.len() as f64)
    }

    /// Calculate the standard deviation of the demand values
    pub fn std_dev(&self) -> Result<f64> {
        let demand = self.demand_values();
        if demand.is_empty() {
            return Err(ForecastError::DataError(
                "No demand values available".to_string(),
            ));
        }

        let mean = self.mean()?;
        let variance: f64 = demand
            .iter()
            .map(|value| (value - mean).powi(2))
            .sum::<f64>()
            / demand.len() as f64;

        Ok(variance.sqrt())
    }
}
