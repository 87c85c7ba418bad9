//! Utility functions for the demand_forecast crate

use crate::data::DemandSeries;
use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate};

/// Split a demand series chronologically into training and test sets
///
/// The test set is the trailing `test_ratio` share of the series. Demand
/// data is ordered in time, so the split never shuffles.
pub fn train_test_split(data: &DemandSeries, test_ratio: f64) -> Result<(DemandSeries, DemandSeries)> {
    if test_ratio <= 0.0 || test_ratio >= 1.0 {
        return Err(ForecastError::InvalidParameter(format!(
            "Test ratio must be between 0 and 1, got {test_ratio}"
        )));
    }

    let test_size = (data.len() as f64 * test_ratio).round() as usize;
    if test_size == 0 || test_size >= data.len() {
        return Err(ForecastError::ValidationError(format!(
            "Series of length {} cannot be split with ratio {}",
            data.len(),
            test_ratio
        )));
    }

    let train_size = data.len() - test_size;
    let train = data.slice(0, Some(train_size))?;
    let test = data.slice(train_size, None)?;

    Ok((train, test))
}

/// Create future dates for forecasting, one per day after `last_date`
pub fn future_dates(last_date: NaiveDate, horizon: usize) -> Vec<NaiveDate> {
    (1..=horizon)
        .map(|h| last_date + Duration::days(h as i64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn future_dates_are_consecutive() {
        let last = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
        let dates = future_dates(last, 3);
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
            ]
        );
    }
}
