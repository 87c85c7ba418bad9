//! Capacity threshold alerts for forecasted demand

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Default supply capacity in megalitres per day
pub const DEFAULT_CAPACITY_MLD: f64 = 500.0;

/// Shortage alert for one forecasted day over capacity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortageAlert {
    /// Day of the forecast window, 1-based
    pub day: usize,
    /// Shortage above capacity in percent, rounded to 2 decimals
    pub shortage_pct: f64,
    /// Human-readable alert message
    pub message: String,
    /// Recommended mitigation action
    pub action: String,
}

/// Supply capacity against which forecasts are assessed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapacityPlan {
    /// Supply capacity in megalitres per day
    pub capacity_mld: f64,
}

impl CapacityPlan {
    /// Create a capacity plan
    pub fn new(capacity_mld: f64) -> Result<Self> {
        if capacity_mld <= 0.0 {
            return Err(ForecastError::InvalidParameter(
                "Capacity must be positive".to_string(),
            ));
        }
        Ok(Self { capacity_mld })
    }

    /// Assess forecasted demand values against the capacity
    ///
    /// Emits one alert per day whose demand exceeds capacity. Days at or
    /// under capacity produce nothing.
    pub fn assess(&self, forecast: &[f64]) -> Vec<ShortageAlert> {
        forecast
            .iter()
            .enumerate()
            .filter(|(_, value)| **value > self.capacity_mld)
            .map(|(i, value)| {
                let day = i + 1;
                let raw_pct = (value - self.capacity_mld) / self.capacity_mld * 100.0;
                let shortage_pct = (raw_pct * 100.0).round() / 100.0;

                ShortageAlert {
                    day,
                    shortage_pct,
                    message: format!("Shortage expected on Day {day}"),
                    action: format!(
                        "Increase supply by {}% or impose rationing in high-usage zones.",
                        format_shortage_pct(shortage_pct)
                    ),
                }
            })
            .collect()
    }
}

/// Render a shortage percentage with at least one decimal place, so a
/// whole-number shortage reads "10.0%" rather than "10%"
fn format_shortage_pct(pct: f64) -> String {
    let rendered = pct.to_string();
    if rendered.contains('.') {
        rendered
    } else {
        format!("{rendered}.0")
    }
}

impl Default for CapacityPlan {
    fn default() -> Self {
        Self {
            capacity_mld: DEFAULT_CAPACITY_MLD,
        }
    }
}
