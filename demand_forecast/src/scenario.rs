//! Scenario adjustments for forecast requests
//!
//! A forecast request carries baseline conditions plus optional what-if
//! toggles: a heatwave bumps temperature, growth percentages scale the
//! population and industrial indices, and festivals switch the festival
//! regressor on. The adjusted row is held constant over the whole horizon.

use crate::data::CovariateFrame;
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Temperature multiplier applied under a heatwave scenario
pub const HEATWAVE_TEMP_FACTOR: f64 = 1.15;

/// Baseline conditions for the forecast window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    /// Average temperature in degrees Celsius
    pub avg_temp: f64,
    /// Rainfall in millimetres
    pub rainfall: f64,
    /// Population index relative to the reference year
    pub population_index: f64,
    /// Industrial activity index relative to the reference year
    pub industrial_index: f64,
}

/// What-if adjustments applied on top of baseline conditions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Heatwave in effect over the forecast window
    pub heatwave: bool,
    /// Festival period in effect over the forecast window
    pub festival: bool,
    /// Population growth in percent
    pub population_growth_pct: f64,
    /// Industrial activity surge in percent
    pub industrial_surge_pct: f64,
}

impl Scenario {
    /// Scenario with no adjustments
    pub fn baseline() -> Self {
        Self {
            heatwave: false,
            festival: false,
            population_growth_pct: 0.0,
            industrial_surge_pct: 0.0,
        }
    }

    /// Scenario with only the heatwave toggle set
    pub fn heatwave() -> Self {
        Self {
            heatwave: true,
            ..Self::baseline()
        }
    }

    /// Check that the percentage adjustments are meaningful
    pub fn validate(&self) -> Result<()> {
        if self.population_growth_pct <= -100.0 {
            return Err(ForecastError::InvalidParameter(
                "Population growth must be greater than -100%".to_string(),
            ));
        }
        if self.industrial_surge_pct <= -100.0 {
            return Err(ForecastError::InvalidParameter(
                "Industrial surge must be greater than -100%".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply the scenario to baseline conditions, producing one covariate
    /// row in [`crate::data::EXOG_COLUMNS`] order
    pub fn apply(&self, conditions: &Conditions) -> [f64; 5] {
        let avg_temp = if self.heatwave {
            conditions.avg_temp * HEATWAVE_TEMP_FACTOR
        } else {
            conditions.avg_temp
        };
        let population = conditions.population_index * (1.0 + self.population_growth_pct / 100.0);
        let industrial = conditions.industrial_index * (1.0 + self.industrial_surge_pct / 100.0);
        let festival = if self.festival { 1.0 } else { 0.0 };

        [
            avg_temp,
            conditions.rainfall,
            festival,
            population,
            industrial,
        ]
    }

    /// Build the exogenous frame for a forecast: the adjusted conditions
    /// replicated over every day of the horizon
    pub fn project(&self, conditions: &Conditions, horizon: usize) -> Result<CovariateFrame> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be at least 1".to_string(),
            ));
        }
        self.validate()?;

        Ok(CovariateFrame::replicate(self.apply(conditions), horizon))
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::baseline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conditions() -> Conditions {
        Conditions {
            avg_temp: 30.0,
            rainfall: 10.0,
            population_index: 1.5,
            industrial_index: 1.2,
        }
    }

    #[test]
    fn baseline_scenario_changes_nothing() {
        let row = Scenario::baseline().apply(&conditions());
        assert_eq!(row, [30.0, 10.0, 0.0, 1.5, 1.2]);
    }

    #[test]
    fn heatwave_bumps_temperature() {
        let row = Scenario::heatwave().apply(&conditions());
        assert!((row[0] - 34.5).abs() < 1e-10);
        assert_eq!(row[1], 10.0);
    }

    #[test]
    fn growth_percentages_scale_indices() {
        let scenario = Scenario {
            population_growth_pct: 10.0,
            industrial_surge_pct: 25.0,
            ..Scenario::baseline()
        };
        let row = scenario.apply(&conditions());
        assert!((row[3] - 1.65).abs() < 1e-10);
        assert!((row[4] - 1.5).abs() < 1e-10);
    }

    #[test]
    fn festival_flag_sets_regressor() {
        let scenario = Scenario {
            festival: true,
            ..Scenario::baseline()
        };
        assert_eq!(scenario.apply(&conditions())[2], 1.0);
    }

    #[test]
    fn project_replicates_over_horizon() {
        let frame = Scenario::baseline().project(&conditions(), 7).unwrap();
        assert_eq!(frame.len(), 7);
        assert_eq!(frame.row(0).unwrap(), frame.row(6).unwrap());
    }

    #[test]
    fn project_rejects_zero_horizon() {
        assert!(Scenario::baseline().project(&conditions(), 0).is_err());
    }

    #[test]
    fn validate_rejects_total_collapse() {
        let scenario = Scenario {
            population_growth_pct: -100.0,
            ..Scenario::baseline()
        };
        assert!(scenario.validate().is_err());
    }
}
