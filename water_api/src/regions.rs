//! Region catalog for regional planning
//!
//! Capacities and default conditions for the metropolitan regions the
//! planning dashboard knows about.

use demand_forecast::scenario::Conditions;
use serde::{Deserialize, Serialize};

/// A metropolitan region with its supply capacity and typical conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Stable identifier used in requests
    pub id: String,
    /// Display name
    pub name: String,
    /// Population in millions
    pub population_millions: f64,
    /// Supply capacity in megalitres per day
    pub capacity_mld: f64,
    /// Typical baseline conditions for the region
    pub default_conditions: Conditions,
}

/// Build the region catalog
pub fn catalog() -> Vec<Region> {
    vec![
        Region {
            id: "mumbai".to_string(),
            name: "Mumbai".to_string(),
            population_millions: 20.7,
            capacity_mld: 3850.0,
            default_conditions: Conditions {
                avg_temp: 28.0,
                rainfall: 15.0,
                population_index: 1.5,
                industrial_index: 1.8,
            },
        },
        Region {
            id: "delhi".to_string(),
            name: "Delhi".to_string(),
            population_millions: 32.9,
            capacity_mld: 5500.0,
            default_conditions: Conditions {
                avg_temp: 32.0,
                rainfall: 5.0,
                population_index: 2.0,
                industrial_index: 1.4,
            },
        },
        Region {
            id: "bengaluru".to_string(),
            name: "Bengaluru".to_string(),
            population_millions: 13.6,
            capacity_mld: 2100.0,
            default_conditions: Conditions {
                avg_temp: 26.0,
                rainfall: 10.0,
                population_index: 1.2,
                industrial_index: 1.6,
            },
        },
        Region {
            id: "chennai".to_string(),
            name: "Chennai".to_string(),
            population_millions: 11.5,
            capacity_mld: 1800.0,
            default_conditions: Conditions {
                avg_temp: 30.0,
                rainfall: 8.0,
                population_index: 1.1,
                industrial_index: 1.5,
            },
        },
    ]
}

/// Find a region by id
pub fn find<'a>(regions: &'a [Region], id: &str) -> Option<&'a Region> {
    regions.iter().find(|region| region.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_four_regions() {
        let regions = catalog();
        assert_eq!(regions.len(), 4);
        assert!(find(&regions, "mumbai").is_some());
        assert!(find(&regions, "atlantis").is_none());
    }

    #[test]
    fn capacities_are_positive() {
        for region in catalog() {
            assert!(region.capacity_mld > 0.0, "{}", region.id);
            assert!(region.population_millions > 0.0, "{}", region.id);
        }
    }
}
