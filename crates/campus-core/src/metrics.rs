//! Per-building dashboard figures.
//!
//! Readings are synthesised from the row index through the oracle, so the
//! same table always charts the same bars.

use serde::{Deserialize, Serialize};

use crate::buildings::BuildingTable;
use crate::carbon::carbon_reduction_kg;
use crate::oracle::{generate, round_to};

/// Buildings shown on each chart.
pub const CHART_LIMIT: usize = 8;

/// Daily solar yield range in kWh.
pub const SOLAR_YIELD_RANGE: (f64, f64) = (50.0, 150.0);
/// Energy range (kWh) fed into the carbon estimate.
pub const CARBON_ENERGY_RANGE: (f64, f64) = (40.0, 120.0);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarEstimate {
    pub building: String,
    pub predicted_energy_kwh: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonEstimate {
    pub building: String,
    pub carbon_saved_kg: f64,
}

fn index_value(index: usize, range: (f64, f64)) -> f64 {
    let i = index as f64;
    generate(i, i, range.0, range.1)
}

pub fn solar_estimates(table: &BuildingTable) -> Vec<SolarEstimate> {
    table
        .first(CHART_LIMIT)
        .iter()
        .enumerate()
        .map(|(i, b)| SolarEstimate {
            building: b.name.clone(),
            predicted_energy_kwh: round_to(index_value(i, SOLAR_YIELD_RANGE), 2),
        })
        .collect()
}

pub fn carbon_estimates(table: &BuildingTable) -> Vec<CarbonEstimate> {
    table
        .first(CHART_LIMIT)
        .iter()
        .enumerate()
        .map(|(i, b)| CarbonEstimate {
            building: b.name.clone(),
            carbon_saved_kg: carbon_reduction_kg(index_value(i, CARBON_ENERGY_RANGE)),
        })
        .collect()
}

/// Static advice list shown beside the charts.
pub const RECOMMENDATIONS: [&str; 4] = [
    "Optimize solar panel tilt to 23° on Main Block",
    "Plant 50 Neem trees in Zone A (North Campus)",
    "Implement automated HVAC controls in Library",
    "Install 15kW rooftop solar capacity on Hostel B",
];
