/// Grid emission factor in kg CO₂ per kWh (Indian grid average).
pub const EMISSION_FACTOR: f64 = 0.82;

/// CO₂ avoided by generating `energy_kwh` on site, rounded to 2 decimals.
pub fn carbon_reduction_kg(energy_kwh: f64) -> f64 {
    crate::oracle::round_to(energy_kwh * EMISSION_FACTOR, 2)
}
