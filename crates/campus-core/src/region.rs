//! Region grid-scan classifier.
//!
//! A bounding box drawn on the map is split into a 6×6 grid. Each cell center
//! gets a synthetic irradiance and surface temperature from the oracle and is
//! labelled for solar, trees or building; the labels are then tallied into a
//! single recommendation for the whole region.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coords::{BoundingBox, LatLon};
use crate::error::RegionError;
use crate::oracle::{generate, round_to};

// ── Constants ────────────────────────────────────────────────────────────────

/// Cells per axis.
pub const GRID_DIVISIONS: usize = 6;

/// Irradiance range in kWh/m²/day.
pub const IRRADIANCE_RANGE: (f64, f64) = (2.0, 9.0);
/// Surface temperature range in °C.
pub const TEMPERATURE_RANGE: (f64, f64) = (25.0, 45.0);

/// Cells above this irradiance are marked for solar.
pub const SOLAR_IRRADIANCE_THRESHOLD: f64 = 6.0;
/// Cells above this temperature (and not solar) are marked for trees.
pub const TREE_TEMPERATURE_THRESHOLD: f64 = 32.0;

/// "Equivalent trees" credited per TREE cell.
pub const TREES_PER_CELL: u32 = 5;

pub const NO_DATA_RECOMMENDATION: &str = "No data";

// ── Types ────────────────────────────────────────────────────────────────────

/// Land-use label for a single grid cell.
///
/// Variant order is the tie-break priority when picking the dominant label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Solar,
    Tree,
    Build,
}

impl Recommendation {
    pub const ALL: [Recommendation; 3] = [Self::Solar, Self::Tree, Self::Build];

    /// Classify a cell: irradiance first, then heat, otherwise building.
    pub fn classify(irradiance: f64, temperature: f64) -> Self {
        if irradiance > SOLAR_IRRADIANCE_THRESHOLD {
            Self::Solar
        } else if temperature > TREE_TEMPERATURE_THRESHOLD {
            Self::Tree
        } else {
            Self::Build
        }
    }

    /// Dashboard wording for a region dominated by this label.
    pub fn headline(self) -> &'static str {
        match self {
            Self::Solar => "☀️ Optimal for Solar Farm (High Irradiance)",
            Self::Tree => "🌳 Recommended for Green Zone (Heat Reduction)",
            Self::Build => "🏗️ Suitable for Infrastructure/Building",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Solar => 0,
            Self::Tree => 1,
            Self::Build => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub lat: f64,
    pub lon: f64,
    pub recommendation: Recommendation,
}

/// Per-label cell counts for one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCounts([u32; 3]);

impl CategoryCounts {
    pub fn record(&mut self, rec: Recommendation) {
        self.0[rec.index()] += 1;
    }

    pub fn get(&self, rec: Recommendation) -> u32 {
        self.0[rec.index()]
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    /// Label with the highest count; ties go to the earlier label in
    /// [`Recommendation::ALL`]. `None` when nothing was counted.
    pub fn dominant(&self) -> Option<Recommendation> {
        if self.total() == 0 {
            return None;
        }
        let mut best = Recommendation::ALL[0];
        for rec in Recommendation::ALL.into_iter().skip(1) {
            if self.get(rec) > self.get(best) {
                best = rec;
            }
        }
        Some(best)
    }
}

/// Wire summary of a region scan. Field names are part of the HTTP contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
    /// Sum (not mean) of irradiance over SOLAR cells, 1 decimal.
    pub avg_solar: f64,
    /// TREE cells × [`TREES_PER_CELL`].
    pub tree_count: u32,
    /// BUILD cell count, 1 decimal.
    pub build_score: f64,
    pub main_rec: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionAnalysis {
    pub grid_points: Vec<GridPoint>,
    pub summary: RegionSummary,
    #[serde(skip)]
    pub counts: CategoryCounts,
}

impl RegionAnalysis {
    pub fn dominant(&self) -> Option<Recommendation> {
        self.counts.dominant()
    }
}

// ── Scan ─────────────────────────────────────────────────────────────────────

/// Centers of the cells along one axis.
///
/// The cursor advances by repeated addition and stops on a strict `< max`, so
/// float drift may drop the last cell on some ranges.
fn cell_centers(min: f64, max: f64) -> Vec<f64> {
    let step = (max - min) / GRID_DIVISIONS as f64;
    let mut centers = Vec::with_capacity(GRID_DIVISIONS);
    let mut cursor = min + step / 2.0;
    while cursor < max {
        centers.push(cursor);
        cursor += step;
    }
    centers
}

/// The step must move the cursor at the largest magnitude on the axis,
/// otherwise the scan never terminates.
fn axis_resolvable(min: f64, max: f64) -> bool {
    if min == max {
        return true;
    }
    let step = (max - min) / GRID_DIVISIONS as f64;
    let anchor = min.abs().max(max.abs());
    step.is_finite() && anchor + step > anchor
}

fn validate(bbox: &BoundingBox) -> Result<(), RegionError> {
    let invalid = |reason| Err(RegionError::InvalidRegion { reason, bbox: *bbox });

    if !bbox.is_finite() {
        return invalid("bounds must be finite");
    }
    if !bbox.is_ordered() {
        return invalid("minimum exceeds maximum");
    }
    if !axis_resolvable(bbox.lat_min, bbox.lat_max) || !axis_resolvable(bbox.lon_min, bbox.lon_max) {
        return invalid("range too small to subdivide");
    }
    Ok(())
}

/// Evaluate one cell center.
pub fn classify_cell(center: LatLon) -> (Recommendation, f64) {
    let irradiance = generate(center.lat, center.lon, IRRADIANCE_RANGE.0, IRRADIANCE_RANGE.1);
    let temperature = generate(center.lat, center.lon, TEMPERATURE_RANGE.0, TEMPERATURE_RANGE.1);
    (Recommendation::classify(irradiance, temperature), irradiance)
}

/// Scan a bounding box and aggregate the per-cell labels.
///
/// Non-finite or inverted boxes are rejected. A zero-width axis is valid and
/// yields an empty grid with a "No data" summary.
pub fn analyze(bbox: &BoundingBox) -> Result<RegionAnalysis, RegionError> {
    validate(bbox)?;

    let (rows, cols) = if bbox.is_degenerate() {
        debug!("Zero-width region {bbox:?}, no cells to scan");
        (Vec::new(), Vec::new())
    } else {
        (cell_centers(bbox.lat_min, bbox.lat_max), cell_centers(bbox.lon_min, bbox.lon_max))
    };

    let mut grid_points = Vec::with_capacity(rows.len() * cols.len());
    let mut counts = CategoryCounts::default();
    let mut total_solar = 0.0;

    for &lat in &rows {
        for &lon in &cols {
            let (recommendation, irradiance) = classify_cell(LatLon::new(lat, lon));
            if recommendation == Recommendation::Solar {
                total_solar += irradiance;
            }
            counts.record(recommendation);
            grid_points.push(GridPoint { lat, lon, recommendation });
        }
    }

    let main_rec = counts
        .dominant()
        .map_or(NO_DATA_RECOMMENDATION, Recommendation::headline)
        .to_string();

    let summary = RegionSummary {
        avg_solar: round_to(total_solar, 1),
        tree_count: counts.get(Recommendation::Tree) * TREES_PER_CELL,
        build_score: round_to(counts.get(Recommendation::Build) as f64, 1),
        main_rec,
    };

    Ok(RegionAnalysis { grid_points, summary, counts })
}
