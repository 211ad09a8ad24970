/// Geographic coordinate types for campus locations.
/// All coordinate math uses f64 for precision.

use serde::{Deserialize, Serialize};

/// A point in geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// An axis-aligned lat/lon rectangle, as drawn on the campus map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    pub fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Self {
        Self { lat_min, lat_max, lon_min, lon_max }
    }

    pub fn is_finite(&self) -> bool {
        [self.lat_min, self.lat_max, self.lon_min, self.lon_max]
            .iter()
            .all(|v| v.is_finite())
    }

    /// True when neither axis is inverted. Zero-width axes are ordered.
    pub fn is_ordered(&self) -> bool {
        self.lat_min <= self.lat_max && self.lon_min <= self.lon_max
    }

    /// True when at least one axis has zero width.
    pub fn is_degenerate(&self) -> bool {
        self.lat_min == self.lat_max || self.lon_min == self.lon_max
    }
}

/// Parse a `[lon, lat]` or `(lon, lat)` pair as exported by OpenStreetMap tooling.
///
/// Quotes and whitespace around the pair are ignored. Extra components after the
/// first two are allowed (e.g. an altitude) but must still be numeric.
pub fn parse_coordinate_pair(raw: &str) -> Option<LatLon> {
    let trimmed = raw.trim().trim_matches(|c| c == '"' || c == '\'').trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .or_else(|| trimmed.strip_prefix('(').and_then(|s| s.strip_suffix(')')))?;

    let parts: Vec<f64> = inner
        .split(',')
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;

    if parts.len() < 2 {
        return None;
    }
    Some(LatLon::new(parts[1], parts[0]))
}
