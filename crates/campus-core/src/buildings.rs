//! Campus building table loaded from the OpenStreetMap export.
//!
//! The dashboard only needs the `name` column; the `coordinates` column
//! (`[lon, lat]`) feeds the offline clustering pass. Everything else in the
//! export is ignored.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use tracing::warn;

use crate::coords::{parse_coordinate_pair, LatLon};
use crate::error::DataError;

pub const NAME_COLUMN: &str = "name";
pub const COORDINATES_COLUMN: &str = "coordinates";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Building {
    pub name: String,
}

/// Column positions resolved from the header row.
struct Columns {
    name: Option<usize>,
    coordinates: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Self {
        let find = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
        Self { name: find(NAME_COLUMN), coordinates: find(COORDINATES_COLUMN) }
    }
}

/// Read-only building table shared by the HTTP handlers.
#[derive(Debug, Clone, Default)]
pub struct BuildingTable {
    buildings: Vec<Building>,
}

impl BuildingTable {
    pub fn new(buildings: Vec<Building>) -> Self {
        Self { buildings }
    }

    /// Load from disk. A missing file gives an empty table; anything else that
    /// goes wrong is an error.
    pub fn load(path: &Path) -> Result<Self, DataError> {
        match File::open(path) {
            Ok(file) => Self::from_reader(file, path),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Building table {} not found, starting with no buildings", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(DataError::Io { path: path.to_path_buf(), source }),
        }
    }

    /// Parse CSV from any reader; `origin` is only used in error messages.
    pub fn from_reader<R: Read>(reader: R, origin: &Path) -> Result<Self, DataError> {
        let csv_err = |source| DataError::Csv { path: origin.to_path_buf(), source };

        let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
        let columns = Columns::resolve(rdr.headers().map_err(csv_err)?);

        let mut buildings = Vec::new();
        for (index, record) in rdr.records().enumerate() {
            let record = record.map_err(csv_err)?;
            // Only blank names are backfilled; anything else is kept verbatim.
            let name = columns
                .name
                .and_then(|i| record.get(i))
                .filter(|n| !n.trim().is_empty())
                .map_or_else(|| format!("Building {}", index + 1), str::to_string);
            buildings.push(Building { name });
        }

        Ok(Self { buildings })
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    /// Up to `n` leading rows, in file order.
    pub fn first(&self, n: usize) -> &[Building] {
        &self.buildings[..n.min(self.buildings.len())]
    }
}

/// Valid points from the `coordinates` column, for the clustering pass.
///
/// Unlike [`BuildingTable::load`], the file and the column are both required.
pub fn load_coordinate_points(path: &Path) -> Result<Vec<LatLon>, DataError> {
    let file = File::open(path).map_err(|source| DataError::Io { path: path.to_path_buf(), source })?;
    let csv_err = |source| DataError::Csv { path: PathBuf::from(path), source };

    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(file);
    let idx = Columns::resolve(rdr.headers().map_err(csv_err)?)
        .coordinates
        .ok_or_else(|| DataError::MissingColumn {
            path: path.to_path_buf(),
            column: COORDINATES_COLUMN.to_string(),
        })?;

    let mut points = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(csv_err)?;
        if let Some(ll) = record.get(idx).and_then(parse_coordinate_pair) {
            points.push(ll);
        }
    }
    Ok(points)
}
