//! Green-zone table: building locations labelled by the clustering pass.

use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::DataError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GreenZonePoint {
    pub latitude: f64,
    pub longitude: f64,
    pub green_cluster: u32,
}

#[derive(Debug, Clone, Default)]
pub struct GreenZoneTable {
    points: Vec<GreenZonePoint>,
}

impl GreenZoneTable {
    pub fn new(points: Vec<GreenZonePoint>) -> Self {
        Self { points }
    }

    /// Load the clustering output. A missing file gives an empty table since the
    /// clustering tool may not have run yet.
    pub fn load(path: &Path) -> Result<Self, DataError> {
        match File::open(path) {
            Ok(file) => Self::from_reader(file, path),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Green-zone table {} not found, run the green_zones tool to create it", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(DataError::Io { path: path.to_path_buf(), source }),
        }
    }

    pub fn from_reader<R: Read>(reader: R, origin: &Path) -> Result<Self, DataError> {
        let points = csv::Reader::from_reader(reader)
            .deserialize()
            .collect::<Result<Vec<GreenZonePoint>, _>>()
            .map_err(|source| DataError::Csv { path: origin.to_path_buf(), source })?;
        Ok(Self { points })
    }

    pub fn points(&self) -> &[GreenZonePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Write points as `latitude,longitude,green_cluster`.
pub fn write_points<W: Write>(writer: W, points: &[GreenZonePoint]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for p in points {
        wtr.serialize(p)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn save_points(path: &Path, points: &[GreenZonePoint]) -> Result<(), DataError> {
    let file = File::create(path).map_err(|source| DataError::Io { path: path.to_path_buf(), source })?;
    write_points(file, points).map_err(|source| DataError::Csv { path: path.to_path_buf(), source })
}
