//! Campus smart-energy core: synthetic readings, region scans, and the
//! data tables and models behind the dashboard.

pub mod buildings;
pub mod carbon;
pub mod coords;
pub mod error;
pub mod forest;
pub mod green_zones;
pub mod kmeans;
pub mod metrics;
pub mod oracle;
pub mod region;
pub mod solar_model;

pub use coords::{BoundingBox, LatLon};
pub use error::{ClusterError, DataError, ModelError, RegionError};
pub use oracle::generate;
pub use region::{analyze, GridPoint, Recommendation, RegionAnalysis, RegionSummary};
