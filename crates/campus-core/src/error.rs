use std::path::PathBuf;

use thiserror::Error;

use crate::coords::BoundingBox;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegionError {
    #[error("Invalid region: {reason} ({bbox:?})")]
    InvalidRegion { reason: &'static str, bbox: BoundingBox },
}

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Missing column '{column}' in {path}")]
    MissingColumn { path: PathBuf, column: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClusterError {
    #[error("Cluster count must be at least 1")]
    ZeroClusters,

    #[error("Not enough points for {k} clusters: got {n}")]
    TooFewPoints { k: usize, n: usize },
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Training set is empty")]
    EmptyTrainingSet,

    #[error("Expected {expected} features, got {got}")]
    FeatureMismatch { expected: usize, got: usize },

    #[error("Failed to access model file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed model file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Model structure is invalid: {reason}")]
    InvalidModel { reason: String },

    #[error(transparent)]
    Data(#[from] DataError),
}
