//! Error taxonomy for the distance tool.
//! Everything here is fatal for a run; per-source reachability gaps are diagnostics
//! and only become [`DistanceError::UnreachablePorts`] under the `fail` policy.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DistanceError>;

#[derive(Debug, Error)]
pub enum DistanceError {
    #[error("failed to read port snapshot '{path}': {source}")]
    PortsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse port snapshot '{path}': {source}")]
    PortsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("port id {0} appears more than once in the snapshot")]
    DuplicatePortId(u16),

    #[error("invalid port id '{0}': expected a positive integer")]
    InvalidPortId(String),

    #[error("failed to decode map image '{path}': {source}")]
    MapDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("map image is {width}x{height}, need at least 1x1 pixels")]
    MapTooSmall { width: u32, height: u32 },

    #[error("map image has {count} pixels that are neither black nor white")]
    NotBiTonal { count: usize },

    #[error("too few bits: available {available} bits, needed {needed} bits")]
    TooFewBits { available: u32, needed: u32 },

    #[error("port {id} does not fit the spot payload (largest id is {max})")]
    PortIdTooLarge { id: u16, max: u16 },

    #[error("port {id} maps to ({row}, {column}) outside the {width}x{height} map")]
    PortOutsideMap {
        id: u16,
        row: i64,
        column: i64,
        width: u32,
        height: u32,
    },

    #[error("port {source_id} cannot reach ports {missing:?} by water")]
    UnreachablePorts { source_id: u16, missing: Vec<u16> },

    #[error("failed to read distance table '{path}': {source}")]
    TableRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse distance table '{path}': {source}")]
    TableParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write distance table '{path}': {source}")]
    TableWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize distance table: {0}")]
    TableSerialize(#[from] serde_json::Error),

    #[error("failed to write distance csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to read config '{path}': {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config '{path}': {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid snapshot date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
