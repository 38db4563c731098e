//! Sailing distances between ports.
//!
//! Reads a server's port snapshot and the black/white frontline map, floods the
//! map from every port and writes the pixel distance of every connected port pair
//! as a sorted `[from, to, distance]` table.

pub mod cli;
pub mod config;
pub mod distances;
pub mod error;
pub mod logging;
pub mod map;
pub mod parallel;
pub mod pipeline;
pub mod ports;
pub mod search;
pub mod synthetic;
pub mod time;

pub use error::{DistanceError, Result};
