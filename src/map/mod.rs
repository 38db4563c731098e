//! Spatial index: spot encoding, the packed grid, PNG rasterization and the
//! world → map projection.

pub mod grid;
pub mod projection;
pub mod raster;
pub mod spot;

pub use grid::{Grid, PortPlacement};
pub use projection::{MapCell, Projection};
pub use raster::{load_map, rasterize, RasterMap, RasterOptions, TonalAudit};
pub use spot::{BitLayout, Spot, SpotKind, AVAILABLE_BITS};
