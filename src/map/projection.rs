//! World → map coordinate transform.
//!
//! The game world uses `(x, z)` positions; the map art uses pixel coordinates at
//! `map_size` resolution. The transform is a rotation/scale plus translation that
//! the site's other map layers share.

use serde::{Deserialize, Serialize};

use crate::ports::Position;

/// Affine coefficients: `map_x = a·x + b·z + c`, `map_y = b·x − a·z + d`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            a: -0.004_998_667_793_638_28,
            b: -0.000_000_214_642_549_806_45,
            c: 4_096.886_351_518_97,
            d: 4_096.902_827_874_69,
        }
    }
}

/// Integer grid position before the sentinel ring is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapCell {
    pub row: i64,
    pub column: i64,
}

impl MapCell {
    pub fn new(row: i64, column: i64) -> Self {
        Self { row, column }
    }
}

impl Projection {
    pub fn map_x(&self, position: Position) -> f64 {
        self.a * position.x + self.b * position.z + self.c
    }

    pub fn map_y(&self, position: Position) -> f64 {
        self.b * position.x - self.a * position.z + self.d
    }

    /// Project and scale to the raster resolution, truncating toward zero.
    pub fn to_map_cell(&self, position: Position, scale: f64) -> MapCell {
        MapCell {
            row: (self.map_y(position) * scale).trunc() as i64,
            column: (self.map_x(position) * scale).trunc() as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_origin_lands_near_map_centre() {
        let projection = Projection::default();
        let cell = projection.to_map_cell(Position { x: 0.0, z: 0.0 }, 1.0);
        assert_eq!(cell, MapCell::new(4096, 4096));

        let half = projection.to_map_cell(Position { x: 0.0, z: 0.0 }, 0.5);
        assert_eq!(half, MapCell::new(2048, 2048));
    }

    #[test]
    fn axes_follow_the_coefficients() {
        let projection = Projection {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 0.0,
        };
        let cell = projection.to_map_cell(Position { x: 3.7, z: -2.2 }, 1.0);
        assert_eq!(cell, MapCell::new(2, 3));
    }
}
