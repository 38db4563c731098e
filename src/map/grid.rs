//! Packed spot grid.
//!
//! The map raster is embedded in a grid with a one-cell sentinel ring on every side.
//! Rows are padded to a power-of-two stride so an index splits into row and column
//! with a shift and a mask:
//!
//! ```text
//! index = (row + 1) << row_offset | (column + 1)      row_offset = ceil(log2(width + 2))
//! ```
//!
//! The ring and the stride padding are land. [`Grid::seal_border`] also marks the
//! ring visited, so a search never expands into or past it and the eight neighbour
//! offsets can be applied to any walkable cell without a bounds check.

use std::collections::HashMap;

use tracing::warn;

use crate::error::{DistanceError, Result};
use crate::map::projection::{MapCell, Projection};
use crate::map::spot::{BitLayout, Spot, SpotKind};
use crate::ports::Port;

/// Where a port entrance ended up in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortPlacement {
    pub id: u16,
    pub cell: MapCell,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub struct Grid {
    cells: Vec<Spot>,
    layout: BitLayout,
    width: u32,
    height: u32,
    row_offset: u32,
    scale: f64,
    neighbour_offsets: [isize; 8],
    /// Earlier ports whose entrance pixel was taken by a later one.
    stacked: HashMap<usize, Vec<u16>>,
}

impl Grid {
    /// Build a grid for a `width`×`height` raster; `is_water(row, column)` classifies
    /// each pixel.
    pub fn from_fn<F>(width: u32, height: u32, scale: f64, layout: BitLayout, is_water: F) -> Self
    where
        F: Fn(u32, u32) -> bool,
    {
        let row_offset = (width + 2).next_power_of_two().trailing_zeros();
        let stride = 1usize << row_offset;
        let rows = height as usize + 2;
        let mut cells = vec![layout.land_spot(); stride * rows];

        for row in 0..height {
            let base = (row as usize + 1) << row_offset;
            for column in 0..width {
                cells[base + column as usize + 1] = if is_water(row, column) {
                    layout.water_spot()
                } else {
                    layout.land_spot()
                };
            }
        }

        let s = stride as isize;
        Self {
            cells,
            layout,
            width,
            height,
            row_offset,
            scale,
            neighbour_offsets: [-s - 1, -s, -s + 1, -1, 1, s - 1, s, s + 1],
            stacked: HashMap::new(),
        }
    }

    /// Build from text rows: `#` is land, anything else water. Scale is 1.
    pub fn from_pattern(rows: &[&str], layout: BitLayout) -> Self {
        let height = rows.len() as u32;
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as u32;
        let grid: Vec<Vec<bool>> = rows
            .iter()
            .map(|r| r.chars().map(|c| c != '#').collect())
            .collect();
        Self::from_fn(width, height, 1.0, layout, |row, column| {
            grid[row as usize]
                .get(column as usize)
                .copied()
                .unwrap_or(false)
        })
    }

    pub fn layout(&self) -> &BitLayout {
        &self.layout
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn row_offset(&self) -> u32 {
        self.row_offset
    }

    pub fn stride(&self) -> usize {
        1 << self.row_offset
    }

    pub fn neighbour_offsets(&self) -> &[isize; 8] {
        &self.neighbour_offsets
    }

    /// Number of cells including the sentinel ring and padding.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn spot(&self, index: usize) -> Spot {
        self.cells[index]
    }

    pub fn kind_at(&self, index: usize) -> SpotKind {
        self.layout.kind(self.cells[index])
    }

    /// Every port whose entrance is the cell at `index`, the one written into the
    /// spot first.
    pub fn ports_at(&self, index: usize) -> impl Iterator<Item = u16> + '_ {
        let stacked = self.stacked.get(&index).map(Vec::as_slice).unwrap_or(&[]);
        self.layout
            .port_id(self.cells[index])
            .into_iter()
            .chain(stacked.iter().copied())
    }

    /// Grid index of a raster cell, `None` when it lies outside the raster.
    pub fn index_of(&self, cell: MapCell) -> Option<usize> {
        let inside = (0..i64::from(self.height)).contains(&cell.row)
            && (0..i64::from(self.width)).contains(&cell.column);
        inside.then(|| ((cell.row as usize + 1) << self.row_offset) + cell.column as usize + 1)
    }

    /// Raster cell of a grid index, `None` for the sentinel ring and padding.
    pub fn cell_of(&self, index: usize) -> Option<MapCell> {
        let row = (index >> self.row_offset) as i64 - 1;
        let column = (index & (self.stride() - 1)) as i64 - 1;
        let cell = MapCell::new(row, column);
        self.index_of(cell).map(|_| cell)
    }

    /// Write `id` into the cell at `cell`.
    pub fn place_port(&mut self, id: u16, cell: MapCell) -> Result<usize> {
        let index = self
            .index_of(cell)
            .ok_or(DistanceError::PortOutsideMap {
                id,
                row: cell.row,
                column: cell.column,
                width: self.width,
                height: self.height,
            })?;
        let spot = self.layout.port_spot(id)?;

        match self.kind_at(index) {
            SpotKind::Port(other) if other != id => {
                warn!(
                    port = id,
                    other,
                    row = cell.row,
                    column = cell.column,
                    "port entrance shares a cell with another port"
                );
                self.stacked.entry(index).or_default().push(other);
            }
            SpotKind::Port(_) => {}
            SpotKind::Land => warn!(
                port = id,
                row = cell.row,
                column = cell.column,
                "port entrance sits on a land pixel"
            ),
            SpotKind::Water => {}
        }

        self.cells[index] = spot;
        Ok(index)
    }

    /// Project every port entrance onto the grid and tag its cell with the port id.
    pub fn place_ports(
        &mut self,
        ports: &[Port],
        projection: &Projection,
    ) -> Result<Vec<PortPlacement>> {
        let mut placements = Vec::with_capacity(ports.len());
        for port in ports {
            let cell = projection.to_map_cell(port.entrance_position, self.scale);
            let index = self.place_port(port.id, cell)?;
            placements.push(PortPlacement {
                id: port.id,
                cell,
                index,
            });
        }
        Ok(placements)
    }

    /// Mark the outermost ring of the grid visited.
    pub fn seal_border(&mut self) {
        let stride = self.stride();
        let last_row = self.height as usize + 1;
        let layout = self.layout;

        for row in [0, last_row] {
            for index in row * stride..(row + 1) * stride {
                self.cells[index] = layout.with_visited(self.cells[index]);
            }
        }
        for row in 1..last_row {
            let base = row * stride;
            for column in std::iter::once(0).chain(self.width as usize + 1..stride) {
                self.cells[base + column] = layout.with_visited(self.cells[base + column]);
            }
        }
    }

    /// Whether the base grid marks this cell permanently visited.
    pub fn is_sealed(&self, index: usize) -> bool {
        self.layout.is_visited(self.cells[index])
    }
}
