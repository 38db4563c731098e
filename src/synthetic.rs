//! Seeded synthetic maps for benchmarks and property tests: open sea with square
//! islands and ports dropped on random water cells.
//! Deterministic: same parameters produce the same map.

use crate::error::Result;
use crate::map::{BitLayout, Grid, MapCell, PortPlacement, TonalAudit};
use crate::pipeline::PreparedMap;

const SPLITMIX64_GOLDEN: u64 = 0x9e3779b97f4a7c15;
const SPLITMIX64_M1: u64 = 0xbf58476d1ce4e5b9;
const SPLITMIX64_M2: u64 = 0x94d049bb133111eb;

/// SplitMix64. Not cryptographically secure.
#[derive(Debug, Clone, Copy)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(SPLITMIX64_GOLDEN);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(SPLITMIX64_M1);
        z = (z ^ (z >> 27)).wrapping_mul(SPLITMIX64_M2);
        z ^ (z >> 31)
    }

    /// Uniform-ish value in `0..bound`; `bound` must be non-zero.
    pub fn below(&mut self, bound: u32) -> u32 {
        (self.next_u64() % u64::from(bound)) as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Archipelago {
    pub width: u32,
    pub height: u32,
    pub islands: usize,
    /// Largest island half-width in pixels.
    pub island_radius: u32,
    pub ports: usize,
    pub seed: u64,
}

impl Default for Archipelago {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            islands: 40,
            island_radius: 12,
            ports: 60,
            seed: 42,
        }
    }
}

impl Archipelago {
    /// Build the map with ports `1..=ports` placed and the border sealed. Fewer
    /// ports are placed if the sea runs out of free cells.
    pub fn build(&self) -> Result<PreparedMap> {
        let (width, height) = (self.width.max(1), self.height.max(1));
        let mut rng = Rng::new(self.seed);
        let mut land = vec![false; width as usize * height as usize];

        for _ in 0..self.islands {
            let row = rng.below(height) as i64;
            let column = rng.below(width) as i64;
            let radius = 1 + rng.below(self.island_radius.max(1)) as i64;
            for r in (row - radius).max(0)..(row + radius).min(i64::from(height)) {
                for c in (column - radius).max(0)..(column + radius).min(i64::from(width)) {
                    land[r as usize * width as usize + c as usize] = true;
                }
            }
        }

        let layout = BitLayout::for_port_count(self.ports)?;
        let mut grid = Grid::from_fn(width, height, 1.0, layout, |row, column| {
            !land[row as usize * width as usize + column as usize]
        });

        let mut placements = Vec::with_capacity(self.ports);
        let mut attempts = 0;
        while placements.len() < self.ports && attempts < self.ports * 100 {
            attempts += 1;
            let cell = MapCell::new(i64::from(rng.below(height)), i64::from(rng.below(width)));
            let taken = land[cell.row as usize * width as usize + cell.column as usize]
                || placements.iter().any(|p: &PortPlacement| p.cell == cell);
            if taken {
                continue;
            }
            let id = placements.len() as u16 + 1;
            let index = grid.place_port(id, cell)?;
            placements.push(PortPlacement { id, cell, index });
        }

        grid.seal_border();
        Ok(PreparedMap {
            grid,
            placements,
            audit: TonalAudit {
                pixels: width as usize * height as usize,
                intermediate: 0,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::SpotKind;

    #[test]
    fn rng_is_deterministic() {
        let mut a = Rng::new(7);
        let mut b = Rng::new(7);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
        assert_ne!(Rng::new(1).next_u64(), Rng::new(2).next_u64());
    }

    #[test]
    fn ports_land_on_distinct_water_cells() {
        let map = Archipelago::default().build().unwrap();
        assert_eq!(map.placements.len(), 60);
        for placement in &map.placements {
            assert_eq!(map.grid.kind_at(placement.index), SpotKind::Port(placement.id));
        }
    }

    #[test]
    fn same_seed_same_map() {
        let a = Archipelago::default().build().unwrap();
        let b = Archipelago::default().build().unwrap();
        assert_eq!(a.placements, b.placements);
    }
}
