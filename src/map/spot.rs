//! Spot encoding: one `u16` per grid cell holding a payload (port id or zero) and
//! three flag bits (`WATER`, `LAND`, `VISITED`) stacked directly above it.
//!
//! The payload width depends on how many ports have to be told apart, so the flag
//! positions are computed per run by [`BitLayout::for_port_count`]. Callers never
//! test raw bits; they go through the named predicates here.

use serde::Serialize;

use crate::error::{DistanceError, Result};

/// Bits in a [`Spot`].
pub const AVAILABLE_BITS: u32 = u16::BITS;

const FLAG_BITS: u32 = 3;

/// Raw encoded cell value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Spot(u16);

/// Decoded view of a spot, ignoring the visited overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpotKind {
    Land,
    Water,
    Port(u16),
}

/// Flag positions for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BitLayout {
    pub bits_for_port_ids: u32,
    pub water: u16,
    pub land: u16,
    pub visited: u16,
    pub flags: u16,
}

impl BitLayout {
    /// Size the payload for `num_ports` ports: bit length of the count plus one guard bit.
    /// Fails when the payload and the three flags do not fit in [`AVAILABLE_BITS`].
    pub fn for_port_count(num_ports: usize) -> Result<Self> {
        let bits_for_port_ids = (usize::BITS - num_ports.leading_zeros()) + 1;
        let needed = bits_for_port_ids + FLAG_BITS;
        if needed > AVAILABLE_BITS {
            return Err(DistanceError::TooFewBits {
                available: AVAILABLE_BITS,
                needed,
            });
        }

        let water = 1u16 << bits_for_port_ids;
        let land = water << 1;
        let visited = land << 1;
        Ok(Self {
            bits_for_port_ids,
            water,
            land,
            visited,
            flags: water | land | visited,
        })
    }

    /// Largest port id the payload can carry.
    pub fn max_port_id(&self) -> u16 {
        self.water - 1
    }

    pub fn water_spot(&self) -> Spot {
        Spot(self.water)
    }

    pub fn land_spot(&self) -> Spot {
        Spot(self.land)
    }

    /// Spot for a port entrance. The port replaces the water tag; it stays walkable
    /// because walkability only looks at the `LAND` flag.
    pub fn port_spot(&self, id: u16) -> Result<Spot> {
        if id == 0 || id > self.max_port_id() {
            return Err(DistanceError::PortIdTooLarge {
                id,
                max: self.max_port_id(),
            });
        }
        Ok(Spot(id))
    }

    pub fn with_visited(&self, spot: Spot) -> Spot {
        Spot(spot.0 | self.visited)
    }

    pub fn is_land(&self, spot: Spot) -> bool {
        spot.0 & self.land != 0
    }

    pub fn is_walkable(&self, spot: Spot) -> bool {
        !self.is_land(spot)
    }

    pub fn is_visited(&self, spot: Spot) -> bool {
        spot.0 & self.visited != 0
    }

    fn payload(&self, spot: Spot) -> u16 {
        spot.0 & !self.flags
    }

    /// Port id stored in a walkable cell, if any.
    pub fn port_id(&self, spot: Spot) -> Option<u16> {
        if self.is_land(spot) {
            return None;
        }
        match self.payload(spot) {
            0 => None,
            id => Some(id),
        }
    }

    pub fn kind(&self, spot: Spot) -> SpotKind {
        if self.is_land(spot) {
            SpotKind::Land
        } else if let Some(id) = self.port_id(spot) {
            SpotKind::Port(id)
        } else {
            SpotKind::Water
        }
    }
}
