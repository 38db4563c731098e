//! Multi-target breadth-first search over the spot grid.
//!
//! Sources run in ascending port id order and each one only records ports with a
//! larger id, so every unordered pair is measured exactly once. A search stops as
//! soon as every higher-id port has been found, or when the flood fill runs out of
//! water. Steps are uniform (one pixel, eight-connected), so BFS order is shortest
//! path order.

use std::collections::VecDeque;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::distances::DistanceRecord;
use crate::map::{Grid, PortPlacement};

pub mod visited;

pub use visited::VisitedSet;

/// A port that starts a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePort {
    pub id: u16,
    pub index: usize,
}

impl From<&PortPlacement> for SourcePort {
    fn from(placement: &PortPlacement) -> Self {
        Self {
            id: placement.id,
            index: placement.index,
        }
    }
}

/// Outcome of one source search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRun {
    pub source: u16,
    pub records: Vec<DistanceRecord>,
    /// Higher-id ports the flood fill never reached, ascending.
    pub missing: Vec<u16>,
    /// Cells taken off the queue.
    pub expanded: usize,
}

impl SourceRun {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Search from `source` until every id in `targets` is found or the reachable water
/// is exhausted. `targets` holds the ids greater than the source.
pub fn find_paths(
    grid: &Grid,
    source: SourcePort,
    targets: &[u16],
    visited: &mut VisitedSet,
) -> SourceRun {
    let layout = grid.layout();
    let offsets = grid.neighbour_offsets();

    visited.clear();
    visited.insert(source.index);

    let mut queue = VecDeque::from([(source.index, 0u32)]);
    let mut records = Vec::with_capacity(targets.len());
    let mut expanded = 0;

    while records.len() < targets.len() {
        let Some((index, distance)) = queue.pop_front() else {
            break;
        };
        expanded += 1;

        for port in grid.ports_at(index) {
            if port > source.id {
                records.push(DistanceRecord(source.id, port, distance));
            }
        }

        for offset in offsets {
            let neighbour = index.wrapping_add_signed(*offset);
            debug_assert!(neighbour < grid.len());
            if layout.is_walkable(grid.spot(neighbour))
                && !grid.is_sealed(neighbour)
                && visited.insert(neighbour)
            {
                queue.push_back((neighbour, distance + 1));
            }
        }
    }

    let missing = if records.len() < targets.len() {
        let mut found: Vec<u16> = records.iter().map(DistanceRecord::to_port).collect();
        found.sort_unstable();
        targets
            .iter()
            .copied()
            .filter(|id| found.binary_search(id).is_err())
            .collect()
    } else {
        Vec::new()
    };

    SourceRun {
        source: source.id,
        records,
        missing,
        expanded,
    }
}

/// Run one search per placed port, in ascending id order. With `parallel` the
/// searches are spread over the current rayon pool, each worker with its own
/// visited overlay; the result order is the same either way.
pub fn run_all(grid: &Grid, placements: &[PortPlacement], parallel: bool) -> Vec<SourceRun> {
    let mut sources: Vec<SourcePort> = placements.iter().map(SourcePort::from).collect();
    sources.sort_unstable_by_key(|s| s.id);
    let ids: Vec<u16> = sources.iter().map(|s| s.id).collect();
    let total = sources.len();

    let run_one = |visited: &mut VisitedSet, position: usize| {
        let source = sources[position];
        let started = Instant::now();
        let run = find_paths(grid, source, &ids[position + 1..], visited);

        if run.is_complete() {
            info!(
                source = source.id,
                found = run.records.len(),
                expanded = run.expanded,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "source complete"
            );
        } else {
            warn!(
                source = source.id,
                found = run.records.len() + position + 1,
                total,
                missing = ?run.missing,
                "only part of the ports found"
            );
        }
        run
    };

    if parallel {
        (0..total)
            .into_par_iter()
            .map_init(|| VisitedSet::new(grid.len()), run_one)
            .collect()
    } else {
        let mut visited = VisitedSet::new(grid.len());
        (0..total).map(|position| run_one(&mut visited, position)).collect()
    }
}
