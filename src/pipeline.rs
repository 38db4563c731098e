//! End-to-end run: port snapshot + map image → sealed grid → searches → table file.

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::info;

use crate::config::AppConfig;
use crate::distances::{assemble, DistanceTable, UnreachablePolicy};
use crate::error::Result;
use crate::map::{load_map, BitLayout, Grid, PortPlacement, SpotKind, TonalAudit};
use crate::ports::{load_ports, Port};
use crate::search::{run_all, SourceRun};

/// Grid with ports placed and the border sealed, ready to search.
#[derive(Debug, Clone)]
pub struct PreparedMap {
    pub grid: Grid,
    pub placements: Vec<PortPlacement>,
    pub audit: TonalAudit,
}

#[derive(Debug, Clone, Serialize)]
pub struct DistanceReport {
    pub server_id: String,
    pub date: String,
    pub ports: usize,
    pub records: usize,
    pub unreachable_pairs: usize,
    pub incomplete_sources: Vec<u16>,
    pub elapsed_ms: u64,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapReport {
    pub map_file: PathBuf,
    pub width: u32,
    pub height: u32,
    pub scale: f64,
    pub row_offset: u32,
    pub layout: BitLayout,
    pub audit: TonalAudit,
    pub ports: usize,
    /// Ports whose entrance pixel is land in the source image.
    pub ports_on_land: Vec<u16>,
}

/// Size the spot payload so every port id fits, not just the port count.
pub fn layout_for(ports: &[Port]) -> Result<BitLayout> {
    let largest = ports.iter().map(|p| usize::from(p.id)).max().unwrap_or(0);
    let layout = BitLayout::for_port_count(largest.max(ports.len()))?;
    info!(
        ports = ports.len(),
        bits_for_port_ids = layout.bits_for_port_ids,
        water = layout.water,
        land = layout.land,
        visited = layout.visited,
        "spot layout"
    );
    Ok(layout)
}

fn ports_on_land(grid: &Grid, ports: &[Port], config: &AppConfig) -> Vec<u16> {
    ports
        .iter()
        .filter(|port| {
            let cell = config
                .projection
                .to_map_cell(port.entrance_position, grid.scale());
            grid.index_of(cell)
                .is_some_and(|index| grid.kind_at(index) == SpotKind::Land)
        })
        .map(|port| port.id)
        .collect()
}

/// Rasterize the map, place the ports and seal the border.
pub fn prepare_map(ports: &[Port], map_file: &Path, config: &AppConfig) -> Result<PreparedMap> {
    let layout = layout_for(ports)?;
    let raster = load_map(map_file, layout, &config.raster_options())?;
    let mut grid = raster.grid;
    let placements = grid.place_ports(ports, &config.projection)?;
    grid.seal_border();
    Ok(PreparedMap {
        grid,
        placements,
        audit: raster.audit,
    })
}

/// Search every source and assemble the table.
pub fn compute_table(
    prepared: &PreparedMap,
    parallel: bool,
    policy: UnreachablePolicy,
) -> Result<(DistanceTable, Vec<SourceRun>)> {
    let runs = run_all(&prepared.grid, &prepared.placements, parallel);
    let table = assemble(&runs, policy)?;
    Ok((table, runs))
}

/// Full run as configured, writing the table to the configured output file.
pub fn compute_distances(config: &AppConfig) -> Result<DistanceReport> {
    let started = Instant::now();
    let date = config.snapshot_date()?;
    let ports = load_ports(&config.api_dir(), &config.server_id, &date)?;
    info!(server = %config.server_id, %date, ports = ports.len(), "ports loaded");

    let prepared = prepare_map(&ports, &config.map_file(), config)?;
    let (table, runs) = config
        .worker_pool()
        .install(|| compute_table(&prepared, config.parallel, config.unreachable))??;

    let output = config.output_file();
    table.save(&output, config.output_format)?;

    let report = DistanceReport {
        server_id: config.server_id.clone(),
        date,
        ports: ports.len(),
        records: table.len(),
        unreachable_pairs: runs.iter().map(|r| r.missing.len()).sum(),
        incomplete_sources: runs
            .iter()
            .filter(|r| !r.is_complete())
            .map(|r| r.source)
            .collect(),
        elapsed_ms: started.elapsed().as_millis() as u64,
        output,
    };
    info!(
        records = report.records,
        unreachable_pairs = report.unreachable_pairs,
        elapsed_ms = report.elapsed_ms,
        output = %report.output.display(),
        "distance table written"
    );
    Ok(report)
}

/// Load the map and ports without searching, for checking new map art.
pub fn inspect_map(config: &AppConfig) -> Result<MapReport> {
    let date = config.snapshot_date()?;
    let ports = load_ports(&config.api_dir(), &config.server_id, &date)?;
    let layout = layout_for(&ports)?;
    let map_file = config.map_file();
    let raster = load_map(&map_file, layout, &config.raster_options())?;
    let grid = &raster.grid;

    Ok(MapReport {
        width: grid.width(),
        height: grid.height(),
        scale: grid.scale(),
        row_offset: grid.row_offset(),
        layout,
        audit: raster.audit,
        ports: ports.len(),
        ports_on_land: ports_on_land(grid, &ports, config),
        map_file,
    })
}
