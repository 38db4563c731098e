//! Run every source search once sequentially and once in parallel on a synthetic
//! archipelago, then print timings and speedup.
//!
//! Usage: cargo run --release --bin benchmark_parallel_speedup [size] [ports]

use std::env;
use std::time::Instant;

use port_distances::distances::UnreachablePolicy;
use port_distances::pipeline::compute_table;
use port_distances::synthetic::Archipelago;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let size = args.next().and_then(|v| v.parse().ok()).unwrap_or(1024u32);
    let ports = args.next().and_then(|v| v.parse().ok()).unwrap_or(120usize);

    let map = Archipelago {
        width: size,
        height: size,
        islands: (size / 8) as usize,
        island_radius: (size / 40).max(2),
        ports,
        seed: 12345,
    }
    .build()?;

    println!(
        "Archipelago: {}x{} pixels, {} ports",
        size,
        size,
        map.placements.len()
    );
    println!();

    let t0 = Instant::now();
    let (table_seq, _) = compute_table(&map, false, UnreachablePolicy::Omit)?;
    let seq_ms = t0.elapsed().as_secs_f64() * 1000.0;
    println!("Sequential:  {:.2} ms  ({} records)", seq_ms, table_seq.len());

    let t0 = Instant::now();
    let (table_par, _) = compute_table(&map, true, UnreachablePolicy::Omit)?;
    let par_ms = t0.elapsed().as_secs_f64() * 1000.0;
    println!("Parallel:    {:.2} ms  ({} records)", par_ms, table_par.len());

    println!();
    println!("Speedup:     {:.2}x faster (parallel vs sequential)", seq_ms / par_ms);

    assert_eq!(table_seq, table_par, "parallel table differs from sequential");
    println!("(Tables match sequential vs parallel)");
    Ok(())
}
