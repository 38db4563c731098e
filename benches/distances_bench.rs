//! Compare sequential vs parallel source searches.
//!
//! Run with: `cargo bench --bench distances`
//! Or quick comparison: `cargo run --release --bin benchmark_parallel_speedup`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use port_distances::distances::UnreachablePolicy;
use port_distances::pipeline::compute_table;
use port_distances::synthetic::Archipelago;

fn bench_sources_sequential_vs_parallel(c: &mut Criterion) {
    let map = Archipelago {
        width: 512,
        height: 512,
        islands: 64,
        island_radius: 16,
        ports: 80,
        seed: 42,
    }
    .build()
    .expect("synthetic map");

    let mut group = c.benchmark_group("distances");
    group.sample_size(10);
    group.measurement_time(std::time::Duration::from_secs(10));

    group.bench_function("sequential", |b| {
        b.iter(|| black_box(compute_table(&map, false, UnreachablePolicy::Omit).unwrap()));
    });

    group.bench_function("parallel", |b| {
        b.iter(|| black_box(compute_table(&map, true, UnreachablePolicy::Omit).unwrap()));
    });

    group.finish();
}

fn bench_map_build(c: &mut Criterion) {
    c.bench_function("archipelago_build_1024", |b| {
        let params = Archipelago {
            width: 1024,
            height: 1024,
            ..Archipelago::default()
        };
        b.iter(|| black_box(params.build().unwrap()));
    });
}

criterion_group!(benches, bench_sources_sequential_vs_parallel, bench_map_build);
criterion_main!(benches);
