use std::collections::{HashMap, VecDeque};

use port_distances::distances::{assemble, DistanceTable, UnreachablePolicy};
use port_distances::map::{MapCell, SpotKind};
use port_distances::pipeline::{compute_table, PreparedMap};
use port_distances::search::run_all;
use port_distances::synthetic::Archipelago;

fn crowded() -> PreparedMap {
    Archipelago {
        width: 96,
        height: 80,
        islands: 60,
        island_radius: 10,
        ports: 30,
        seed: 7,
    }
    .build()
    .expect("synthetic map")
}

/// Plain 8-way BFS over (row, column), independent of the packed index layout.
fn reference_distances(map: &PreparedMap, from: MapCell) -> HashMap<MapCell, u32> {
    let grid = &map.grid;
    let walkable = |cell: MapCell| {
        grid.index_of(cell)
            .is_some_and(|index| grid.kind_at(index) != SpotKind::Land)
    };

    let mut dist = HashMap::new();
    let mut queue = VecDeque::new();
    dist.insert(from, 0);
    queue.push_back(from);
    while let Some(cell) = queue.pop_front() {
        let d = dist[&cell];
        for dr in -1..=1 {
            for dc in -1..=1 {
                if dr == 0 && dc == 0 {
                    continue;
                }
                let next = MapCell::new(cell.row + dr, cell.column + dc);
                if walkable(next) && !dist.contains_key(&next) {
                    dist.insert(next, d + 1);
                    queue.push_back(next);
                }
            }
        }
    }
    dist
}

#[test]
fn table_matches_an_independent_flood_fill() {
    let map = crowded();
    let (table, _) = compute_table(&map, true, UnreachablePolicy::Omit).unwrap();

    for source in &map.placements {
        let reached = reference_distances(&map, source.cell);
        for target in map.placements.iter().filter(|p| p.id > source.id) {
            assert_eq!(
                table.get(source.id, target.id),
                reached.get(&target.cell).copied(),
                "pair {} -> {}",
                source.id,
                target.id
            );
        }
    }
}

#[test]
fn records_are_canonical_sorted_and_free_of_self_pairs() {
    let map = crowded();
    let (table, _) = compute_table(&map, false, UnreachablePolicy::Omit).unwrap();

    assert!(!table.is_empty());
    for record in table.iter() {
        assert!(record.from_port() < record.to_port(), "{record:?}");
    }
    let records = table.records();
    assert!(records.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn distances_respect_the_chebyshev_bound_and_triangle_inequality() {
    let map = crowded();
    let (table, _) = compute_table(&map, true, UnreachablePolicy::Omit).unwrap();
    let cells: HashMap<u16, MapCell> = map.placements.iter().map(|p| (p.id, p.cell)).collect();

    for record in table.iter() {
        let (a, b) = (cells[&record.from_port()], cells[&record.to_port()]);
        let bound = (a.row - b.row).abs().max((a.column - b.column).abs()) as u32;
        assert!(record.distance() >= bound, "{record:?} shorter than {bound}");
    }

    let ids: Vec<u16> = map.placements.iter().map(|p| p.id).collect();
    for &a in &ids {
        for &b in &ids {
            for &c in &ids {
                if let (Some(ab), Some(bc), Some(ac)) =
                    (table.get(a, b), table.get(b, c), table.get(a, c))
                {
                    assert!(ac <= ab + bc, "{a}->{c} = {ac} > {a}->{b}->{c} = {}", ab + bc);
                }
            }
        }
    }
}

#[test]
fn lookups_are_symmetric() {
    let map = crowded();
    let (table, _) = compute_table(&map, true, UnreachablePolicy::Omit).unwrap();

    for record in table.iter() {
        assert_eq!(table.get(record.to_port(), record.from_port()), Some(record.distance()));
    }
}

#[test]
fn zero_policy_covers_every_pair() {
    let map = crowded();
    let runs = run_all(&map.grid, &map.placements, true);
    let omitted = assemble(&runs, UnreachablePolicy::Omit).unwrap();
    let zeroed = assemble(&runs, UnreachablePolicy::Zero).unwrap();

    let n = map.placements.len();
    assert_eq!(zeroed.len(), n * (n - 1) / 2);
    let unreachable: usize = runs.iter().map(|r| r.missing.len()).sum();
    assert_eq!(zeroed.len() - omitted.len(), unreachable);
}

#[test]
fn repeated_runs_produce_the_same_table() {
    let map = Archipelago::default().build().unwrap();
    let first: DistanceTable = compute_table(&map, true, UnreachablePolicy::Omit).unwrap().0;
    for _ in 0..3 {
        let again = compute_table(&map, true, UnreachablePolicy::Omit).unwrap().0;
        assert_eq!(first, again);
    }
    assert_eq!(first.to_json().unwrap(), again_sequential(&map));
}

fn again_sequential(map: &PreparedMap) -> String {
    compute_table(map, false, UnreachablePolicy::Omit)
        .unwrap()
        .0
        .to_json()
        .unwrap()
}
