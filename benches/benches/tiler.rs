// Copyright 2025 the Geotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use geotile_index::{GeoBounds, GeoCoordinates, TileIndex};
use geotile_tiler::{
    ItemMarkerTiler, ItemProvider, MarkerTiler, MemoryProvider, ModelEvent, NonEmptyIterator,
};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_uniform_points(count: usize, seed: u64) -> Vec<GeoCoordinates> {
    let mut rng = Rng::new(seed);
    (0..count)
        .map(|_| GeoCoordinates::new(rng.next_f64() * 180.0 - 90.0, rng.next_f64() * 360.0 - 180.0))
        .collect()
}

/// Points around a few cities, the shape of a typical photo collection.
fn gen_clustered_points(per_city: usize, spread: f64, seed: u64) -> Vec<GeoCoordinates> {
    const CITIES: [(f64, f64); 5] = [
        (48.85, 2.35),
        (40.71, -74.0),
        (35.68, 139.69),
        (-33.86, 151.21),
        (-22.9, -43.2),
    ];
    let mut rng = Rng::new(seed);
    let mut out = Vec::with_capacity(CITIES.len() * per_city);
    for (lat, lon) in CITIES {
        for _ in 0..per_city {
            out.push(GeoCoordinates::new(
                lat + (rng.next_f64() - 0.5) * spread,
                lon + (rng.next_f64() - 0.5) * spread,
            ));
        }
    }
    out
}

fn provider_with(points: &[GeoCoordinates]) -> MemoryProvider {
    let mut provider = MemoryProvider::new();
    for c in points {
        provider.push(Some(*c));
    }
    provider
}

fn bench_regenerate(c: &mut Criterion) {
    let mut group = c.benchmark_group("regenerate");
    for &n in &[1_000usize, 10_000, 100_000] {
        let points = gen_uniform_points(n, 0xC0FFEE);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("uniform_n{n}"), |b| {
            b.iter_batched(
                || ItemMarkerTiler::new(provider_with(&points)),
                |mut tiler| {
                    tiler.regenerate_tiles();
                    black_box(tiler.tile_marker_count(&TileIndex::new()));
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_incremental_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("incremental_insert");
    let base = gen_clustered_points(2_000, 2.0, 7);
    let extra = gen_clustered_points(200, 2.0, 11);
    group.throughput(Throughput::Elements(extra.len() as u64));
    group.bench_function("clustered_10k_plus_1k", |b| {
        b.iter_batched(
            || {
                let mut tiler = ItemMarkerTiler::new(provider_with(&base));
                // Split the tree down to a useful depth, as a grouping pass would.
                let tiles: Vec<TileIndex> = NonEmptyIterator::new(&mut tiler, 4).collect();
                black_box(tiles.len());
                tiler
            },
            |mut tiler| {
                for c in &extra {
                    let row = tiler.provider().item_count();
                    tiler.provider_mut().push(Some(*c));
                    tiler.handle_event(ModelEvent::RowsInserted {
                        first: row,
                        last: row,
                    });
                }
                black_box(tiler.tile_marker_count(&TileIndex::new()));
            },
            BatchSize::LargeInput,
        )
    });
    group.finish();
}

fn bench_non_empty_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("non_empty_iteration");
    let points = gen_clustered_points(2_000, 5.0, 3);
    let mut tiler = ItemMarkerTiler::new(provider_with(&points));
    for level in [2usize, 4, 6] {
        group.bench_function(format!("global_level{level}"), |b| {
            b.iter(|| {
                let count = NonEmptyIterator::new(&mut tiler, level).count();
                black_box(count);
            })
        });
    }
    let europe = [GeoBounds::new(35.0, -10.0, 60.0, 30.0)];
    group.bench_function("bounded_level6", |b| {
        b.iter(|| {
            let count = NonEmptyIterator::with_bounds(&mut tiler, 6, &europe).count();
            black_box(count);
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_regenerate,
    bench_incremental_insert,
    bench_non_empty_iteration,
);
criterion_main!(benches);
