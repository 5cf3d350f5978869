// Copyright 2025 the Geotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use geotile_grouper::{GroupingConfig, LinearBackend, TileGrouper};
use geotile_index::{GeoBounds, GeoCoordinates};
use geotile_tiler::{ItemMarkerTiler, MemoryProvider};
use kurbo::Size;

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

fn tiler_with_uniform_points(count: usize, seed: u64) -> ItemMarkerTiler<MemoryProvider> {
    let mut rng = Rng::new(seed);
    let mut provider = MemoryProvider::new();
    for _ in 0..count {
        provider.push(Some(GeoCoordinates::new(
            rng.next_f64() * 160.0 - 80.0,
            rng.next_f64() * 360.0 - 180.0,
        )));
    }
    ItemMarkerTiler::new(provider)
}

fn bench_grouping_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("grouping_pass");
    let mut tiler = tiler_with_uniform_points(20_000, 42);

    for (name, bounds, zoom) in [
        ("world_zoom2", GeoBounds::world(), 2),
        ("europe_zoom5", GeoBounds::new(35.0, -10.0, 60.0, 30.0), 5),
        ("pacific_zoom5", GeoBounds::new(-20.0, 160.0, 10.0, -160.0), 5),
    ] {
        let view = LinearBackend::new(bounds, Size::new(1280.0, 800.0)).with_zoom(zoom);
        let mut grouper = TileGrouper::with_backend(GroupingConfig::default(), view);
        group.bench_function(name, |b| {
            b.iter(|| {
                grouper.set_clusters_dirty();
                grouper.update_clusters(&mut tiler);
                black_box(grouper.clusters().len());
            })
        });
    }

    let mut config = GroupingConfig::default();
    config.show_thumbnails = false;
    let view = LinearBackend::new(GeoBounds::world(), Size::new(1280.0, 800.0)).with_zoom(3);
    let mut grouper = TileGrouper::with_backend(config, view);
    group.bench_function("world_zoom3_plain_markers", |b| {
        b.iter(|| {
            grouper.set_clusters_dirty();
            grouper.update_clusters(&mut tiler);
            black_box(grouper.clusters().len());
        })
    });
    group.finish();
}

criterion_group!(benches, bench_grouping_pass);
criterion_main!(benches);
