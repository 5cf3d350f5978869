// Copyright 2025 the Geotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grouping markers for a map view.
//!
//! Scatters markers around a few cities, groups them for a world view and
//! for a zoomed-in view of Europe, and prints the resulting clusters.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p geotile_demos --example cluster_basics`

use geotile_grouper::{GroupingConfig, LinearBackend, MapBackend, TileGrouper};
use geotile_index::{GeoBounds, GeoCoordinates};
use geotile_tiler::{ItemMarkerTiler, MemoryProvider};
use kurbo::Size;

fn scatter(provider: &mut MemoryProvider, lat: f64, lon: f64, count: usize) {
    for i in 0..count {
        let step = i as f64 * 0.037;
        provider.push(Some(GeoCoordinates::new(
            lat + (step * 7.0).sin() * 0.4,
            lon + (step * 5.0).cos() * 0.6,
        )));
    }
}

fn print_clusters(grouper: &TileGrouper<LinearBackend>) {
    for (i, c) in grouper.clusters().iter().enumerate() {
        println!(
            "  #{i}: {:>4} markers in {:>3} tiles at ({:.0}, {:.0})  lat {:.2} lon {:.2}",
            c.marker_count,
            c.tile_indices.len(),
            c.pixel_pos.x,
            c.pixel_pos.y,
            c.coordinates.lat,
            c.coordinates.lon
        );
    }
}

fn main() {
    env_logger::init();

    let mut provider = MemoryProvider::new();
    scatter(&mut provider, 48.85, 2.35, 120);
    scatter(&mut provider, 52.52, 13.40, 80);
    scatter(&mut provider, 41.90, 12.50, 60);
    scatter(&mut provider, 40.71, -74.0, 40);
    let mut tiler = ItemMarkerTiler::new(provider);

    let world = LinearBackend::new(GeoBounds::world(), Size::new(1024.0, 512.0)).with_zoom(2);
    let mut grouper = TileGrouper::with_backend(GroupingConfig::default(), world);
    grouper.update_clusters(&mut tiler);
    println!(
        "== World view, tile level {} ==",
        grouper.backend().map_or(0, |b| b.marker_tile_level())
    );
    print_clusters(&grouper);

    if let Some(view) = grouper.backend_mut() {
        view.set_bounds(GeoBounds::new(35.0, -5.0, 60.0, 25.0));
        view.set_zoom(6);
    }
    grouper.set_clusters_dirty();
    grouper.update_clusters(&mut tiler);
    println!(
        "== Europe view, tile level {} ==",
        grouper.backend().map_or(0, |b| b.marker_tile_level())
    );
    print_clusters(&grouper);
}
