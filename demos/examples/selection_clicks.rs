// Copyright 2025 the Geotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clicking and dragging clusters.
//!
//! Groups a handful of markers, toggles the selection of the cluster under a
//! pixel, and drags another cluster to a new place.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p geotile_demos --example selection_clicks`

use geotile_grouper::{ClusterPixmap, GroupingConfig, LinearBackend, TileGrouper};
use geotile_index::{GeoBounds, GeoCoordinates};
use geotile_tiler::{ItemMarkerTiler, MemoryProvider, ModelEvent, ModelFlags, MouseModes};
use kurbo::{Point, Size};

fn print_state(label: &str, grouper: &TileGrouper<LinearBackend>) {
    println!("== {label} ==");
    for (i, c) in grouper.clusters().iter().enumerate() {
        println!(
            "  #{i}: {} of {} selected, state {:?}",
            c.marker_selected_count, c.marker_count, c.group_state
        );
    }
}

fn main() {
    env_logger::init();

    let mut provider = MemoryProvider::new().with_flags(ModelFlags::VISIBLE | ModelFlags::MOVABLE);
    for i in 0..5 {
        provider.push(Some(GeoCoordinates::new(45.0 + f64::from(i) * 0.01, 7.0)));
    }
    for i in 0..3 {
        provider.push(Some(GeoCoordinates::new(38.0, 23.7 + f64::from(i) * 0.01)));
    }
    let mut tiler = ItemMarkerTiler::new(provider);

    let view = LinearBackend::new(GeoBounds::new(30.0, -10.0, 60.0, 40.0), Size::new(800.0, 480.0))
        .with_zoom(5);
    let mut grouper = TileGrouper::with_backend(GroupingConfig::default(), view);
    grouper.update_clusters(&mut tiler);
    print_state("Initial", &grouper);

    // Click on the middle of the first cluster.
    let Some(first) = grouper.clusters().first() else {
        return;
    };
    let hit = grouper.cluster_at(first.pixmap_rect().center());
    if let Some(index) = hit {
        grouper.click_cluster(&mut tiler, index, MouseModes::SELECT_THUMBNAIL);
        grouper.update_clusters(&mut tiler);
        print_state(&format!("After clicking cluster #{index}"), &grouper);
    }

    // Ask for thumbnails and answer the requests like an image loader would.
    for index in 0..grouper.clusters().len() {
        if let ClusterPixmap::Image(_) = grouper.cluster_pixmap(&mut tiler, index) {
            println!("  cluster #{index} already has a thumbnail");
        }
    }
    for (item, size) in tiler.provider_mut().take_thumbnail_requests() {
        let thumbnail = tiler.provider().render_thumbnail(item, size);
        tiler.handle_event(ModelEvent::ThumbnailAvailable { item, thumbnail });
    }
    for (clusters, thumbnail) in grouper.take_cluster_thumbnails(&mut tiler) {
        println!("  thumbnail of {:?} goes to clusters {clusters:?}", thumbnail.item);
    }

    // Drag the last cluster to the upper left part of the view.
    let Some(last) = grouper.clusters().len().checked_sub(1) else {
        return;
    };
    grouper.set_moving_cluster(true);
    if grouper.move_cluster(&mut tiler, last, Point::new(100.0, 100.0), None) {
        grouper.update_clusters(&mut tiler);
        print_state("After moving the last cluster", &grouper);
    }
}
