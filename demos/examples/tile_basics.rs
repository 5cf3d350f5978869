// Copyright 2025 the Geotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tile addressing and the tile tree.
//!
//! Builds a tiler over a few geotagged items, prints the path of one item
//! through the levels, and walks the non-empty tiles at two levels.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p geotile_demos --example tile_basics`

use geotile_index::{GeoCoordinates, TileIndex};
use geotile_tiler::{
    ItemMarkerTiler, ItemProvider, MarkerTiler, MemoryProvider, ModelEvent, NonEmptyIterator,
};

fn main() {
    env_logger::init();

    let places = [
        ("Notre-Dame", GeoCoordinates::new(48.853, 2.3499)),
        ("Louvre", GeoCoordinates::new(48.8606, 2.3376)),
        ("Central Park", GeoCoordinates::new(40.7829, -73.9654)),
        ("Opera House", GeoCoordinates::new(-33.8568, 151.2153)),
    ];

    println!("== Path of {} ==", places[0].0);
    let full = TileIndex::from_coordinates(&places[0].1, geotile_index::MAX_LEVEL);
    for level in 0..=3 {
        let tile = full.mid(0, level + 1);
        let b = tile.bounds();
        println!(
            "  level {level}: {tile}  lat {:.3}..{:.3}  lon {:.3}..{:.3}",
            b.south(),
            b.north(),
            b.west(),
            b.east()
        );
    }

    let mut provider = MemoryProvider::new();
    for (_, c) in &places {
        provider.push(Some(*c));
    }
    let mut tiler = ItemMarkerTiler::new(provider);

    for level in [0, 2] {
        println!("== Non-empty tiles at level {level} ==");
        let tiles: Vec<TileIndex> = NonEmptyIterator::new(&mut tiler, level).collect();
        for tile in tiles {
            println!("  {tile}: {} markers", tiler.tile_marker_count(&tile));
        }
    }

    // Add one more item incrementally.
    let row = tiler.provider().item_count();
    tiler.provider_mut().push(Some(GeoCoordinates::new(48.8584, 2.2945)));
    tiler.handle_event(ModelEvent::RowsInserted {
        first: row,
        last: row,
    });
    let paris = full.mid(0, 2);
    println!(
        "== After adding the Eiffel Tower: {paris} holds {} markers ==",
        tiler.tile_marker_count(&paris)
    );
}
