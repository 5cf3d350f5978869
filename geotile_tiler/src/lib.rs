// Copyright 2025 the Geotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geotile Tiler: a lazily rebuilt tile tree over geotagged items.
//!
//! The tiler sorts the items of an external collection into the fixed-depth
//! tile tree addressed by [`geotile_index::TileIndex`], keeps per-tile marker
//! and selection counts up to date as the collection changes, and answers
//! occupancy queries for map renderers.
//!
//! - [`MarkerTiler`]: the read contract every tile backing fulfils, with a
//!   two-state ([`TilerState`]) dirty/clean lifecycle. A dirty tiler rebuilds
//!   itself inside the first read.
//! - [`NonEmptyIterator`]: visits the non-empty tiles at one level, globally or
//!   inside a list of boxes.
//! - [`ItemMarkerTiler`]: the tile backing for an [`ItemProvider`]; changes are
//!   reported to it in order through [`ItemMarkerTiler::handle_event`].
//! - [`GroupState`] and [`GroupStateComputer`]: per-tile and per-group
//!   selection/filter/region composition.
//! - [`TileStore`]: the arena holding the 100-way tree.
//!
//! There are no callbacks. Instead of signalling, a tiler raises a change flag
//! which consumers poll with [`MarkerTiler::take_changed`].
//!
//! ## Example
//!
//! ```rust
//! use geotile_index::{GeoCoordinates, TileIndex};
//! use geotile_tiler::{ItemMarkerTiler, MarkerTiler, MemoryProvider, ModelEvent, NonEmptyIterator};
//!
//! let mut provider = MemoryProvider::new();
//! provider.push(Some(GeoCoordinates::new(48.85, 2.35)));
//! provider.push(Some(GeoCoordinates::new(48.86, 2.34)));
//! provider.push(Some(GeoCoordinates::new(-33.86, 151.21)));
//!
//! let mut tiler = ItemMarkerTiler::new(provider);
//! assert_eq!(tiler.tile_marker_count(&TileIndex::new()), 3);
//!
//! let tiles: Vec<TileIndex> = NonEmptyIterator::new(&mut tiler, 1).collect();
//! assert_eq!(tiles.len(), 2);
//!
//! tiler.provider_mut().push(Some(GeoCoordinates::new(40.71, -74.0)));
//! tiler.handle_event(ModelEvent::RowsInserted { first: 3, last: 3 });
//! assert_eq!(tiler.tile_marker_count(&TileIndex::new()), 4);
//! ```

#![no_std]

extern crate alloc;

pub mod group_state;
pub mod item_tiler;
pub mod iter;
pub mod provider;
pub mod tile;
pub mod tiler;
pub mod types;

pub use group_state::GroupStateComputer;
pub use item_tiler::{ItemMarkerTiler, MarkerTileData, ModelEvent};
pub use iter::NonEmptyIterator;
pub use provider::{ItemProvider, MemoryProvider, MemoryThumbnail};
pub use tile::{TileChildren, TileId, TileStore};
pub use tiler::{MarkerTiler, TilerState};
pub use types::{ClickInfo, GroupState, ItemRef, ModelFlags, MouseModes, TilerFlags};
