// Copyright 2025 the Geotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geotile Grouper: turns the non-empty tiles of a marker tiler into clusters
//! for one map view.
//!
//! - [`MapBackend`]: what the grouper needs from a map view (size, visible
//!   area, zoom, projection). [`LinearBackend`] is a flat reference view.
//! - [`ZoomLevelTable`]: the hand-tuned zoom to tile level steps.
//! - [`GroupingConfig`]: grouping radii, thumbnail sizes, and preview switches.
//! - [`TileGrouper`]: the grouping pass plus translation of clicks and drags
//!   on clusters back to tiles.
//!
//! ## Example
//!
//! ```rust
//! use geotile_grouper::{GroupingConfig, LinearBackend, TileGrouper};
//! use geotile_index::{GeoBounds, GeoCoordinates};
//! use geotile_tiler::{ItemMarkerTiler, MemoryProvider};
//! use kurbo::Size;
//!
//! let mut provider = MemoryProvider::new();
//! provider.push(Some(GeoCoordinates::new(48.85, 2.35)));
//! provider.push(Some(GeoCoordinates::new(48.86, 2.34)));
//! provider.push(Some(GeoCoordinates::new(-33.86, 151.21)));
//! let mut tiler = ItemMarkerTiler::new(provider);
//!
//! let view = LinearBackend::new(GeoBounds::world(), Size::new(1000.0, 500.0));
//! let mut grouper = TileGrouper::with_backend(GroupingConfig::default(), view);
//! assert!(grouper.update_clusters(&mut tiler));
//!
//! let counts: Vec<usize> = grouper.clusters().iter().map(|c| c.marker_count).collect();
//! assert_eq!(counts, [2, 1]);
//! ```

#![no_std]

extern crate alloc;

pub mod backend;
pub mod cluster;
pub mod config;
pub mod grouper;
pub mod zoom;

pub use backend::{LinearBackend, MapBackend};
pub use cluster::{Cluster, ClusterPixmap, PixmapType};
pub use config::{
    GroupingConfig, MIN_MARKER_GROUPING_RADIUS, MIN_THUMBNAIL_GROUPING_RADIUS, MIN_THUMBNAIL_SIZE,
};
pub use grouper::TileGrouper;
pub use zoom::ZoomLevelTable;
