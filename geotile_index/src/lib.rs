// Copyright 2025 the Geotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geotile Index: fixed-depth addressing of geographic tiles.
//!
//! The globe is split into a 10×10 grid of lat/lon cells, each cell again into
//! a 10×10 grid, and so on down to [`MAX_LEVEL`]. A [`TileIndex`] is the path of
//! linear cell indices (`lat * 10 + lon`, each in `0..100`) from the root to one
//! tile. Latitude grows with the row, longitude with the column; the lower-left
//! corner of a tile is its minimum latitude and longitude.
//!
//! - [`TileIndex::from_coordinates`] locates a point at a given level.
//! - [`TileIndex::to_coordinates`] and [`TileIndex::corner_coordinates`] decode a tile back to degrees.
//! - [`normalize_bounds`] splits antimeridian-crossing viewports into plain boxes.
//!
//! The crate is `no_std` and allocation-light; a [`TileIndex`] is a small `Copy` value.
//!
//! ## Example
//!
//! ```rust
//! use geotile_index::{GeoCoordinates, TileIndex, MAX_LEVEL};
//!
//! let berlin = GeoCoordinates::new(52.52, 13.405);
//! let deep = TileIndex::from_coordinates(&berlin, MAX_LEVEL);
//! let coarse = TileIndex::from_coordinates(&berlin, 2);
//!
//! // A coarser index is a prefix of the finer one.
//! assert!(TileIndex::indices_equal(&deep, &coarse, 2));
//! assert_eq!(deep.mid(0, 3), coarse);
//!
//! // The tile's box contains the point.
//! let b = coarse.bounds();
//! assert!(b.south() <= 52.52 && 52.52 <= b.north());
//! ```

#![no_std]

extern crate alloc;

pub mod coordinates;
pub mod error;
pub mod tile_index;

pub use coordinates::{GeoBounds, GeoCoordinates, normalize_bounds};
pub use error::TileIndexError;
pub use tile_index::{Corner, MAX_INDEX_COUNT, MAX_LEVEL, MAX_LINEAR_INDEX, TILING, TileIndex};
