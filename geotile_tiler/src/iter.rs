// Copyright 2025 the Geotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Traversal of the non-empty tiles at one level.

use alloc::collections::VecDeque;
use geotile_index::{GeoBounds, MAX_LEVEL, MAX_LINEAR_INDEX, TILING, TileIndex};

use crate::tiler::MarkerTiler;

#[derive(Copy, Clone, Debug)]
struct Limits {
    lat_bl: u8,
    lon_bl: u8,
    lat_tr: u8,
    lon_tr: u8,
}

/// Iterates the indices of all non-empty tiles at a fixed level.
///
/// The traversal covers one or more rectangles of tiles given by their
/// lower-left and upper-right tile indices. Inside each rectangle, tiles are
/// visited depth first in ascending lat/lon order, and empty subtrees are
/// skipped without descending into them.
///
/// The iterator holds the tiler mutably, so the tiler cannot change while the
/// traversal is in progress. Start a new iterator for every traversal.
pub struct NonEmptyIterator<'a, T: MarkerTiler + ?Sized> {
    tiler: &'a mut T,
    level: usize,
    bounds_list: VecDeque<(TileIndex, TileIndex)>,
    start_index: TileIndex,
    end_index: TileIndex,
    current_index: TileIndex,
    at_start_of_level: bool,
    at_end: bool,
}

impl<T: MarkerTiler + ?Sized> core::fmt::Debug for NonEmptyIterator<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NonEmptyIterator")
            .field("level", &self.level)
            .field("pending_bounds", &self.bounds_list.len())
            .field("start_index", &self.start_index)
            .field("end_index", &self.end_index)
            .field("current_index", &self.current_index)
            .field("at_end", &self.at_end)
            .finish_non_exhaustive()
    }
}

impl<'a, T: MarkerTiler + ?Sized> NonEmptyIterator<'a, T> {
    /// Iterate the non-empty tiles of the whole globe at `level`.
    pub fn new(tiler: &'a mut T, level: usize) -> Self {
        assert!(level <= MAX_LEVEL, "level {level} exceeds MAX_LEVEL");
        let mut start = TileIndex::new();
        let mut end = TileIndex::new();
        for _ in 0..=level {
            start.append_linear_index(0);
            end.append_linear_index(MAX_LINEAR_INDEX - 1);
        }
        Self::from_list(tiler, level, VecDeque::from([(start, end)]))
    }

    /// Iterate the non-empty tiles between two tile indices at `level`.
    pub fn with_indices(
        tiler: &'a mut T,
        level: usize,
        start_index: TileIndex,
        end_index: TileIndex,
    ) -> Self {
        assert!(level <= MAX_LEVEL, "level {level} exceeds MAX_LEVEL");
        Self::from_list(tiler, level, VecDeque::from([(start_index, end_index)]))
    }

    /// Iterate the non-empty tiles of several boxes at `level`.
    ///
    /// The boxes must not cross the antimeridian; split them with
    /// [`normalize_bounds`](geotile_index::normalize_bounds) first.
    pub fn with_bounds(tiler: &'a mut T, level: usize, bounds: &[GeoBounds]) -> Self {
        assert!(level <= MAX_LEVEL, "level {level} exceeds MAX_LEVEL");
        let list = bounds
            .iter()
            .map(|b| {
                assert!(
                    b.south() <= b.north() && b.west() <= b.east(),
                    "bounds must be normalized: {b:?}"
                );
                (
                    TileIndex::from_coordinates(&b.south_west, level),
                    TileIndex::from_coordinates(&b.north_east, level),
                )
            })
            .collect();
        Self::from_list(tiler, level, list)
    }

    fn from_list(
        tiler: &'a mut T,
        level: usize,
        bounds_list: VecDeque<(TileIndex, TileIndex)>,
    ) -> Self {
        let mut it = Self {
            tiler,
            level,
            bounds_list,
            start_index: TileIndex::new(),
            end_index: TileIndex::new(),
            current_index: TileIndex::new(),
            at_start_of_level: true,
            at_end: false,
        };
        it.initialize_next_bounds();
        it
    }

    /// True once every box has been traversed.
    pub fn at_end(&self) -> bool {
        self.at_end
    }

    /// The tile the iterator is positioned on.
    pub fn current_index(&self) -> TileIndex {
        self.current_index
    }

    /// The tiler being traversed.
    pub fn tiler(&mut self) -> &mut T {
        self.tiler
    }

    fn initialize_next_bounds(&mut self) {
        let Some((start, end)) = self.bounds_list.pop_front() else {
            self.at_end = true;
            return;
        };
        assert!(
            start.index_count() == self.level + 1 && end.index_count() == self.level + 1,
            "bounds indices must be at the iteration level"
        );
        self.start_index = start;
        self.end_index = end;
        self.current_index = start.mid(0, 1);
        self.at_start_of_level = true;
        self.next_index();
    }

    /// Limits of the cells at `level` inside the current parent tile.
    ///
    /// Along each edge the limit comes from the bounds only while the current
    /// index agrees with that edge's index on all coarser levels.
    fn limits(&self, level: usize) -> Limits {
        let on_edge = |edge: &TileIndex, axis: fn(&TileIndex, usize) -> u8| {
            (0..level).all(|i| axis(&self.current_index, i) == axis(edge, i))
        };
        let mut limits = Limits {
            lat_bl: 0,
            lon_bl: 0,
            lat_tr: TILING - 1,
            lon_tr: TILING - 1,
        };
        if on_edge(&self.start_index, TileIndex::index_lat) {
            limits.lat_bl = self.start_index.index_lat(level);
        }
        if on_edge(&self.start_index, TileIndex::index_lon) {
            limits.lon_bl = self.start_index.index_lon(level);
        }
        if on_edge(&self.end_index, TileIndex::index_lat) {
            limits.lat_tr = self.end_index.index_lat(level);
        }
        if on_edge(&self.end_index, TileIndex::index_lon) {
            limits.lon_tr = self.end_index.index_lon(level);
        }
        debug_assert!(
            limits.lat_bl <= limits.lat_tr && limits.lon_bl <= limits.lon_tr,
            "inverted limits {limits:?}"
        );
        limits
    }

    /// Advance to the next non-empty tile, or to the end.
    pub fn next_index(&mut self) -> TileIndex {
        if self.at_end {
            return self.current_index;
        }

        loop {
            let current_level = self.current_index.level();

            if self.at_start_of_level {
                self.at_start_of_level = false;
            } else {
                let limits = self.limits(current_level);
                let (mut lat, mut lon) = self.current_index.lat_lon_index(current_level);

                lon += 1;
                if lon > limits.lon_tr {
                    lon = limits.lon_bl;
                    lat += 1;
                    if lat > limits.lat_tr {
                        if current_level == 0 {
                            self.initialize_next_bounds();
                            return self.current_index;
                        }
                        self.current_index.one_up();
                        continue;
                    }
                }

                self.current_index.one_up();
                self.current_index.append_lat_lon_index(lat, lon);
            }

            if self.tiler.tile_marker_count(&self.current_index) == 0 {
                continue;
            }

            if current_level == self.level {
                return self.current_index;
            }

            let limits = self.limits(current_level + 1);
            self.current_index
                .append_lat_lon_index(limits.lat_bl, limits.lon_bl);
            self.at_start_of_level = true;
        }
    }
}

impl<T: MarkerTiler + ?Sized> Iterator for NonEmptyIterator<'_, T> {
    type Item = TileIndex;

    fn next(&mut self) -> Option<TileIndex> {
        if self.at_end {
            return None;
        }
        let current = self.current_index;
        self.next_index();
        Some(current)
    }
}
