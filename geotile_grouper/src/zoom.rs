// Copyright 2025 the Geotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Zoom to marker tile level lookup.
//!
//! The level at which markers are grouped has to follow the map zoom: too
//! coarse and every cluster swallows half a continent, too fine and the
//! grouper projects thousands of tiles that land on the same pixel. The
//! tables below were tuned by hand against real map widgets; they are data,
//! not a formula.

use geotile_index::MAX_LEVEL;

/// A step table from a backend's zoom value to a marker tile level.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ZoomLevelTable {
    steps: &'static [(u32, u8)],
    beyond: u8,
}

impl ZoomLevelTable {
    /// Web map tiles, integer zoom 0 to 22.
    pub const GOOGLE_MAPS: Self = Self {
        steps: &[
            (3, 1),
            (5, 2),
            (8, 3),
            (14, 4),
            (16, 5),
            (17, 6),
            (19, 7),
            (20, 8),
            (23, 9),
        ],
        beyond: 8,
    };

    /// Virtual globe, spherical projection.
    pub const MARBLE_SPHERICAL: Self = Self {
        steps: &[(1300, 5), (1800, 6), (2200, 7), (2800, 8)],
        beyond: 9,
    };

    /// Virtual globe, equirectangular projection.
    pub const MARBLE_EQUIRECTANGULAR: Self = Self {
        steps: &[(1000, 4), (1400, 5), (1900, 6), (2300, 7), (2800, 8)],
        beyond: 9,
    };

    /// Virtual globe, Mercator projection.
    pub const MARBLE_MERCATOR: Self = Self {
        steps: &[(1000, 4), (1500, 5), (1900, 6), (2300, 7), (2800, 8)],
        beyond: 9,
    };

    /// A custom table.
    ///
    /// `steps` holds `(zoom_below, level)` pairs in ascending zoom order: a
    /// zoom below `zoom_below` (and not below an earlier step) maps to `level`.
    /// Zooms past the last step map to `beyond`.
    pub const fn new(steps: &'static [(u32, u8)], beyond: u8) -> Self {
        Self { steps, beyond }
    }

    /// Marker tile level for `zoom`, never above [`MAX_LEVEL`].
    pub fn tile_level(&self, zoom: u32) -> usize {
        let level = self
            .steps
            .iter()
            .find(|(below, _)| zoom < *below)
            .map_or(self.beyond, |(_, level)| *level);
        usize::from(level).min(MAX_LEVEL)
    }
}

impl Default for ZoomLevelTable {
    fn default() -> Self {
        Self::GOOGLE_MAPS
    }
}
