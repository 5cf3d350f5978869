// Copyright 2025 the Geotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`TileIndex`]: a path of linear child indices addressing one tile of the grid.

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};

use crate::coordinates::{GeoBounds, GeoCoordinates};
use crate::error::TileIndexError;

/// Deepest level of the tile tree (level 0 is the first subdivision of the globe).
pub const MAX_LEVEL: usize = 9;

/// Maximum number of components in a [`TileIndex`].
pub const MAX_INDEX_COUNT: usize = MAX_LEVEL + 1;

/// Number of cells per axis at every level.
pub const TILING: u8 = 10;

/// Number of children of a tile, and the exclusive upper bound of a linear index.
pub const MAX_LINEAR_INDEX: u8 = TILING * TILING;

/// One of the four corners of a tile.
///
/// The offsets applied at the last level are, in cell units:
/// `Nw` = (+0 lat, +0 lon), `Sw` = (+1 lat, +0 lon),
/// `Ne` = (+0 lat, +1 lon), `Se` = (+1 lat, +1 lon).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Corner {
    /// No offset: the lower-left corner of the cell.
    Nw,
    /// One cell along latitude.
    Sw,
    /// One cell along longitude.
    Ne,
    /// One cell along both axes.
    Se,
}

impl Corner {
    const fn offsets(self) -> (u8, u8) {
        match self {
            Self::Nw => (0, 0),
            Self::Sw => (1, 0),
            Self::Ne => (0, 1),
            Self::Se => (1, 1),
        }
    }
}

/// Path from the root of the tile tree to one tile.
///
/// Every component is a linear index `lat_index * TILING + lon_index` into the
/// 10×10 grid that subdivides the parent's box. An index with `n` components
/// addresses a box at depth `n`; the empty index addresses the whole globe.
#[derive(Copy, Clone, Default)]
pub struct TileIndex {
    count: u8,
    indices: [u8; MAX_INDEX_COUNT],
}

impl TileIndex {
    /// The empty index (root of the tree).
    pub const fn new() -> Self {
        Self {
            count: 0,
            indices: [0; MAX_INDEX_COUNT],
        }
    }

    /// Compute the tile containing `coordinates`, with components for levels `0..=level`.
    ///
    /// Returns the empty index if the coordinates carry no position.
    pub fn from_coordinates(coordinates: &GeoCoordinates, level: usize) -> Self {
        assert!(level <= MAX_LEVEL, "level {level} exceeds MAX_LEVEL");

        if !coordinates.has_coordinates() {
            return Self::new();
        }

        let divisor = f64::from(TILING);
        let mut lat_bl = -90.0;
        let mut lon_bl = -180.0;
        let mut lat_height = 180.0;
        let mut lon_width = 360.0;

        let mut result = Self::new();
        for l in 0..=level {
            let d_lat = lat_height / divisor;
            let d_lon = lon_width / divisor;

            let lat_index = Self::clamp_cell((coordinates.lat - lat_bl) / d_lat);
            let lon_index = Self::clamp_cell((coordinates.lon - lon_bl) / d_lon);
            if lat_index.1 || lon_index.1 {
                log::trace!("rounding errors at level {l} for {coordinates:?}");
            }

            result.append_lat_lon_index(lat_index.0, lon_index.0);

            lat_bl += f64::from(lat_index.0) * d_lat;
            lon_bl += f64::from(lon_index.0) * d_lon;
            lat_height = d_lat;
            lon_width = d_lon;
        }

        result
    }

    /// Truncate a fractional cell position and clamp it into `[0, TILING)`.
    ///
    /// The second value reports whether clamping was necessary.
    fn clamp_cell(position: f64) -> (u8, bool) {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "truncation toward zero is the cell lookup; out-of-range values are clamped below."
        )]
        let cell = position as i64;
        if cell < 0 {
            (0, true)
        } else if cell >= i64::from(TILING) {
            (TILING - 1, true)
        } else {
            let cell = u8::try_from(cell).unwrap_or(TILING - 1);
            (cell, false)
        }
    }

    /// Lower-left corner (minimum latitude and longitude) of the addressed box.
    pub fn to_coordinates(&self) -> GeoCoordinates {
        self.corner_coordinates(Corner::Nw)
    }

    /// One of the four corners of the addressed box.
    pub fn corner_coordinates(&self, corner: Corner) -> GeoCoordinates {
        let divisor = f64::from(TILING);
        let mut lat_bl = -90.0;
        let mut lon_bl = -180.0;
        let mut lat_height = 180.0;
        let mut lon_width = 360.0;

        let count = self.index_count();
        for l in 0..count {
            let d_lat = lat_height / divisor;
            let d_lon = lon_width / divisor;

            let (mut lat_index, mut lon_index) = self.lat_lon_index(l);
            if l + 1 == count {
                let (lat_offset, lon_offset) = corner.offsets();
                lat_index += lat_offset;
                lon_index += lon_offset;
            }

            lat_bl += f64::from(lat_index) * d_lat;
            lon_bl += f64::from(lon_index) * d_lon;
            lat_height = d_lat;
            lon_width = d_lon;
        }

        GeoCoordinates::new(lat_bl, lon_bl)
    }

    /// The geographic box addressed by this index.
    ///
    /// The empty index covers the whole globe.
    pub fn bounds(&self) -> GeoBounds {
        if self.is_empty() {
            return GeoBounds::world();
        }
        GeoBounds {
            south_west: self.corner_coordinates(Corner::Nw),
            north_east: self.corner_coordinates(Corner::Se),
        }
    }

    /// Build an index from externally supplied components, validating each one.
    pub fn from_linear_indices(indices: &[i32]) -> Result<Self, TileIndexError> {
        if indices.len() > MAX_INDEX_COUNT {
            return Err(TileIndexError::TooManyLevels {
                count: indices.len(),
            });
        }
        let mut result = Self::new();
        for (level, &index) in indices.iter().enumerate() {
            let linear = u8::try_from(index)
                .ok()
                .filter(|i| *i < MAX_LINEAR_INDEX)
                .ok_or(TileIndexError::LinearIndexOutOfRange { level, index })?;
            result.append_linear_index(linear);
        }
        Ok(result)
    }

    /// The components as integers, the inverse of [`TileIndex::from_linear_indices`].
    pub fn to_linear_indices(&self) -> Vec<i32> {
        self.as_slice().iter().map(|&i| i32::from(i)).collect()
    }

    /// Components of the path, root first.
    pub fn as_slice(&self) -> &[u8] {
        &self.indices[..self.index_count()]
    }

    /// Number of components.
    pub fn index_count(&self) -> usize {
        usize::from(self.count)
    }

    /// True for the root index.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Level of the last component (`0` for both the root and level-0 indices).
    pub fn level(&self) -> usize {
        self.index_count().saturating_sub(1)
    }

    /// Reset to the root index.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Append one component.
    pub fn append_linear_index(&mut self, linear_index: u8) {
        assert!(
            self.index_count() < MAX_INDEX_COUNT,
            "tile index already has MAX_INDEX_COUNT components"
        );
        assert!(
            linear_index < MAX_LINEAR_INDEX,
            "linear index {linear_index} out of range"
        );
        self.indices[self.index_count()] = linear_index;
        self.count += 1;
    }

    /// Append one component given as a cell row and column.
    pub fn append_lat_lon_index(&mut self, lat_index: u8, lon_index: u8) {
        assert!(
            lat_index < TILING && lon_index < TILING,
            "lat/lon index out of range"
        );
        self.append_linear_index(lat_index * TILING + lon_index);
    }

    /// The component at `level`.
    pub fn linear_index(&self, level: usize) -> u8 {
        assert!(
            level < self.index_count(),
            "level {level} not present in {self}"
        );
        self.indices[level]
    }

    /// The last component.
    pub fn last_index(&self) -> u8 {
        assert!(!self.is_empty(), "the root index has no components");
        self.indices[self.index_count() - 1]
    }

    /// Latitude row of the component at `level`.
    pub fn index_lat(&self, level: usize) -> u8 {
        self.linear_index(level) / TILING
    }

    /// Longitude column of the component at `level`.
    pub fn index_lon(&self, level: usize) -> u8 {
        self.linear_index(level) % TILING
    }

    /// Row and column of the component at `level`.
    pub fn lat_lon_index(&self, level: usize) -> (u8, u8) {
        let linear = self.linear_index(level);
        (linear / TILING, linear % TILING)
    }

    /// Sub-path of `len` components starting at `first`.
    pub fn mid(&self, first: usize, len: usize) -> Self {
        assert!(
            first + len <= self.index_count(),
            "mid({first}, {len}) out of range for {self}"
        );
        let mut result = Self::new();
        for &i in &self.indices[first..first + len] {
            result.append_linear_index(i);
        }
        result
    }

    /// Drop the last component, moving to the parent tile.
    pub fn one_up(&mut self) {
        assert!(!self.is_empty(), "the root index has no parent");
        self.count -= 1;
        self.indices[self.index_count()] = 0;
    }

    /// Whether `a` and `b` agree on all components up to and including `up_to_level`.
    ///
    /// Both indices must have at least `up_to_level + 1` components.
    pub fn indices_equal(a: &Self, b: &Self, up_to_level: usize) -> bool {
        assert!(
            a.index_count() > up_to_level && b.index_count() > up_to_level,
            "indices_equal requires both indices to reach level {up_to_level}"
        );
        a.as_slice()[..=up_to_level] == b.as_slice()[..=up_to_level]
    }
}

impl PartialEq for TileIndex {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for TileIndex {}

impl Hash for TileIndex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl Ord for TileIndex {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl PartialOrd for TileIndex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for TileIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl fmt::Display for TileIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, index) in self.as_slice().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{index}")?;
        }
        f.write_str("]")
    }
}
