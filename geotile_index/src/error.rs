// Copyright 2025 the Geotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors for tile indices built from untrusted input.

use crate::tile_index::{MAX_INDEX_COUNT, MAX_LINEAR_INDEX};

/// Rejected input to [`TileIndex::from_linear_indices`](crate::TileIndex::from_linear_indices).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TileIndexError {
    /// More components than the tree is deep.
    #[error("tile index has {count} components, at most {max} are allowed", max = MAX_INDEX_COUNT)]
    TooManyLevels {
        /// Number of components supplied.
        count: usize,
    },
    /// A component outside `0..100`.
    #[error("linear index {index} at level {level} is outside 0..{max}", max = MAX_LINEAR_INDEX)]
    LinearIndexOutOfRange {
        /// Level of the offending component.
        level: usize,
        /// The offending value.
        index: i32,
    },
}
