// Copyright 2025 the Geotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`MarkerTiler`] contract shared by all tile tree backings.

use alloc::vec::Vec;
use geotile_index::{GeoCoordinates, TileIndex};
use kurbo::Size;

use crate::tile::TileId;
use crate::types::{ClickInfo, GroupState, ItemRef, TilerFlags};

/// Whether the tile tree reflects the backing collection.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TilerState {
    /// The tree must be discarded and rebuilt before the next read.
    #[default]
    Dirty,
    /// The tree reflects the backing collection.
    Clean,
}

/// A tile tree over some backing collection of markers.
///
/// Read operations take `&mut self`: a dirty tiler rebuilds itself inside the
/// first read (see [`MarkerTiler::ensure_clean`]), and tiles that hold the
/// markers of their whole subtree are split into children on demand.
///
/// The interaction hooks ([`MarkerTiler::on_indices_clicked`],
/// [`MarkerTiler::on_indices_moved`]) default to doing nothing.
pub trait MarkerTiler {
    /// Rendered thumbnail of a representative marker.
    type Pixmap;

    /// Capabilities of this tiler.
    fn tiler_flags(&self) -> TilerFlags;

    /// Dirty/clean state of the tree.
    fn state(&self) -> TilerState;

    /// True if the tree must be rebuilt before the next read.
    fn is_dirty(&self) -> bool {
        self.state() == TilerState::Dirty
    }

    /// Discard the tree; it is rebuilt on the next read.
    fn set_dirty(&mut self);

    /// Drop the current tree and rebuild it from the backing collection.
    ///
    /// Leaves the tiler clean.
    fn regenerate_tiles(&mut self);

    /// Rebuild the tree if it is dirty.
    fn ensure_clean(&mut self) {
        if self.is_dirty() {
            self.regenerate_tiles();
        }
    }

    /// Make sure the tiles between two corners at `level` are available.
    ///
    /// Backings that compute tiles on the fly (for example from a remote
    /// source) hook in here; the grouper calls it before each traversal.
    fn prepare_tiles(
        &mut self,
        _upper_left: &GeoCoordinates,
        _lower_right: &GeoCoordinates,
        _level: usize,
    ) {
    }

    /// The tile at `index`.
    ///
    /// Missing tiles are created unless `stop_if_empty` is set, in which case
    /// `None` is returned instead.
    fn get_tile(&mut self, index: &TileIndex, stop_if_empty: bool) -> Option<TileId>;

    /// Number of markers in the tile at `index` (zero for missing tiles).
    fn tile_marker_count(&mut self, index: &TileIndex) -> usize;

    /// Number of selected markers in the tile at `index`.
    fn tile_selected_count(&mut self, index: &TileIndex) -> usize;

    /// Composition of the tile at `index`.
    fn tile_group_state(&mut self, index: &TileIndex) -> GroupState;

    /// Markers of the tile at `index`.
    fn tile_marker_items(&mut self, index: &TileIndex) -> Vec<ItemRef>;

    /// State shared by all tiles; `SELECTED_MASK` if anything is selected.
    ///
    /// Lets callers skip per-group selection styling when nothing is selected.
    fn global_group_state(&self) -> GroupState;

    /// The marker that best depicts the tile at `index` under `sort_key`.
    fn tile_representative_marker(&mut self, index: &TileIndex, sort_key: i32) -> Option<ItemRef>;

    /// The marker that best depicts `items` under `sort_key`.
    fn best_representative_index_from_list(
        &self,
        items: &[ItemRef],
        sort_key: i32,
    ) -> Option<ItemRef>;

    /// Request a thumbnail of `item`.
    ///
    /// `None` means the thumbnail is not available yet; it may arrive later
    /// through [`MarkerTiler::take_available_thumbnails`].
    fn pixmap_from_representative_index(&mut self, item: ItemRef, size: Size)
    -> Option<Self::Pixmap>;

    /// Drain thumbnails that arrived since the last call.
    fn take_available_thumbnails(&mut self) -> Vec<(ItemRef, Self::Pixmap)> {
        Vec::new()
    }

    /// Whether two representative markers are the same item.
    fn indices_equal(&self, a: ItemRef, b: ItemRef) -> bool {
        a == b
    }

    /// Apply a click on a group of tiles to the backing collection.
    fn on_indices_clicked(&mut self, _click: &ClickInfo) {}

    /// Move the markers of `tile_indices` to `target`, optionally onto `snap_target`.
    fn on_indices_moved(
        &mut self,
        _tile_indices: &[TileIndex],
        _target: &GeoCoordinates,
        _snap_target: Option<ItemRef>,
    ) {
    }

    /// Activate or deactivate the tiler.
    fn set_active(&mut self, active: bool);

    /// True if tiles or selection changed since the last call; resets the flag.
    fn take_changed(&mut self) -> bool;
}
