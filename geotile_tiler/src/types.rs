// Copyright 2025 the Geotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types shared by tilers, providers, and groupers: item handles, flags, and click info.

use alloc::vec::Vec;
use geotile_index::TileIndex;

/// Handle of an item in an external collection.
///
/// The collection owner hands these out and keeps them stable while the item
/// lives; the tiler only stores and compares them. A removed item's handle must
/// not be reused for a different item while tiles may still reference it, which
/// is what [`ItemProvider::is_valid`](crate::ItemProvider::is_valid) reports.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ItemRef(u32);

impl ItemRef {
    /// Wrap a raw handle.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw handle.
    pub const fn raw(self) -> u32 {
        self.0
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Capabilities a tiler reports to the grouper and renderer.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TilerFlags: u8 {
        /// Markers may be dragged to new positions.
        const MOVABLE = 0b0000_0001;
    }
}

bitflags::bitflags! {
    /// Capabilities of a backing item collection.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ModelFlags: u8 {
        /// Items are shown on the map.
        const VISIBLE = 0b0000_0001;
        /// Items may be relocated.
        const MOVABLE = 0b0000_0010;
        /// Other markers may be dropped onto these items.
        const SNAPS   = 0b0000_0100;
    }
}

impl Default for ModelFlags {
    fn default() -> Self {
        Self::VISIBLE
    }
}

bitflags::bitflags! {
    /// Interaction modes of the map widget, forwarded with clicks.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MouseModes: u8 {
        /// Drag pans the map.
        const PAN                        = 0b0000_0001;
        /// Drag draws a selection region.
        const REGION_SELECTION           = 0b0000_0010;
        /// Region selection started from the toolbar icon.
        const REGION_SELECTION_FROM_ICON = 0b0000_0100;
        /// Clicks filter the collection down to the clicked items.
        const FILTER                     = 0b0000_1000;
        /// Clicks toggle the selection of the clicked items.
        const SELECT_THUMBNAIL           = 0b0001_0000;
        /// Clicks zoom into the clicked group.
        const ZOOM_INTO_GROUP            = 0b0010_0000;
    }
}

bitflags::bitflags! {
    /// Composition of a tile or cluster along three independent axes.
    ///
    /// Each axis is tri-valued. "None" is the absence of bits, "All" is the
    /// high bit of the axis, "Some" is both bits of the axis.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct GroupState: u8 {
        /// Every member is selected.
        const SELECTED_ALL = 0b00_00_10;
        /// Some, but not all, members are selected.
        const SELECTED_SOME = 0b00_00_11;
        /// Mask of the selection axis.
        const SELECTED_MASK = 0b00_00_11;

        /// Every member passes the positive filter.
        const FILTERED_POSITIVE_ALL = 0b00_10_00;
        /// Some members pass the positive filter.
        const FILTERED_POSITIVE_SOME = 0b00_11_00;
        /// Mask of the positive-filter axis.
        const FILTERED_POSITIVE_MASK = 0b00_11_00;

        /// Every member lies in the selected region.
        const REGION_SELECTED_ALL = 0b10_00_00;
        /// Some members lie in the selected region.
        const REGION_SELECTED_SOME = 0b11_00_00;
        /// Mask of the region-selection axis.
        const REGION_SELECTED_MASK = 0b11_00_00;
    }
}

impl GroupState {
    /// Selection state of a group with `selected` of `total` members selected.
    pub fn from_selected_count(selected: usize, total: usize) -> Self {
        assert!(selected <= total, "selected count exceeds member count");
        if selected == 0 {
            Self::empty()
        } else if selected == total {
            Self::SELECTED_ALL
        } else {
            Self::SELECTED_SOME
        }
    }
}

/// A click on a cluster, translated into tiles.
#[derive(Clone, Debug, Default)]
pub struct ClickInfo {
    /// Tiles that make up the clicked cluster.
    pub tile_indices: Vec<TileIndex>,
    /// Representative item of the cluster, if any was chosen.
    pub representative: Option<ItemRef>,
    /// Group state of the clicked cluster.
    pub group_state: GroupState,
    /// Interaction mode at the time of the click.
    pub mouse_mode: MouseModes,
}
