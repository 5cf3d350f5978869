// Copyright 2025 the Geotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Access to the external item collection behind an [`ItemMarkerTiler`](crate::ItemMarkerTiler).

use alloc::vec::Vec;
use geotile_index::GeoCoordinates;
use kurbo::Size;

use crate::types::{ItemRef, ModelFlags};

/// An ordered collection of geotagged items, plus its selection.
///
/// The provider is the source of truth for coordinates and selection; the
/// tiler only caches counts derived from it. Rows are positions in the
/// current ordering; [`ItemRef`]s are stable handles that survive reordering.
pub trait ItemProvider {
    /// Thumbnail image type handed to the renderer.
    type Thumbnail;

    /// Number of rows.
    fn item_count(&self) -> usize;

    /// Handle of the item at `row`.
    fn item_at(&self, row: usize) -> Option<ItemRef>;

    /// False once the item has been removed from the collection.
    fn is_valid(&self, item: ItemRef) -> bool;

    /// Position of the item, if it has one.
    fn item_coordinates(&self, item: ItemRef) -> Option<GeoCoordinates>;

    /// Whether the item is selected. Collections without selection report `false`.
    fn is_selected(&self, _item: ItemRef) -> bool {
        false
    }

    /// Whether the collection has a selection at all.
    fn supports_selection(&self) -> bool {
        false
    }

    /// Whether any item is selected.
    fn has_selection(&self) -> bool {
        false
    }

    /// Select or deselect an item.
    fn select(&mut self, _item: ItemRef, _selected: bool) {}

    /// Capabilities of the collection.
    fn model_flags(&self) -> ModelFlags {
        ModelFlags::VISIBLE
    }

    /// Whether an item's coordinates can still be read while its removal is announced.
    ///
    /// When this is false the tiler cannot locate the item's tiles at removal
    /// time and falls back to a full rebuild.
    fn coordinates_readable_on_removal(&self) -> bool {
        false
    }

    /// The item that best depicts `items` under `sort_key`.
    fn best_representative(&self, items: &[ItemRef], _sort_key: i32) -> Option<ItemRef> {
        items.first().copied()
    }

    /// Request a thumbnail; `None` if it is not (yet) available.
    fn thumbnail(&mut self, _item: ItemRef, _size: Size) -> Option<Self::Thumbnail> {
        None
    }

    /// The user clicked these items in filter mode.
    fn on_indices_clicked(&mut self, _items: &[ItemRef]) {}

    /// The user dragged these items to `target`, optionally onto `snap_target`.
    fn on_indices_moved(
        &mut self,
        _items: &[ItemRef],
        _target: &GeoCoordinates,
        _snap_target: Option<ItemRef>,
    ) {
    }
}

/// Stand-in for a rendered thumbnail, produced by [`MemoryProvider::render_thumbnail`].
#[derive(Clone, Debug, PartialEq)]
pub struct MemoryThumbnail {
    /// The depicted item.
    pub item: ItemRef,
    /// Requested size.
    pub size: Size,
}

#[derive(Clone, Debug)]
struct MemoryItem {
    coordinates: Option<GeoCoordinates>,
    selected: bool,
}

/// An in-memory [`ItemProvider`].
///
/// Removed items leave a tombstone so that their handles stay invalid.
/// Thumbnails are asynchronous: requests are queued and answered by the host
/// through [`MemoryProvider::take_thumbnail_requests`].
#[derive(Clone, Debug)]
pub struct MemoryProvider {
    items: Vec<Option<MemoryItem>>,
    rows: Vec<ItemRef>,
    selected_count: usize,
    flags: ModelFlags,
    readable_on_removal: bool,
    thumbnail_requests: Vec<(ItemRef, Size)>,
    last_clicked: Vec<ItemRef>,
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProvider {
    /// An empty, visible, non-movable collection.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            rows: Vec::new(),
            selected_count: 0,
            flags: ModelFlags::VISIBLE,
            readable_on_removal: true,
            thumbnail_requests: Vec::new(),
            last_clicked: Vec::new(),
        }
    }

    /// Replace the capability flags.
    pub fn with_flags(mut self, flags: ModelFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Declare whether coordinates stay readable during removal notifications.
    pub fn with_readable_on_removal(mut self, readable: bool) -> Self {
        self.readable_on_removal = readable;
        self
    }

    /// Append an item; returns its handle. Its row is the previous item count.
    pub fn push(&mut self, coordinates: Option<GeoCoordinates>) -> ItemRef {
        let item = u32::try_from(self.items.len())
            .map(ItemRef::new)
            .unwrap_or_else(|_| panic!("MemoryProvider holds at most u32::MAX items"));
        self.items.push(Some(MemoryItem {
            coordinates,
            selected: false,
        }));
        self.rows.push(item);
        item
    }

    /// Remove rows `first..=last`; returns the removed handles.
    pub fn remove_rows(&mut self, first: usize, last: usize) -> Vec<ItemRef> {
        let removed: Vec<ItemRef> = self.rows.drain(first..=last).collect();
        for item in &removed {
            if let Some(entry) = self.items[item.idx()].take()
                && entry.selected
            {
                self.selected_count -= 1;
            }
        }
        removed
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        let count = self.rows.len();
        if count > 0 {
            self.remove_rows(0, count - 1);
        }
    }

    /// Change the position of an item.
    pub fn set_coordinates(&mut self, item: ItemRef, coordinates: Option<GeoCoordinates>) {
        if let Some(Some(entry)) = self.items.get_mut(item.idx()) {
            entry.coordinates = coordinates;
        }
    }

    /// Row of a live item.
    pub fn row_of(&self, item: ItemRef) -> Option<usize> {
        self.rows.iter().position(|r| *r == item)
    }

    /// Drain the thumbnails requested since the last call.
    pub fn take_thumbnail_requests(&mut self) -> Vec<(ItemRef, Size)> {
        core::mem::take(&mut self.thumbnail_requests)
    }

    /// Produce the thumbnail for a request.
    pub fn render_thumbnail(&self, item: ItemRef, size: Size) -> MemoryThumbnail {
        MemoryThumbnail { item, size }
    }

    /// Items of the last filter click.
    pub fn last_clicked(&self) -> &[ItemRef] {
        &self.last_clicked
    }

    fn entry(&self, item: ItemRef) -> Option<&MemoryItem> {
        self.items.get(item.idx()).and_then(Option::as_ref)
    }
}

impl ItemProvider for MemoryProvider {
    type Thumbnail = MemoryThumbnail;

    fn item_count(&self) -> usize {
        self.rows.len()
    }

    fn item_at(&self, row: usize) -> Option<ItemRef> {
        self.rows.get(row).copied()
    }

    fn is_valid(&self, item: ItemRef) -> bool {
        self.entry(item).is_some()
    }

    fn item_coordinates(&self, item: ItemRef) -> Option<GeoCoordinates> {
        self.entry(item)
            .and_then(|e| e.coordinates)
            .filter(GeoCoordinates::has_coordinates)
    }

    fn is_selected(&self, item: ItemRef) -> bool {
        self.entry(item).is_some_and(|e| e.selected)
    }

    fn supports_selection(&self) -> bool {
        true
    }

    fn has_selection(&self) -> bool {
        self.selected_count > 0
    }

    fn select(&mut self, item: ItemRef, selected: bool) {
        if let Some(Some(entry)) = self.items.get_mut(item.idx())
            && entry.selected != selected
        {
            entry.selected = selected;
            if selected {
                self.selected_count += 1;
            } else {
                self.selected_count -= 1;
            }
        }
    }

    fn model_flags(&self) -> ModelFlags {
        self.flags
    }

    fn coordinates_readable_on_removal(&self) -> bool {
        self.readable_on_removal
    }

    fn thumbnail(&mut self, item: ItemRef, size: Size) -> Option<MemoryThumbnail> {
        if self.is_valid(item) {
            self.thumbnail_requests.push((item, size));
        }
        None
    }

    fn on_indices_clicked(&mut self, items: &[ItemRef]) {
        self.last_clicked = items.to_vec();
    }

    fn on_indices_moved(
        &mut self,
        items: &[ItemRef],
        target: &GeoCoordinates,
        _snap_target: Option<ItemRef>,
    ) {
        if !self.flags.contains(ModelFlags::MOVABLE) {
            log::warn!("ignoring move of {} items: collection is not movable", items.len());
            return;
        }
        for item in items {
            self.set_coordinates(*item, Some(*target));
        }
    }
}
