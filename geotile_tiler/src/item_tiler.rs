// Copyright 2025 the Geotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`ItemMarkerTiler`]: a tile tree over an [`ItemProvider`].

use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use geotile_index::{GeoCoordinates, MAX_LEVEL, TileIndex};
use kurbo::Size;

use crate::provider::ItemProvider;
use crate::tile::{TileId, TileStore};
use crate::tiler::{MarkerTiler, TilerState};
use crate::types::{ClickInfo, GroupState, ItemRef, ModelFlags, MouseModes, TilerFlags};

/// Payload of a tile: the items of its whole subtree.
#[derive(Clone, Debug, Default)]
pub struct MarkerTileData {
    /// Items located in the tile, in insertion order.
    pub items: Vec<ItemRef>,
    /// How many of `items` are selected.
    pub selected_count: usize,
}

impl MarkerTileData {
    fn push(&mut self, item: ItemRef, selected: bool) {
        self.items.push(item);
        if selected {
            self.selected_count += 1;
        }
    }
}

/// A change to the backing collection, delivered in order.
#[derive(Clone, Debug)]
pub enum ModelEvent<T> {
    /// Rows `first..=last` were inserted.
    RowsInserted {
        /// First inserted row.
        first: usize,
        /// Last inserted row.
        last: usize,
    },
    /// Rows `first..=last` are about to be removed; their data is still present.
    RowsAboutToBeRemoved {
        /// First row to go.
        first: usize,
        /// Last row to go.
        last: usize,
    },
    /// Data of rows `first..=last` changed, possibly including coordinates.
    DataChanged {
        /// First changed row.
        first: usize,
        /// Last changed row.
        last: usize,
    },
    /// The collection was reset.
    Reset,
    /// The collection was reordered.
    LayoutChanged,
    /// The selection changed outside the tiler.
    SelectionChanged {
        /// Newly selected items.
        selected: Vec<ItemRef>,
        /// Newly deselected items.
        deselected: Vec<ItemRef>,
    },
    /// Anything else that invalidates the tiles.
    ModelChangedDrastically,
    /// A thumbnail requested earlier became available.
    ThumbnailAvailable {
        /// The depicted item.
        item: ItemRef,
        /// The rendered thumbnail.
        thumbnail: T,
    },
}

/// Tile tree over an external item collection.
///
/// Every tile lists the items of its whole subtree and counts how many of them
/// are selected. New items only descend into tiles that already have children;
/// a tile is split into children lazily when a read needs one of them. The
/// tree is rebuilt from scratch whenever it becomes dirty.
///
/// Host code mutates the collection through [`ItemMarkerTiler::provider_mut`]
/// and then reports the change with [`ItemMarkerTiler::handle_event`]. Removals
/// must be reported before the rows are actually removed.
///
/// The selected counts follow the selection as last reported to the tiler,
/// not the live provider state: a selection made in the provider shows up in
/// the counts once its [`ModelEvent::SelectionChanged`] arrives or the tree is
/// rebuilt, whichever comes first.
pub struct ItemMarkerTiler<P: ItemProvider> {
    provider: P,
    tiles: TileStore<MarkerTileData>,
    state: TilerState,
    active: bool,
    changed: bool,
    /// Tiled items counted as selected.
    selected: BTreeSet<ItemRef>,
    thumbnails: Vec<(ItemRef, P::Thumbnail)>,
}

impl<P: ItemProvider + core::fmt::Debug> core::fmt::Debug for ItemMarkerTiler<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ItemMarkerTiler")
            .field("provider", &self.provider)
            .field("tiles", &self.tiles)
            .field("state", &self.state)
            .field("active", &self.active)
            .field("changed", &self.changed)
            .field("selected", &self.selected.len())
            .field("pending_thumbnails", &self.thumbnails.len())
            .finish_non_exhaustive()
    }
}

impl<P: ItemProvider> ItemMarkerTiler<P> {
    /// A dirty, active tiler over `provider`.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            tiles: TileStore::new(),
            state: TilerState::Dirty,
            active: true,
            changed: true,
            selected: BTreeSet::new(),
            thumbnails: Vec::new(),
        }
    }

    /// The backing collection.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The backing collection, for mutation. Report changes with [`ItemMarkerTiler::handle_event`].
    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// Replace the backing collection; the tree is rebuilt on the next read.
    pub fn set_provider(&mut self, provider: P) -> P {
        self.set_dirty();
        core::mem::replace(&mut self.provider, provider)
    }

    /// The tile tree, for inspection.
    pub fn tiles(&self) -> &TileStore<MarkerTileData> {
        &self.tiles
    }

    /// Payload of a tile returned by [`MarkerTiler::get_tile`].
    pub fn tile_data(&self, tile: TileId) -> &MarkerTileData {
        self.tiles.data(tile)
    }

    /// Whether the tiler applies incremental notifications.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Apply a change of the backing collection.
    pub fn handle_event(&mut self, event: ModelEvent<P::Thumbnail>) {
        if !self.active {
            if !matches!(event, ModelEvent::ThumbnailAvailable { .. }) {
                self.set_dirty();
            }
            return;
        }

        match event {
            ModelEvent::RowsInserted { first, last } => {
                if self.is_dirty() {
                    return;
                }
                for row in first..=last {
                    if let Some(item) = self.provider.item_at(row) {
                        self.add_marker_index_to_grid(item);
                    }
                }
                self.changed = true;
            }
            ModelEvent::RowsAboutToBeRemoved { first, last } => {
                if self.is_dirty() {
                    return;
                }
                if !self.provider.coordinates_readable_on_removal() {
                    log::debug!("removal of rows {first}..={last} cannot be located, rebuilding");
                    self.set_dirty();
                    return;
                }
                for row in first..=last {
                    if let Some(item) = self.provider.item_at(row) {
                        // Hosts do not report the deselection of removed items.
                        self.remove_marker_index_from_grid(item);
                    }
                }
                self.changed = true;
            }
            ModelEvent::DataChanged { .. }
            | ModelEvent::Reset
            | ModelEvent::LayoutChanged
            | ModelEvent::ModelChangedDrastically => self.set_dirty(),
            ModelEvent::SelectionChanged {
                selected,
                deselected,
            } => {
                if self.is_dirty() {
                    return;
                }
                for item in selected {
                    self.apply_selection_change(item, true);
                }
                for item in deselected {
                    self.apply_selection_change(item, false);
                }
                self.changed = true;
            }
            ModelEvent::ThumbnailAvailable { item, thumbnail } => {
                self.thumbnails.push((item, thumbnail));
            }
        }
    }

    /// Insert one item into every tile on its path that exists.
    fn add_marker_index_to_grid(&mut self, item: ItemRef) {
        let Some(coordinates) = self.provider.item_coordinates(item) else {
            log::trace!("item {item:?} has no coordinates, not tiled");
            return;
        };
        let index = TileIndex::from_coordinates(&coordinates, MAX_LEVEL);
        let selected = self.provider.is_selected(item);
        if selected {
            self.selected.insert(item);
        }

        let mut tile = self.tiles.root();
        for level in 0..=MAX_LEVEL {
            self.tiles.data_mut(tile).push(item, selected);

            if self.tiles.children_empty(tile) {
                break;
            }

            let child = self
                .tiles
                .get_or_add_child(tile, index.linear_index(level));
            if level == MAX_LEVEL {
                self.tiles.data_mut(child).push(item, selected);
            }
            tile = child;
        }
    }

    /// Tiles holding `index`, from the root down to the first tile without children.
    ///
    /// Nothing is created or split; the chain ends early at a missing child.
    fn existing_chain(&self, index: &TileIndex) -> Vec<TileId> {
        let mut chain = Vec::with_capacity(index.index_count() + 1);
        let mut tile = self.tiles.root();
        chain.push(tile);
        for level in 0..index.index_count() {
            if self.tiles.children_empty(tile) {
                break;
            }
            let Some(child) = self.tiles.get_child(tile, index.linear_index(level)) else {
                break;
            };
            chain.push(child);
            tile = child;
        }
        chain
    }

    /// Remove one item from all tiles on its path and prune emptied tiles.
    ///
    /// References to items the provider no longer knows are swept out of the
    /// same tiles, together with their share of the selected count. Swept
    /// references stay in the selected set because tiles off this path may
    /// still hold them.
    fn remove_marker_index_from_grid(&mut self, item: ItemRef) {
        if self.is_dirty() {
            return;
        }
        let Some(coordinates) = self.provider.item_coordinates(item) else {
            return;
        };
        let selected = self.selected.remove(&item);
        let index = TileIndex::from_coordinates(&coordinates, MAX_LEVEL);
        let chain = self.existing_chain(&index);

        for tile in &chain {
            let provider = &self.provider;
            let selected_set = &self.selected;
            let data = self.tiles.data_mut(*tile);
            let mut released = 0;
            data.items.retain(|i| {
                let keep = *i != item && provider.is_valid(*i);
                if !keep && ((*i == item && selected) || selected_set.contains(i)) {
                    released += 1;
                }
                keep
            });
            assert!(data.selected_count >= released, "selected count underflow");
            data.selected_count -= released;
            assert!(
                data.selected_count <= data.items.len(),
                "selected count exceeds marker count"
            );
        }

        for pair in chain.windows(2).rev() {
            let (parent, tile) = (pair[0], pair[1]);
            if !self.tiles.data(tile).items.is_empty() {
                break;
            }
            self.tiles.delete_child(parent, tile);
        }
    }

    /// Adjust the selected counts on the path of `item`.
    ///
    /// A change already counted is ignored. Tiles split later take the
    /// selection from the selected set, so only the existing chain is touched.
    fn apply_selection_change(&mut self, item: ItemRef, selected: bool) {
        if self.is_dirty() {
            return;
        }
        let Some(coordinates) = self.provider.item_coordinates(item) else {
            return;
        };
        let changed = if selected {
            self.selected.insert(item)
        } else {
            self.selected.remove(&item)
        };
        if !changed {
            return;
        }
        let index = TileIndex::from_coordinates(&coordinates, MAX_LEVEL);

        for tile in self.existing_chain(&index) {
            let data = self.tiles.data_mut(tile);
            if selected {
                data.selected_count += 1;
                assert!(
                    data.selected_count <= data.items.len(),
                    "selected count exceeds marker count"
                );
            } else {
                assert!(data.selected_count > 0, "selected count underflow");
                data.selected_count -= 1;
            }
        }
    }

    /// Distribute the items of a childless tile at depth `level` into new children.
    fn split_tile(&mut self, tile: TileId, level: usize) {
        self.tiles.prepare_for_children(tile);
        let items = self.tiles.data(tile).items.clone();
        for item in items {
            let Some(coordinates) = self.provider.item_coordinates(item) else {
                continue;
            };
            let child_index = TileIndex::from_coordinates(&coordinates, level).last_index();
            let selected = self.selected.contains(&item);
            let child = self.tiles.get_or_add_child(tile, child_index);
            self.tiles.data_mut(child).push(item, selected);
        }
    }

    /// Items of all given tiles.
    fn collect_items(&mut self, tile_indices: &[TileIndex]) -> Vec<ItemRef> {
        let mut items = Vec::new();
        for index in tile_indices {
            if let Some(tile) = self.get_tile(index, true) {
                items.extend_from_slice(&self.tiles.data(tile).items);
            }
        }
        items
    }

    /// Select or deselect an item through the provider and update the counts.
    fn set_item_selected(&mut self, item: ItemRef, selected: bool) {
        if self.provider.is_selected(item) != selected {
            self.provider.select(item, selected);
        }
        if self.provider.is_selected(item) == selected {
            self.apply_selection_change(item, selected);
        }
    }
}

impl<P: ItemProvider> MarkerTiler for ItemMarkerTiler<P> {
    type Pixmap = P::Thumbnail;

    fn tiler_flags(&self) -> TilerFlags {
        if self.provider.model_flags().contains(ModelFlags::MOVABLE) {
            TilerFlags::MOVABLE
        } else {
            TilerFlags::empty()
        }
    }

    fn state(&self) -> TilerState {
        self.state
    }

    fn set_dirty(&mut self) {
        self.state = TilerState::Dirty;
        self.changed = true;
    }

    fn regenerate_tiles(&mut self) {
        self.tiles.reset();
        self.selected.clear();
        let root = self.tiles.root();
        self.tiles.prepare_for_children(root);
        self.state = TilerState::Clean;

        let count = self.provider.item_count();
        for row in 0..count {
            if let Some(item) = self.provider.item_at(row) {
                self.add_marker_index_to_grid(item);
            }
        }
        log::debug!(
            "regenerated tiles: {count} items, {} tiled",
            self.tiles.data(root).items.len()
        );
    }

    fn get_tile(&mut self, index: &TileIndex, stop_if_empty: bool) -> Option<TileId> {
        self.ensure_clean();

        let mut tile = self.tiles.root();
        for level in 0..index.index_count() {
            if self.tiles.children_empty(tile) {
                self.split_tile(tile, level);
            }
            let linear = index.linear_index(level);
            tile = match self.tiles.get_child(tile, linear) {
                Some(child) => child,
                None if stop_if_empty => return None,
                None => self.tiles.add_child(tile, linear),
            };
        }
        Some(tile)
    }

    fn tile_marker_count(&mut self, index: &TileIndex) -> usize {
        self.get_tile(index, true)
            .map_or(0, |t| self.tiles.data(t).items.len())
    }

    fn tile_selected_count(&mut self, index: &TileIndex) -> usize {
        self.get_tile(index, true)
            .map_or(0, |t| self.tiles.data(t).selected_count)
    }

    fn tile_group_state(&mut self, index: &TileIndex) -> GroupState {
        self.get_tile(index, true).map_or(GroupState::empty(), |t| {
            let data = self.tiles.data(t);
            GroupState::from_selected_count(data.selected_count, data.items.len())
        })
    }

    fn tile_marker_items(&mut self, index: &TileIndex) -> Vec<ItemRef> {
        self.get_tile(index, true)
            .map(|t| self.tiles.data(t).items.clone())
            .unwrap_or_default()
    }

    fn global_group_state(&self) -> GroupState {
        if self.provider.has_selection() {
            GroupState::SELECTED_MASK
        } else {
            GroupState::empty()
        }
    }

    fn tile_representative_marker(&mut self, index: &TileIndex, sort_key: i32) -> Option<ItemRef> {
        let tile = self.get_tile(index, true)?;
        self.provider
            .best_representative(&self.tiles.data(tile).items, sort_key)
    }

    fn best_representative_index_from_list(
        &self,
        items: &[ItemRef],
        sort_key: i32,
    ) -> Option<ItemRef> {
        self.provider.best_representative(items, sort_key)
    }

    fn pixmap_from_representative_index(&mut self, item: ItemRef, size: Size) -> Option<P::Thumbnail> {
        self.provider.thumbnail(item, size)
    }

    fn take_available_thumbnails(&mut self) -> Vec<(ItemRef, P::Thumbnail)> {
        core::mem::take(&mut self.thumbnails)
    }

    fn on_indices_clicked(&mut self, click: &ClickInfo) {
        let items = self.collect_items(&click.tile_indices);

        if click.mouse_mode.contains(MouseModes::SELECT_THUMBNAIL)
            && self.provider.supports_selection()
        {
            let do_select =
                (click.group_state & GroupState::SELECTED_MASK) != GroupState::SELECTED_ALL;
            for item in items {
                if self.provider.is_valid(item) {
                    self.set_item_selected(item, do_select);
                }
            }
            self.changed = true;
        } else if click.mouse_mode.contains(MouseModes::FILTER) {
            self.set_dirty();
            self.provider.on_indices_clicked(&items);
        }
    }

    fn on_indices_moved(
        &mut self,
        tile_indices: &[TileIndex],
        target: &GeoCoordinates,
        snap_target: Option<ItemRef>,
    ) {
        let items = self.collect_items(tile_indices);
        self.provider.on_indices_moved(&items, target, snap_target);
        self.set_dirty();
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn take_changed(&mut self) -> bool {
        core::mem::take(&mut self.changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iter::NonEmptyIterator;
    use crate::provider::MemoryProvider;
    use geotile_index::{GeoBounds, normalize_bounds};

    /// Deterministic spread of `n` points over a box.
    fn grid_points(n: usize, south: f64, west: f64, size: f64) -> Vec<GeoCoordinates> {
        let side = 13_usize;
        (0..n)
            .map(|i| {
                let fx = ((i % side) as f64 + 0.5) / side as f64;
                let fy = ((i / side % side) as f64 + 0.37) / side as f64;
                GeoCoordinates::new(south + fy * size, west + fx * size)
            })
            .collect()
    }

    fn tiler_with(points: &[GeoCoordinates]) -> ItemMarkerTiler<MemoryProvider> {
        let mut provider = MemoryProvider::new();
        for p in points {
            provider.push(Some(*p));
        }
        ItemMarkerTiler::new(provider)
    }

    fn level_index(c: GeoCoordinates, level: usize) -> TileIndex {
        TileIndex::from_coordinates(&c, level)
    }

    /// Check the selection invariant on every live tile reachable from the root.
    fn assert_selection_invariant(tiler: &ItemMarkerTiler<MemoryProvider>) {
        let tiles = tiler.tiles();
        let mut stack = alloc::vec![tiles.root()];
        while let Some(t) = stack.pop() {
            let d = tiles.data(t);
            assert!(d.selected_count <= d.items.len(), "selected count exceeds items");
            stack.extend(tiles.children(t).map(|(_, c)| c));
        }
    }

    #[test]
    fn lazy_rebuild_on_first_read() {
        let points = grid_points(20, 10.0, 20.0, 1.0);
        let mut tiler = tiler_with(&points);
        assert!(tiler.is_dirty());
        assert_eq!(tiler.tile_marker_count(&TileIndex::new()), 20);
        assert!(!tiler.is_dirty(), "a read must leave the tiler clean");

        tiler.set_dirty();
        assert!(tiler.is_dirty());
        let c = tiler.tile_marker_count(&level_index(points[0], 0));
        assert!(!tiler.is_dirty());
        assert_eq!(c, 20, "all points share the level-0 tile");
    }

    #[test]
    fn counts_match_rebuild_after_incremental_changes() {
        let points = grid_points(40, -5.0, 100.0, 3.0);
        let mut tiler = tiler_with(&points[..30]);
        // Touch a deep tile so that the tree is split before inserting.
        let _ = tiler.tile_marker_count(&level_index(points[0], 4));

        for p in &points[30..] {
            tiler.provider_mut().push(Some(*p));
        }
        tiler.handle_event(ModelEvent::RowsInserted {
            first: 30,
            last: 39,
        });
        tiler.handle_event(ModelEvent::RowsAboutToBeRemoved { first: 5, last: 9 });
        tiler.provider_mut().remove_rows(5, 9);
        assert!(!tiler.is_dirty(), "readable removals are applied incrementally");

        let probes: Vec<TileIndex> = points
            .iter()
            .flat_map(|p| (0..=MAX_LEVEL).map(move |l| level_index(*p, l)))
            .collect();
        let incremental: Vec<usize> = probes.iter().map(|i| tiler.tile_marker_count(i)).collect();
        tiler.set_dirty();
        let rebuilt: Vec<usize> = probes.iter().map(|i| tiler.tile_marker_count(i)).collect();
        assert_eq!(incremental, rebuilt);
        assert_eq!(tiler.tile_marker_count(&TileIndex::new()), 35);
    }

    #[test]
    fn removal_prunes_empty_tiles() {
        let a = GeoCoordinates::new(10.0, 10.0);
        let b = GeoCoordinates::new(-40.0, -100.0);
        let mut tiler = tiler_with(&[a, b]);
        assert_eq!(tiler.tile_marker_count(&level_index(a, MAX_LEVEL)), 1);
        assert_eq!(tiler.tile_marker_count(&level_index(b, MAX_LEVEL)), 1);
        let before = tiler.tiles().tile_count();

        tiler.handle_event(ModelEvent::RowsAboutToBeRemoved { first: 0, last: 0 });
        tiler.provider_mut().remove_rows(0, 0);
        assert!(tiler.tiles().tile_count() < before, "emptied tiles must be deleted");
        assert_eq!(tiler.get_tile(&level_index(a, 0), true), None);
        assert_eq!(tiler.tile_marker_count(&level_index(b, MAX_LEVEL)), 1);
    }

    #[test]
    fn unreadable_removal_falls_back_to_rebuild() {
        let points = grid_points(5, 0.0, 0.0, 1.0);
        let mut provider = MemoryProvider::new().with_readable_on_removal(false);
        for p in &points {
            provider.push(Some(*p));
        }
        let mut tiler = ItemMarkerTiler::new(provider);
        let _ = tiler.tile_marker_count(&TileIndex::new());
        tiler.handle_event(ModelEvent::RowsAboutToBeRemoved { first: 0, last: 1 });
        assert!(tiler.is_dirty());
        tiler.provider_mut().remove_rows(0, 1);
        assert_eq!(tiler.tile_marker_count(&TileIndex::new()), 3);
    }

    #[test]
    fn selection_counts_follow_events() {
        let points = grid_points(10, 45.0, 5.0, 0.5);
        let mut tiler = tiler_with(&points);
        let root = TileIndex::new();
        let deep = level_index(points[3], MAX_LEVEL);
        assert_eq!(tiler.tile_selected_count(&root), 0);

        let item = tiler.provider().item_at(3).unwrap();
        tiler.provider_mut().select(item, true);
        tiler.handle_event(ModelEvent::SelectionChanged {
            selected: alloc::vec![item],
            deselected: Vec::new(),
        });
        assert_eq!(tiler.tile_selected_count(&root), 1);
        assert_eq!(tiler.global_group_state(), GroupState::SELECTED_MASK);
        assert_eq!(tiler.tile_group_state(&root), GroupState::SELECTED_SOME);

        // The deep tiles are split after the selection and read it from the provider.
        assert_eq!(tiler.tile_selected_count(&deep), 1);
        assert_eq!(tiler.tile_group_state(&deep), GroupState::SELECTED_ALL);
        assert_selection_invariant(&tiler);

        tiler.provider_mut().select(item, false);
        tiler.handle_event(ModelEvent::SelectionChanged {
            selected: Vec::new(),
            deselected: alloc::vec![item],
        });
        assert_eq!(tiler.tile_selected_count(&root), 0);
        assert_eq!(tiler.tile_selected_count(&deep), 0);
        assert_eq!(tiler.global_group_state(), GroupState::empty());
        assert_selection_invariant(&tiler);
    }

    #[test]
    fn removing_a_selected_item_releases_its_selection() {
        let points = grid_points(6, 10.0, 10.0, 0.2);
        let mut tiler = tiler_with(&points);
        let item = tiler.provider().item_at(0).unwrap();
        tiler.provider_mut().select(item, true);
        let deep = level_index(points[0], MAX_LEVEL);
        assert_eq!(tiler.tile_selected_count(&deep), 1);

        tiler.handle_event(ModelEvent::RowsAboutToBeRemoved { first: 0, last: 0 });
        tiler.provider_mut().remove_rows(0, 0);
        assert!(!tiler.is_dirty());
        assert_eq!(tiler.tile_selected_count(&TileIndex::new()), 0);
        assert_eq!(tiler.tile_marker_count(&TileIndex::new()), 5);
        assert_selection_invariant(&tiler);
    }

    #[test]
    fn selection_read_before_its_event_is_counted_once() {
        let points = grid_points(4, 20.0, 20.0, 0.3);
        let mut tiler = tiler_with(&points);
        let _ = tiler.tile_marker_count(&TileIndex::new());
        let item = tiler.provider().item_at(1).unwrap();

        // A read between the provider change and its notification splits
        // tiles down to the deepest level.
        tiler.provider_mut().select(item, true);
        let deep = level_index(points[1], MAX_LEVEL);
        assert_eq!(tiler.tile_selected_count(&deep), 0, "not reported yet");

        tiler.handle_event(ModelEvent::SelectionChanged {
            selected: alloc::vec![item],
            deselected: Vec::new(),
        });
        for level in 0..=MAX_LEVEL {
            let index = level_index(points[1], level);
            assert_eq!(tiler.tile_selected_count(&index), 1, "level {level}");
        }
        assert_selection_invariant(&tiler);

        // A repeated notification changes nothing.
        tiler.handle_event(ModelEvent::SelectionChanged {
            selected: alloc::vec![item],
            deselected: Vec::new(),
        });
        assert_eq!(tiler.tile_selected_count(&TileIndex::new()), 1);
        assert_eq!(tiler.tile_selected_count(&deep), 1);

        tiler.provider_mut().select(item, false);
        tiler.handle_event(ModelEvent::SelectionChanged {
            selected: Vec::new(),
            deselected: alloc::vec![item, item],
        });
        assert_eq!(tiler.tile_selected_count(&TileIndex::new()), 0);
        assert_eq!(tiler.tile_selected_count(&deep), 0);
        assert_selection_invariant(&tiler);
    }

    #[test]
    fn unreported_removals_release_their_selection() {
        let points = grid_points(3, 10.0, 10.0, 0.01);
        let mut tiler = tiler_with(&points);
        let items: Vec<ItemRef> = (0..3).filter_map(|r| tiler.provider().item_at(r)).collect();
        for item in &items {
            tiler.provider_mut().select(*item, true);
        }
        let shared = level_index(points[0], 1);
        assert_eq!(tiler.tile_selected_count(&shared), 3);

        // The first row disappears without a notification and leaves a
        // stale reference behind.
        tiler.provider_mut().remove_rows(0, 0);
        let row = tiler.provider().row_of(items[1]).unwrap();
        tiler.handle_event(ModelEvent::RowsAboutToBeRemoved {
            first: row,
            last: row,
        });
        tiler.provider_mut().remove_rows(row, row);
        assert!(!tiler.is_dirty());
        assert_selection_invariant(&tiler);
        assert_eq!(tiler.tile_marker_count(&shared), 1);
        assert_eq!(tiler.tile_selected_count(&shared), 1);
        assert_eq!(tiler.tile_selected_count(&TileIndex::new()), 1);
    }

    #[test]
    fn invalidating_events_supersede_pending_notifications() {
        let points = grid_points(30, -10.0, 40.0, 2.0);
        let probes: Vec<TileIndex> = points
            .iter()
            .flat_map(|p| (0..=MAX_LEVEL).map(move |l| level_index(*p, l)))
            .collect();
        let mut fresh = tiler_with(&points);
        let expected: Vec<usize> = probes.iter().map(|i| fresh.tile_marker_count(i)).collect();

        let events = [
            ModelEvent::Reset,
            ModelEvent::LayoutChanged,
            ModelEvent::ModelChangedDrastically,
            ModelEvent::DataChanged { first: 0, last: 0 },
        ];
        for event in events {
            let mut tiler = tiler_with(&points[..20]);
            let _ = tiler.tile_marker_count(&level_index(points[0], 3));
            assert!(!tiler.is_dirty());
            let _ = tiler.take_changed();

            for p in &points[20..] {
                tiler.provider_mut().push(Some(*p));
            }
            tiler.handle_event(event);
            assert!(tiler.is_dirty(), "invalidating event marks the tiler dirty");
            assert!(tiler.take_changed(), "invalidating event is reported");

            // Already covered by the rebuild.
            tiler.handle_event(ModelEvent::RowsInserted {
                first: 20,
                last: 29,
            });
            let counts: Vec<usize> = probes.iter().map(|i| tiler.tile_marker_count(i)).collect();
            assert_eq!(counts, expected, "rebuild must not insert rows twice");
            assert_eq!(tiler.tile_marker_count(&TileIndex::new()), 30);
        }
    }

    #[test]
    fn data_change_retiles_a_moved_item() {
        let from = GeoCoordinates::new(12.3, 45.6);
        let to = GeoCoordinates::new(-60.1, -120.4);
        let mut tiler = tiler_with(&[from, GeoCoordinates::new(12.31, 45.61)]);
        assert_eq!(tiler.tile_marker_count(&level_index(from, 2)), 2);
        assert_eq!(tiler.tile_marker_count(&level_index(to, 2)), 0);

        let item = tiler.provider().item_at(0).unwrap();
        tiler.provider_mut().set_coordinates(item, Some(to));
        tiler.handle_event(ModelEvent::DataChanged { first: 0, last: 0 });
        assert!(tiler.is_dirty());

        assert_eq!(tiler.tile_marker_count(&level_index(from, 2)), 1);
        assert_eq!(tiler.tile_marker_items(&level_index(to, MAX_LEVEL)), [item]);
        assert_eq!(tiler.tile_marker_count(&TileIndex::new()), 2);
    }

    #[test]
    fn iterator_visits_each_non_empty_tile_once() {
        let mut points = grid_points(60, -20.0, -60.0, 50.0);
        points.push(GeoCoordinates::new(89.0, 179.0));
        points.push(GeoCoordinates::new(-89.0, -179.0));
        let mut tiler = tiler_with(&points);

        for level in 0..=3 {
            let expected: BTreeSet<TileIndex> =
                points.iter().map(|p| level_index(*p, level)).collect();
            let visited: Vec<TileIndex> = NonEmptyIterator::new(&mut tiler, level).collect();
            let unique: BTreeSet<TileIndex> = visited.iter().copied().collect();
            assert_eq!(unique.len(), visited.len(), "tile visited twice at level {level}");
            assert_eq!(unique, expected, "wrong tiles at level {level}");
            let mut sorted = visited.clone();
            sorted.sort();
            assert_eq!(sorted, visited, "depth-first ascending order");
            for index in &visited {
                assert!(tiler.tile_marker_count(index) > 0);
            }
        }
    }

    #[test]
    fn bounded_iteration_across_the_dateline() {
        let inside_east = GeoCoordinates::new(1.0, 178.5);
        let inside_west = GeoCoordinates::new(-1.0, -178.5);
        let outside = GeoCoordinates::new(1.0, 0.0);
        let mut tiler = tiler_with(&[inside_east, inside_west, outside]);

        let bounds = normalize_bounds(&GeoBounds::new(-5.0, 175.0, 5.0, -175.0));
        let level = 2;
        let visited: BTreeSet<TileIndex> =
            NonEmptyIterator::with_bounds(&mut tiler, level, &bounds).collect();
        let expected: BTreeSet<TileIndex> = [inside_east, inside_west]
            .iter()
            .map(|p| level_index(*p, level))
            .collect();
        assert_eq!(visited, expected);

        let none: Vec<TileIndex> = NonEmptyIterator::with_bounds(&mut tiler, level, &[]).collect();
        assert!(none.is_empty());
    }

    #[test]
    fn iteration_between_corner_indices() {
        let south_west = GeoCoordinates::new(-50.0, -100.0);
        let north_east = GeoCoordinates::new(40.0, 100.0);
        let inside = [
            GeoCoordinates::new(0.0, 0.0),
            GeoCoordinates::new(-45.0, -95.0),
            GeoCoordinates::new(39.0, 99.0),
        ];
        let outside = [
            GeoCoordinates::new(60.0, 0.0),
            GeoCoordinates::new(0.0, 150.0),
            GeoCoordinates::new(-80.0, -170.0),
        ];
        let mut tiler = tiler_with(&[inside.as_slice(), outside.as_slice()].concat());

        for level in 0..=2 {
            let start = level_index(south_west, level);
            let end = level_index(north_east, level);
            let visited: Vec<TileIndex> =
                NonEmptyIterator::with_indices(&mut tiler, level, start, end).collect();
            let expected: BTreeSet<TileIndex> =
                inside.iter().map(|p| level_index(*p, level)).collect();
            assert_eq!(
                visited,
                expected.iter().copied().collect::<Vec<_>>(),
                "ascending tiles inside the corners at level {level}"
            );
        }

        let single = level_index(inside[0], 1);
        let visited: Vec<TileIndex> =
            NonEmptyIterator::with_indices(&mut tiler, 1, single, single).collect();
        assert_eq!(visited, [single]);
    }

    #[test]
    fn end_to_end_150_items_at_level_3() {
        let points = grid_points(150, 30.0, 30.0, 1.0);
        let mut tiler = tiler_with(&points);
        let level = 3;
        let tiles: Vec<TileIndex> = NonEmptyIterator::new(&mut tiler, level).collect();
        let total: usize = tiles.iter().map(|i| tiler.tile_marker_count(i)).sum();
        assert_eq!(total, 150);
        for index in &tiles {
            let parent = index.mid(0, level);
            assert!(tiler.tile_marker_count(index) <= tiler.tile_marker_count(&parent));
        }
    }

    #[test]
    fn thumbnail_clicks_toggle_selection() {
        let points = grid_points(8, 0.0, 0.0, 0.01);
        let mut tiler = tiler_with(&points);
        let tile = level_index(points[0], 0);

        let click = ClickInfo {
            tile_indices: alloc::vec![tile],
            representative: None,
            group_state: tiler.tile_group_state(&tile),
            mouse_mode: MouseModes::SELECT_THUMBNAIL,
        };
        tiler.on_indices_clicked(&click);
        assert!(tiler.take_changed());
        assert_eq!(tiler.tile_selected_count(&tile), 8);
        assert_eq!(tiler.tile_group_state(&tile), GroupState::SELECTED_ALL);
        assert_selection_invariant(&tiler);

        let click = ClickInfo {
            group_state: tiler.tile_group_state(&tile),
            ..click
        };
        tiler.on_indices_clicked(&click);
        assert_eq!(tiler.tile_selected_count(&tile), 0);
        assert!(!tiler.provider().has_selection());
    }

    #[test]
    fn filter_click_and_move_mark_dirty() {
        let points = grid_points(4, 0.0, 0.0, 0.01);
        let provider = {
            let mut p = MemoryProvider::new().with_flags(ModelFlags::VISIBLE | ModelFlags::MOVABLE);
            for c in &points {
                p.push(Some(*c));
            }
            p
        };
        let mut tiler = ItemMarkerTiler::new(provider);
        assert_eq!(tiler.tiler_flags(), TilerFlags::MOVABLE);
        let tile = level_index(points[0], 1);
        assert_eq!(tiler.tile_marker_count(&tile), 4);

        tiler.on_indices_clicked(&ClickInfo {
            tile_indices: alloc::vec![tile],
            mouse_mode: MouseModes::FILTER,
            ..ClickInfo::default()
        });
        assert!(tiler.is_dirty());
        assert_eq!(tiler.provider().last_clicked().len(), 4);

        let target = GeoCoordinates::new(-30.0, -30.0);
        tiler.on_indices_moved(&[tile], &target, None);
        assert!(tiler.is_dirty());
        assert_eq!(tiler.tile_marker_count(&tile), 0);
        assert_eq!(tiler.tile_marker_count(&level_index(target, MAX_LEVEL)), 4);
    }

    #[test]
    fn inactive_tiler_only_marks_dirty() {
        let points = grid_points(3, 0.0, 0.0, 1.0);
        let mut tiler = tiler_with(&points);
        let _ = tiler.tile_marker_count(&TileIndex::new());
        tiler.set_active(false);
        tiler.provider_mut().push(Some(GeoCoordinates::new(2.0, 2.0)));
        tiler.handle_event(ModelEvent::RowsInserted { first: 3, last: 3 });
        assert!(tiler.is_dirty());
        assert_eq!(tiler.tile_marker_count(&TileIndex::new()), 4);
    }

    #[test]
    fn missing_coordinates_are_skipped() {
        let mut provider = MemoryProvider::new();
        provider.push(None);
        provider.push(Some(GeoCoordinates::invalid()));
        provider.push(Some(GeoCoordinates::new(1.0, 1.0)));
        let mut tiler = ItemMarkerTiler::new(provider);
        assert_eq!(tiler.tile_marker_count(&TileIndex::new()), 1);
    }

    #[test]
    fn thumbnails_queue_until_taken() {
        let mut tiler = tiler_with(&[GeoCoordinates::new(1.0, 1.0)]);
        let item = tiler.provider().item_at(0).unwrap();
        assert!(tiler
            .pixmap_from_representative_index(item, Size::new(40.0, 40.0))
            .is_none());
        let requests = tiler.provider_mut().take_thumbnail_requests();
        for (item, size) in requests {
            let thumbnail = tiler.provider().render_thumbnail(item, size);
            tiler.handle_event(ModelEvent::ThumbnailAvailable { item, thumbnail });
        }
        let available = tiler.take_available_thumbnails();
        assert_eq!(available.len(), 1);
        assert!(tiler.indices_equal(available[0].0, item));
        assert!(tiler.take_available_thumbnails().is_empty());
    }
}
