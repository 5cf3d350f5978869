// Copyright 2025 the Geotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arena-backed 100-way tile tree.

use alloc::boxed::Box;
use alloc::vec::Vec;

use geotile_index::MAX_LINEAR_INDEX;

const CHILD_COUNT: usize = MAX_LINEAR_INDEX as usize;

/// Child slots of a tile, indexed by linear index.
pub type TileChildren = Box<[Option<TileId>; CHILD_COUNT]>;

/// Identifier for a tile in a [`TileStore`] (generational).
///
/// Ids of deleted tiles never alias a tile created later in the same slot,
/// because the generation must match.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TileId(u32, u32);

impl TileId {
    const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
struct Tile<D> {
    generation: u32,
    children: Option<TileChildren>,
    data: D,
}

/// Owner of a tree of tiles carrying payload `D`.
///
/// The root always exists. Children arrays are allocated on the first child
/// ("prepared for children") and every tile is owned by exactly one parent
/// slot. Deletion goes through [`TileStore::delete_child`] and
/// [`TileStore::delete_children`], which drop the payload of every removed tile.
pub struct TileStore<D> {
    tiles: Vec<Option<Tile<D>>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    root: TileId,
}

impl<D> core::fmt::Debug for TileStore<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.tiles.len();
        let alive = self.tiles.iter().filter(|t| t.is_some()).count();
        f.debug_struct("TileStore")
            .field("tiles_total", &total)
            .field("tiles_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl<D: Default> Default for TileStore<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Default> TileStore<D> {
    /// A store holding only an empty root tile.
    pub fn new() -> Self {
        let mut store = Self {
            tiles: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            root: TileId::new(0, 0),
        };
        store.root = store.alloc(D::default());
        store
    }

    /// Drop the whole tree and start over with a fresh root.
    pub fn reset(&mut self) {
        self.free_list.clear();
        for (idx, tile) in self.tiles.iter_mut().enumerate() {
            *tile = None;
            self.free_list.push(idx);
        }
        self.root = self.alloc(D::default());
    }

    /// Create a child of `parent` at `index` with a default payload.
    ///
    /// An existing child in that slot is deleted first.
    pub fn add_child(&mut self, parent: TileId, index: u8) -> TileId {
        let child = self.alloc(D::default());
        if let Some(old) = self.set_child_slot(parent, index, Some(child)) {
            self.delete_subtree(old);
        }
        child
    }

    /// The child of `parent` at `index`, created if missing.
    pub fn get_or_add_child(&mut self, parent: TileId, index: u8) -> TileId {
        match self.get_child(parent, index) {
            Some(child) => child,
            None => self.add_child(parent, index),
        }
    }
}

impl<D> TileStore<D> {
    fn alloc(&mut self, data: D) -> TileId {
        if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.tiles[idx] = Some(Tile {
                generation,
                children: None,
                data,
            });
            #[allow(
                clippy::cast_possible_truncation,
                reason = "TileId uses 32-bit indices by design."
            )]
            TileId::new(idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.tiles.push(Some(Tile {
                generation,
                children: None,
                data,
            }));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "TileId uses 32-bit indices by design."
            )]
            TileId::new((self.tiles.len() - 1) as u32, generation)
        }
    }

    fn tile(&self, id: TileId) -> &Tile<D> {
        match self.tiles.get(id.idx()).and_then(Option::as_ref) {
            Some(t) if t.generation == id.1 => t,
            _ => panic!("dangling TileId {id:?}"),
        }
    }

    fn tile_mut(&mut self, id: TileId) -> &mut Tile<D> {
        match self.tiles.get_mut(id.idx()).and_then(Option::as_mut) {
            Some(t) if t.generation == id.1 => t,
            _ => panic!("dangling TileId {id:?}"),
        }
    }

    fn set_child_slot(
        &mut self,
        parent: TileId,
        index: u8,
        child: Option<TileId>,
    ) -> Option<TileId> {
        assert!(index < MAX_LINEAR_INDEX, "child index {index} out of range");
        let tile = self.tile_mut(parent);
        if child.is_none() && tile.children.is_none() {
            return None;
        }
        let children = tile.children.get_or_insert_with(|| Box::new([None; CHILD_COUNT]));
        core::mem::replace(&mut children[usize::from(index)], child)
    }

    fn delete_subtree(&mut self, id: TileId) {
        let mut stack = Vec::from([id]);
        while let Some(id) = stack.pop() {
            let tile = self.tiles[id.idx()].take();
            if let Some(children) = tile.and_then(|t| t.children) {
                stack.extend(children.iter().flatten().copied());
            }
            self.free_list.push(id.idx());
        }
    }

    /// The root tile.
    pub fn root(&self) -> TileId {
        self.root
    }

    /// Returns true if `id` refers to a live tile.
    pub fn is_alive(&self, id: TileId) -> bool {
        self.tiles
            .get(id.idx())
            .and_then(|t| t.as_ref())
            .is_some_and(|t| t.generation == id.1)
    }

    /// Number of live tiles, root included.
    pub fn tile_count(&self) -> usize {
        self.tiles.len() - self.free_list.len()
    }

    /// Payload of a tile; panics if `id` is stale.
    pub fn data(&self, id: TileId) -> &D {
        &self.tile(id).data
    }

    /// Mutable payload of a tile; panics if `id` is stale.
    pub fn data_mut(&mut self, id: TileId) -> &mut D {
        &mut self.tile_mut(id).data
    }

    /// Allocate the children array of `id` with every slot empty.
    pub fn prepare_for_children(&mut self, id: TileId) {
        let tile = self.tile_mut(id);
        if tile.children.is_none() {
            tile.children = Some(Box::new([None; CHILD_COUNT]));
        }
    }

    /// True if the children array was never allocated.
    pub fn children_empty(&self, id: TileId) -> bool {
        self.tile(id).children.is_none()
    }

    /// The child at linear `index`, if present.
    pub fn get_child(&self, id: TileId, index: u8) -> Option<TileId> {
        assert!(index < MAX_LINEAR_INDEX, "child index {index} out of range");
        self.tile(id)
            .children
            .as_ref()
            .and_then(|c| c[usize::from(index)])
    }

    /// Empty the slot at `index` without deleting the tile that was there.
    ///
    /// The detached tile is returned; the caller becomes responsible for it.
    /// Clearing a slot of a tile without children is a no-op.
    pub fn clear_child(&mut self, id: TileId, index: u8) -> Option<TileId> {
        self.set_child_slot(id, index, None)
    }

    /// The slot in which `parent` holds `child`.
    pub fn index_of_child_tile(&self, parent: TileId, child: TileId) -> Option<u8> {
        let children = self.tile(parent).children.as_ref()?;
        children
            .iter()
            .position(|c| *c == Some(child))
            .and_then(|p| u8::try_from(p).ok())
    }

    /// Detach the children array, leaving `id` childless.
    pub fn take_children(&mut self, id: TileId) -> Option<TileChildren> {
        self.tile_mut(id).children.take()
    }

    /// Delete every descendant of `id`.
    pub fn delete_children(&mut self, id: TileId) {
        if let Some(children) = self.take_children(id) {
            for child in children.iter().flatten() {
                self.delete_subtree(*child);
            }
        }
    }

    /// Delete the child `child` of `parent` with its subtree.
    pub fn delete_child(&mut self, parent: TileId, child: TileId) {
        if let Some(index) = self.index_of_child_tile(parent, child) {
            self.clear_child(parent, index);
            self.delete_subtree(child);
        }
    }

    /// Iterate the present children of `id` as `(linear index, id)` pairs.
    pub fn children(&self, id: TileId) -> impl Iterator<Item = (u8, TileId)> + '_ {
        self.tile(id)
            .children
            .iter()
            .flat_map(|c| c.iter().enumerate())
            .filter_map(|(i, c)| Some((u8::try_from(i).ok()?, (*c)?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn children_are_allocated_lazily() {
        let mut store: TileStore<u32> = TileStore::new();
        let root = store.root();
        assert!(store.children_empty(root));
        assert_eq!(store.clear_child(root, 3), None, "clearing on a leaf is a no-op");
        assert!(store.children_empty(root), "no-op must not allocate");

        let c = store.add_child(root, 42);
        assert!(!store.children_empty(root));
        assert_eq!(store.get_child(root, 42), Some(c));
        assert_eq!(store.get_child(root, 41), None);
        assert_eq!(store.index_of_child_tile(root, c), Some(42));
        assert_eq!(store.children(root).collect::<Vec<_>>(), [(42, c)]);
        assert_eq!(store.tile_count(), 2);
    }

    #[test]
    fn delete_child_drops_subtree_and_reuses_slots() {
        let mut store: TileStore<Vec<u32>> = TileStore::new();
        let root = store.root();
        let a = store.add_child(root, 1);
        let b = store.add_child(a, 2);
        store.data_mut(b).push(7);
        assert_eq!(store.tile_count(), 3);

        store.delete_child(root, a);
        assert!(!store.is_alive(a));
        assert!(!store.is_alive(b));
        assert_eq!(store.get_child(root, 1), None);
        assert_eq!(store.tile_count(), 1);

        let c = store.add_child(root, 5);
        assert!(store.is_alive(c));
        assert!(!store.is_alive(a), "stale id must stay stale after slot reuse");
        assert!(store.data(c).is_empty(), "reused slot starts with a fresh payload");
    }

    #[test]
    fn take_and_delete_children() {
        let mut store: TileStore<()> = TileStore::new();
        let root = store.root();
        let a = store.get_or_add_child(root, 0);
        assert_eq!(store.get_or_add_child(root, 0), a);
        let _ = store.add_child(root, 99);

        let detached = store.take_children(root).unwrap();
        assert!(store.children_empty(root));
        assert_eq!(detached.iter().flatten().count(), 2);

        store.prepare_for_children(root);
        let _ = store.add_child(root, 10);
        store.delete_children(root);
        assert!(store.children_empty(root));
    }

    #[test]
    fn reset_leaves_a_single_root() {
        let mut store: TileStore<u8> = TileStore::new();
        let old_root = store.root();
        let child = store.add_child(old_root, 9);
        store.reset();
        assert_eq!(store.tile_count(), 1);
        assert!(store.is_alive(store.root()));
        assert!(!store.is_alive(child));
        assert!(!store.is_alive(old_root), "ids from before the reset must not alias");
    }
}
