// Copyright 2025 the Geotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Screen-space grouping of non-empty tiles.
//!
//! ## Overview
//!
//! Every pass projects the non-empty tiles of the visible area at the marker
//! tile level onto the view and bins them by pixel. Clusters are then seeded
//! greedily:
//!
//! - The most populated pixel that is at least half a grid cell away from all
//!   existing clusters seeds the next cluster.
//! - The new cluster absorbs every pixel within a quarter grid cell in x and y.
//! - Pixels that are too close to an existing cluster to seed one are set
//!   aside and join their nearest cluster once no more seeds are found.
//!
//! The grid cell is four times the grouping radius of
//! [`GroupingConfig::grouping_radius`].
//!
//! ## Driving the grouper
//!
//! The grouper holds no reference to the tiler. Pass the tiler to
//! [`TileGrouper::update_clusters`] whenever the view or the collection may
//! have changed; the pass is skipped unless something actually changed.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use geotile_index::{GeoCoordinates, TileIndex};
use geotile_tiler::{
    ClickInfo, GroupState, GroupStateComputer, ItemRef, MarkerTiler, MouseModes,
    NonEmptyIterator, TilerFlags,
};
use kurbo::{Point, Size, Vec2};

use crate::backend::MapBackend;
use crate::cluster::{Cluster, ClusterPixmap, PixmapType};
use crate::config::GroupingConfig;

/// Non-empty tiles that project onto one pixel.
#[derive(Debug, Default)]
struct PixelBin {
    marker_count: usize,
    tiles: Vec<TileIndex>,
}

/// A pixel set aside because it lies too close to an existing cluster.
#[derive(Debug)]
struct Leftover {
    x: usize,
    y: usize,
    bin: PixelBin,
}

fn square_distance(cluster: &Cluster, x: usize, y: usize) -> f64 {
    #[allow(
        clippy::cast_precision_loss,
        reason = "pixel coordinates are far below 2^52"
    )]
    let p = Point::new(x as f64, y as f64);
    (cluster.pixel_pos - p).hypot2()
}

/// Groups the tiles of a [`MarkerTiler`] into [`Cluster`]s for one map view.
pub struct TileGrouper<B> {
    config: GroupingConfig,
    backend: Option<B>,
    clusters: Vec<Cluster>,
    dirty: bool,
    moving_cluster: bool,
}

impl<B> core::fmt::Debug for TileGrouper<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TileGrouper")
            .field("config", &self.config)
            .field("has_backend", &self.backend.is_some())
            .field("clusters", &self.clusters.len())
            .field("dirty", &self.dirty)
            .field("moving_cluster", &self.moving_cluster)
            .finish_non_exhaustive()
    }
}

impl<B: MapBackend> TileGrouper<B> {
    /// A grouper without a view. Nothing is grouped until a backend is set.
    pub fn new(config: GroupingConfig) -> Self {
        Self {
            config: config.normalized(),
            backend: None,
            clusters: Vec::new(),
            dirty: true,
            moving_cluster: false,
        }
    }

    /// A grouper for `backend`.
    pub fn with_backend(config: GroupingConfig, backend: B) -> Self {
        let mut grouper = Self::new(config);
        grouper.backend = Some(backend);
        grouper
    }

    /// Current settings.
    pub fn config(&self) -> &GroupingConfig {
        &self.config
    }

    /// Replace the settings; clusters are recomputed on the next pass.
    ///
    /// Minimums are enforced as by [`GroupingConfig::normalized`].
    pub fn set_config(&mut self, config: GroupingConfig) {
        self.config = config.normalized();
        self.dirty = true;
    }

    /// The current view, if any.
    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    /// Mutable access to the current view.
    ///
    /// Panning or zooming through this handle does not mark the clusters
    /// dirty; call [`TileGrouper::set_clusters_dirty`] afterwards.
    pub fn backend_mut(&mut self) -> Option<&mut B> {
        self.backend.as_mut()
    }

    /// Switch views; returns the previous one.
    pub fn set_current_backend(&mut self, backend: Option<B>) -> Option<B> {
        self.dirty = true;
        core::mem::replace(&mut self.backend, backend)
    }

    /// Request a new grouping pass.
    pub fn set_clusters_dirty(&mut self) {
        self.dirty = true;
    }

    /// True if the next [`TileGrouper::update_clusters`] regroups.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Freeze the clusters while one of them is dragged.
    pub fn set_moving_cluster(&mut self, moving: bool) {
        self.moving_cluster = moving;
    }

    /// The clusters of the last pass.
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Regroup if the tiler changed or the clusters were marked dirty.
    ///
    /// Returns true if a grouping pass ran. No pass runs while a cluster is
    /// being moved, or while there is no ready view; in the latter case the
    /// clusters are emptied.
    pub fn update_clusters<T: MarkerTiler + ?Sized>(&mut self, tiler: &mut T) -> bool {
        if tiler.take_changed() {
            self.dirty = true;
        }
        if self.moving_cluster || !self.dirty {
            return false;
        }
        self.dirty = false;
        self.clusters.clear();

        let Some(backend) = self.backend.as_ref().filter(|b| b.is_ready()) else {
            return false;
        };

        let radius = self.config.grouping_radius();
        let grid_size = radius.saturating_mul(4);
        let level = backend.marker_tile_level();
        let bounds = backend.normalized_bounds();
        let map_size = backend.map_size();
        #[allow(
            clippy::cast_possible_truncation,
            reason = "view sizes are small positive pixel counts"
        )]
        let (width, height) = (map_size.width.max(0.0) as usize, map_size.height.max(0.0) as usize);

        for b in &bounds {
            let upper_left = GeoCoordinates::new(b.north(), b.west());
            let lower_right = GeoCoordinates::new(b.south(), b.east());
            tiler.prepare_tiles(&upper_left, &lower_right, level);
        }

        let tiles: Vec<TileIndex> = NonEmptyIterator::with_bounds(tiler, level, &bounds).collect();

        let mut pixels: BTreeMap<usize, PixelBin> = BTreeMap::new();
        let mut projected = 0_usize;
        for index in &tiles {
            let Some(point) = backend.screen_coordinates(&index.to_coordinates()) else {
                log::trace!("tile {index} is not on screen");
                continue;
            };
            if point.x < 0.0 || point.y < 0.0 {
                continue;
            }
            #[allow(
                clippy::cast_possible_truncation,
                reason = "non-negative and bounded by the view size below"
            )]
            let (x, y) = (point.x as usize, point.y as usize);
            if x >= width || y >= height {
                continue;
            }
            projected += 1;
            let bin = pixels.entry(x + y * width).or_default();
            bin.marker_count += tiler.tile_marker_count(index);
            bin.tiles.push(*index);
        }

        let half_grid = f64::from(grid_size / 2);
        let too_close_sq = half_grid * half_grid;
        let eat_radius = usize::try_from(grid_size / 4).unwrap_or(usize::MAX);
        let mut leftovers: Vec<Leftover> = Vec::new();
        loop {
            let mut seed: Option<(usize, usize)> = None;
            let mut rejected: Vec<usize> = Vec::new();
            for (&linear, bin) in &pixels {
                if bin.marker_count <= seed.map_or(0, |(_, count)| count) {
                    continue;
                }
                let (x, y) = (linear % width, linear / width);
                if self
                    .clusters
                    .iter()
                    .any(|c| square_distance(c, x, y) < too_close_sq)
                {
                    rejected.push(linear);
                } else {
                    seed = Some((linear, bin.marker_count));
                }
            }
            for linear in rejected {
                if let Some(bin) = pixels.remove(&linear) {
                    leftovers.push(Leftover {
                        x: linear % width,
                        y: linear / width,
                        bin,
                    });
                }
            }

            let Some((seed_linear, _)) = seed else {
                break;
            };
            let Some(seed_bin) = pixels.remove(&seed_linear) else {
                break;
            };
            let (seed_x, seed_y) = (seed_linear % width, seed_linear / width);
            let Some(&first) = seed_bin.tiles.first() else {
                continue;
            };
            #[allow(
                clippy::cast_precision_loss,
                reason = "pixel coordinates are far below 2^52"
            )]
            let pixel_pos = Point::new(seed_x as f64, seed_y as f64);
            let mut cluster = Cluster::new(first, first.to_coordinates(), pixel_pos);
            cluster.tile_indices = seed_bin.tiles;
            cluster.marker_count = seed_bin.marker_count;

            let x_start = seed_x.saturating_sub(eat_radius);
            let x_end = seed_x.saturating_add(eat_radius).min(width - 1);
            let y_start = seed_y.saturating_sub(eat_radius);
            let y_end = seed_y.saturating_add(eat_radius).min(height - 1);
            for y in y_start..=y_end {
                let row: Vec<usize> = pixels
                    .range(x_start + y * width..=x_end + y * width)
                    .map(|(&linear, _)| linear)
                    .collect();
                for linear in row {
                    if let Some(bin) = pixels.remove(&linear) {
                        cluster.marker_count += bin.marker_count;
                        cluster.tile_indices.extend(bin.tiles);
                    }
                }
            }
            self.clusters.push(cluster);
        }

        for leftover in leftovers {
            let mut closest: Option<(usize, f64)> = None;
            for (i, cluster) in self.clusters.iter().enumerate() {
                let d = square_distance(cluster, leftover.x, leftover.y);
                if closest.is_none_or(|(_, best)| d < best) {
                    closest = Some((i, d));
                }
            }
            if let Some((i, _)) = closest {
                let cluster = &mut self.clusters[i];
                cluster.marker_count += leftover.bin.marker_count;
                cluster.tile_indices.extend(leftover.bin.tiles);
            }
        }

        let any_selected = tiler
            .global_group_state()
            .intersects(GroupState::SELECTED_MASK);
        let mut computer = GroupStateComputer::new();
        for cluster in &mut self.clusters {
            cluster.marker_selected_count = cluster
                .tile_indices
                .iter()
                .map(|index| tiler.tile_selected_count(index))
                .sum();
            cluster.group_state = if any_selected {
                computer.clear();
                for index in &cluster.tile_indices {
                    computer.add_state(tiler.tile_group_state(index));
                }
                computer.state()
            } else {
                GroupState::empty()
            };
        }

        for i in 0..self.clusters.len() {
            self.apply_default_layout(i);
        }

        log::debug!(
            "grouped {} non-empty tiles at level {level} ({projected} on screen) into {} clusters",
            tiles.len(),
            self.clusters.len()
        );
        true
    }

    /// Edit mode and plain markers use the marker pin; thumbnails start as
    /// circles until an image is available.
    fn apply_default_layout(&mut self, index: usize) {
        let marker_size = self.config.marker_pixmap_size;
        let circle = 2.0 * f64::from(self.config.thumbnail_size() / 2 + 1);
        let show_marker = self.config.edit_mode || !self.config.show_thumbnails;
        let cluster = &mut self.clusters[index];
        if show_marker {
            cluster.set_pixmap(
                PixmapType::Marker,
                marker_size,
                Vec2::new(marker_size.width / 2.0, 0.0),
            );
        } else {
            cluster.set_pixmap(
                PixmapType::Circle,
                Size::new(circle, circle),
                Vec2::new(circle / 2.0, circle / 2.0),
            );
        }
    }

    /// Choose the drawing of a cluster and update its layout to match.
    ///
    /// Requests a thumbnail of the representative marker when previews are
    /// enabled for the cluster's size. A thumbnail that is not available yet
    /// falls back to the circle; it can be picked up later with
    /// [`TileGrouper::take_cluster_thumbnails`].
    pub fn cluster_pixmap<T: MarkerTiler + ?Sized>(
        &mut self,
        tiler: &mut T,
        index: usize,
    ) -> ClusterPixmap<T::Pixmap> {
        self.apply_default_layout(index);
        if self.clusters[index].pixmap_type == PixmapType::Marker {
            return ClusterPixmap::Marker;
        }

        let preview = if self.clusters[index].marker_count == 1 {
            self.config.preview_single_items
        } else {
            self.config.preview_grouped_items
        };
        if !preview {
            return ClusterPixmap::Circle;
        }

        let Some(item) = self.cluster_representative_marker(tiler, index, self.config.sort_key)
        else {
            return ClusterPixmap::Circle;
        };
        let edge = f64::from(self.config.undecorated_thumbnail_size());
        match tiler.pixmap_from_representative_index(item, Size::new(edge, edge)) {
            Some(pixmap) => {
                self.apply_image_layout(index);
                ClusterPixmap::Image(pixmap)
            }
            None => ClusterPixmap::Circle,
        }
    }

    fn apply_image_layout(&mut self, index: usize) {
        let edge = f64::from(self.config.thumbnail_size());
        self.clusters[index].set_pixmap(
            PixmapType::Image,
            Size::new(edge, edge),
            Vec2::new(edge / 2.0, edge / 2.0),
        );
    }

    /// Match thumbnails that arrived since the last call to the clusters they depict.
    ///
    /// Returns, per thumbnail, the clusters whose representative under the
    /// configured sort key is the depicted item, and switches those clusters
    /// to the image layout. Thumbnails that depict no cluster are dropped.
    pub fn take_cluster_thumbnails<T: MarkerTiler + ?Sized>(
        &mut self,
        tiler: &mut T,
    ) -> Vec<(Vec<usize>, T::Pixmap)> {
        let mut matched = Vec::new();
        for (item, pixmap) in tiler.take_available_thumbnails() {
            let clusters = self.clusters_for_representative(tiler, item);
            if clusters.is_empty() {
                continue;
            }
            for &index in &clusters {
                self.apply_image_layout(index);
            }
            matched.push((clusters, pixmap));
        }
        matched
    }

    /// Representative marker of a cluster under `sort_key`, cached per key.
    pub fn cluster_representative_marker<T: MarkerTiler + ?Sized>(
        &mut self,
        tiler: &mut T,
        index: usize,
        sort_key: i32,
    ) -> Option<ItemRef> {
        let cluster = &mut self.clusters[index];
        if let Some(item) = cluster.representative_markers.get(&sort_key) {
            return Some(*item);
        }
        let candidates: Vec<ItemRef> = cluster
            .tile_indices
            .iter()
            .filter_map(|tile| tiler.tile_representative_marker(tile, sort_key))
            .collect();
        let best = tiler.best_representative_index_from_list(&candidates, sort_key)?;
        cluster.representative_markers.insert(sort_key, best);
        Some(best)
    }

    /// Clusters whose representative under the configured sort key is `item`.
    pub fn clusters_for_representative<T: MarkerTiler + ?Sized>(
        &mut self,
        tiler: &mut T,
        item: ItemRef,
    ) -> Vec<usize> {
        let sort_key = self.config.sort_key;
        (0..self.clusters.len())
            .filter(|&i| {
                self.cluster_representative_marker(tiler, i, sort_key)
                    .is_some_and(|r| tiler.indices_equal(r, item))
            })
            .collect()
    }

    /// The topmost cluster whose drawing covers `point`.
    pub fn cluster_at(&self, point: Point) -> Option<usize> {
        self.clusters
            .iter()
            .rposition(|c| c.pixmap_rect().contains(point))
    }

    /// Forward a click on a cluster to the tiler.
    pub fn click_cluster<T: MarkerTiler + ?Sized>(
        &mut self,
        tiler: &mut T,
        index: usize,
        mouse_mode: MouseModes,
    ) {
        let representative = self.cluster_representative_marker(tiler, index, self.config.sort_key);
        let cluster = &self.clusters[index];
        let click = ClickInfo {
            tile_indices: cluster.tile_indices.clone(),
            representative,
            group_state: cluster.group_state,
            mouse_mode,
        };
        tiler.on_indices_clicked(&click);
    }

    /// Drop a dragged cluster at `point`, optionally onto `snap_target`.
    ///
    /// Returns false, leaving everything unchanged, if the tiler's markers
    /// cannot be moved or `point` shows no map.
    pub fn move_cluster<T: MarkerTiler + ?Sized>(
        &mut self,
        tiler: &mut T,
        index: usize,
        point: Point,
        snap_target: Option<ItemRef>,
    ) -> bool {
        if !tiler.tiler_flags().contains(TilerFlags::MOVABLE) {
            log::warn!("cluster {index} cannot be moved: markers are not movable");
            return false;
        }
        let Some(target) = self.backend.as_ref().and_then(|b| b.geo_coordinates(point)) else {
            return false;
        };
        let tile_indices = self.clusters[index].tile_indices.clone();
        tiler.on_indices_moved(&tile_indices, &target, snap_target);
        self.moving_cluster = false;
        self.dirty = true;
        true
    }
}
