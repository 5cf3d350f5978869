// Copyright 2025 the Geotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Clusters: groups of tiles drawn as one symbol.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use geotile_index::{GeoCoordinates, TileIndex};
use geotile_tiler::{GroupState, ItemRef};
use kurbo::{Point, Rect, Size, Vec2};

/// How a cluster is drawn.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum PixmapType {
    /// A pin, anchored at its bottom center.
    Marker,
    /// A circle with the marker count, centered on the cluster.
    #[default]
    Circle,
    /// A thumbnail of the representative item.
    Image,
}

/// Drawing chosen for a cluster by [`TileGrouper::cluster_pixmap`](crate::TileGrouper::cluster_pixmap).
#[derive(Clone, Debug, PartialEq)]
pub enum ClusterPixmap<P> {
    /// Draw the marker pin.
    Marker,
    /// Draw the count circle.
    Circle,
    /// Draw this thumbnail.
    Image(P),
}

/// A group of tiles shown as one symbol on the map.
#[derive(Clone, Debug)]
pub struct Cluster {
    /// Member tiles, all at the same level. The first is the seed tile.
    pub tile_indices: Vec<TileIndex>,
    /// Markers in all member tiles.
    pub marker_count: usize,
    /// Selected markers in all member tiles.
    pub marker_selected_count: usize,
    /// Position of the cluster: the seed tile's lower-left corner.
    pub coordinates: GeoCoordinates,
    /// Pixel position of the seed tile.
    pub pixel_pos: Point,
    /// Combined state of the member tiles.
    pub group_state: GroupState,
    /// Representative markers, cached per sort key.
    pub representative_markers: BTreeMap<i32, ItemRef>,
    /// Current drawing.
    pub pixmap_type: PixmapType,
    /// Size of the drawing in pixels.
    pub pixmap_size: Size,
    /// Anchor inside the drawing, measured from its bottom-left corner.
    pub pixmap_offset: Vec2,
}

impl Cluster {
    pub(crate) fn new(seed: TileIndex, coordinates: GeoCoordinates, pixel_pos: Point) -> Self {
        Self {
            tile_indices: Vec::from([seed]),
            marker_count: 0,
            marker_selected_count: 0,
            coordinates,
            pixel_pos,
            group_state: GroupState::empty(),
            representative_markers: BTreeMap::new(),
            pixmap_type: PixmapType::Circle,
            pixmap_size: Size::ZERO,
            pixmap_offset: Vec2::ZERO,
        }
    }

    /// Area covered by the drawing, in view pixels.
    pub fn pixmap_rect(&self) -> Rect {
        let left = self.pixel_pos.x - self.pixmap_offset.x;
        let bottom = self.pixel_pos.y + self.pixmap_offset.y;
        Rect::new(
            left,
            bottom - self.pixmap_size.height,
            left + self.pixmap_size.width,
            bottom,
        )
    }

    /// Set drawing type, size, and anchor together.
    pub fn set_pixmap(&mut self, pixmap_type: PixmapType, size: Size, offset: Vec2) {
        self.pixmap_type = pixmap_type;
        self.pixmap_size = size;
        self.pixmap_offset = offset;
    }
}
