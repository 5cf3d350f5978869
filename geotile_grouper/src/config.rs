// Copyright 2025 the Geotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grouping and cluster presentation settings.

use kurbo::Size;

/// Smallest allowed grouping radius for plain markers, in pixels.
pub const MIN_MARKER_GROUPING_RADIUS: u32 = 1;
/// Smallest allowed grouping radius when thumbnails are shown, in pixels.
pub const MIN_THUMBNAIL_GROUPING_RADIUS: u32 = 15;
/// Smallest allowed thumbnail edge, in pixels.
pub const MIN_THUMBNAIL_SIZE: u32 = 30;

/// Settings of a [`TileGrouper`](crate::TileGrouper).
///
/// The thumbnail never grows beyond twice the thumbnail grouping radius; the
/// setters adjust the other value to keep it that way.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupingConfig {
    marker_grouping_radius: u32,
    thumbnail_grouping_radius: u32,
    /// Grouping radius while editing, in pixels.
    pub edit_grouping_radius: u32,
    /// Show thumbnails instead of plain markers.
    pub show_thumbnails: bool,
    /// Editing mode: clusters are drawn as draggable markers.
    pub edit_mode: bool,
    thumbnail_size: u32,
    /// Show a thumbnail for clusters of a single item.
    pub preview_single_items: bool,
    /// Show a thumbnail for clusters of several items.
    pub preview_grouped_items: bool,
    /// Size of the marker pixmap used in edit mode.
    pub marker_pixmap_size: Size,
    /// Sort key passed to representative selection.
    pub sort_key: i32,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            marker_grouping_radius: MIN_MARKER_GROUPING_RADIUS,
            thumbnail_grouping_radius: MIN_THUMBNAIL_GROUPING_RADIUS,
            edit_grouping_radius: MIN_THUMBNAIL_GROUPING_RADIUS,
            show_thumbnails: true,
            edit_mode: false,
            thumbnail_size: MIN_THUMBNAIL_SIZE,
            preview_single_items: true,
            preview_grouped_items: true,
            marker_pixmap_size: Size::new(20.0, 32.0),
            sort_key: 0,
        }
    }
}

impl GroupingConfig {
    /// The radius in effect: edit radius in edit mode, else thumbnail radius
    /// when thumbnails are shown, else the marker radius.
    pub fn grouping_radius(&self) -> u32 {
        if self.edit_mode {
            self.edit_grouping_radius
        } else if self.show_thumbnails {
            self.thumbnail_grouping_radius
        } else {
            self.marker_grouping_radius
        }
    }

    /// Grouping radius for plain markers.
    pub fn marker_grouping_radius(&self) -> u32 {
        self.marker_grouping_radius
    }

    /// Set the plain-marker radius, at least [`MIN_MARKER_GROUPING_RADIUS`].
    pub fn set_marker_grouping_radius(&mut self, radius: u32) {
        self.marker_grouping_radius = radius.max(MIN_MARKER_GROUPING_RADIUS);
    }

    /// Grouping radius when thumbnails are shown.
    pub fn thumbnail_grouping_radius(&self) -> u32 {
        self.thumbnail_grouping_radius
    }

    /// Set the thumbnail radius, at least [`MIN_THUMBNAIL_GROUPING_RADIUS`].
    ///
    /// Shrinks the thumbnail if it no longer fits.
    pub fn set_thumbnail_grouping_radius(&mut self, radius: u32) {
        self.thumbnail_grouping_radius = radius.max(MIN_THUMBNAIL_GROUPING_RADIUS);
        if self.thumbnail_size > self.thumbnail_grouping_radius.saturating_mul(2) {
            self.thumbnail_size = self.thumbnail_grouping_radius.saturating_mul(2);
        }
    }

    /// Edge length of thumbnails, in pixels.
    pub fn thumbnail_size(&self) -> u32 {
        self.thumbnail_size
    }

    /// Set the thumbnail edge, at least [`MIN_THUMBNAIL_SIZE`].
    ///
    /// Grows the thumbnail grouping radius if the thumbnail no longer fits.
    pub fn set_thumbnail_size(&mut self, size: u32) {
        self.thumbnail_size = size.max(MIN_THUMBNAIL_SIZE);
        if self.thumbnail_size > self.thumbnail_grouping_radius.saturating_mul(2) {
            self.thumbnail_grouping_radius = self.thumbnail_size.div_ceil(2);
        }
    }

    /// Edge of a thumbnail drawn without a frame.
    pub fn undecorated_thumbnail_size(&self) -> u32 {
        self.thumbnail_size.saturating_sub(2)
    }

    /// The same settings with every minimum enforced.
    ///
    /// Deserialized settings skip the setters; [`TileGrouper`](crate::TileGrouper)
    /// normalizes whatever it is given.
    pub fn normalized(mut self) -> Self {
        self.marker_grouping_radius = self.marker_grouping_radius.max(MIN_MARKER_GROUPING_RADIUS);
        self.edit_grouping_radius = self.edit_grouping_radius.max(MIN_MARKER_GROUPING_RADIUS);
        self.set_thumbnail_grouping_radius(self.thumbnail_grouping_radius);
        self.set_thumbnail_size(self.thumbnail_size);
        self
    }
}
