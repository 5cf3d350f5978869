// Copyright 2025 the Geotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The map view a [`TileGrouper`](crate::TileGrouper) groups for.

use alloc::vec::Vec;
use geotile_index::{GeoBounds, GeoCoordinates, normalize_bounds};
use kurbo::{Point, Size};

use crate::zoom::ZoomLevelTable;

/// A map view: its size, visible area, zoom, and projection.
///
/// Implemented by renderers. The grouper only reads from it.
pub trait MapBackend {
    /// False while the view cannot project yet (for example before its first layout).
    fn is_ready(&self) -> bool;

    /// Size of the view in pixels.
    fn map_size(&self) -> Size;

    /// Tile level at which markers are grouped for the current zoom.
    fn marker_tile_level(&self) -> usize;

    /// Visible area, split at the antimeridian.
    ///
    /// No returned box may cross the dateline.
    fn normalized_bounds(&self) -> Vec<GeoBounds>;

    /// Pixel position of `coordinates`, or `None` if they are not visible.
    fn screen_coordinates(&self, coordinates: &GeoCoordinates) -> Option<Point>;

    /// Geographic position under a pixel, or `None` if the pixel shows no map.
    fn geo_coordinates(&self, point: Point) -> Option<GeoCoordinates>;
}

/// A flat (equirectangular) view of a box of the globe.
///
/// Longitude maps linearly to x and latitude linearly to y, with north at the
/// top. Views that cross the antimeridian continue east past 180 degrees.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearBackend {
    bounds: GeoBounds,
    size: Size,
    zoom: u32,
    table: ZoomLevelTable,
}

impl LinearBackend {
    /// A view of `bounds` rendered at `size` pixels, zoom 0.
    pub fn new(bounds: GeoBounds, size: Size) -> Self {
        Self {
            bounds,
            size,
            zoom: 0,
            table: ZoomLevelTable::default(),
        }
    }

    /// Set the zoom fed to the zoom table.
    pub fn with_zoom(mut self, zoom: u32) -> Self {
        self.zoom = zoom;
        self
    }

    /// Replace the zoom table.
    pub fn with_table(mut self, table: ZoomLevelTable) -> Self {
        self.table = table;
        self
    }

    /// Visible box.
    pub fn bounds(&self) -> GeoBounds {
        self.bounds
    }

    /// Pan to a new visible box.
    pub fn set_bounds(&mut self, bounds: GeoBounds) {
        self.bounds = bounds;
    }

    /// Resize the view.
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Current zoom.
    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    /// Change the zoom.
    pub fn set_zoom(&mut self, zoom: u32) {
        self.zoom = zoom;
    }

    fn lon_span(&self) -> f64 {
        let span = self.bounds.east() - self.bounds.west();
        if self.bounds.crosses_dateline() {
            span + 360.0
        } else {
            span
        }
    }
}

impl MapBackend for LinearBackend {
    fn is_ready(&self) -> bool {
        self.size.width > 0.0
            && self.size.height > 0.0
            && self.bounds.north() > self.bounds.south()
            && self.lon_span() > 0.0
    }

    fn map_size(&self) -> Size {
        self.size
    }

    fn marker_tile_level(&self) -> usize {
        self.table.tile_level(self.zoom)
    }

    fn normalized_bounds(&self) -> Vec<GeoBounds> {
        normalize_bounds(&self.bounds)
    }

    fn screen_coordinates(&self, coordinates: &GeoCoordinates) -> Option<Point> {
        if !self.is_ready() || !self.bounds.contains(coordinates) {
            return None;
        }
        let mut lon = coordinates.lon;
        if self.bounds.crosses_dateline() && lon < self.bounds.west() {
            lon += 360.0;
        }
        let x = (lon - self.bounds.west()) / self.lon_span() * self.size.width;
        let y = (self.bounds.north() - coordinates.lat) / (self.bounds.north() - self.bounds.south())
            * self.size.height;
        Some(Point::new(x, y))
    }

    fn geo_coordinates(&self, point: Point) -> Option<GeoCoordinates> {
        if !self.is_ready()
            || point.x < 0.0
            || point.y < 0.0
            || point.x > self.size.width
            || point.y > self.size.height
        {
            return None;
        }
        let mut lon = self.bounds.west() + point.x / self.size.width * self.lon_span();
        if lon > 180.0 {
            lon -= 360.0;
        }
        let lat = self.bounds.north()
            - point.y / self.size.height * (self.bounds.north() - self.bounds.south());
        Some(GeoCoordinates::new(lat, lon))
    }
}
