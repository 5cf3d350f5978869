// Copyright 2025 the Geotile Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geographic coordinates and lat/lon bounding boxes.

use alloc::vec;
use alloc::vec::Vec;

/// A position on the globe, in degrees.
///
/// Coordinates whose latitude or longitude is not finite are treated as
/// "no coordinates" everywhere in this workspace; see [`GeoCoordinates::has_coordinates`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoCoordinates {
    /// Latitude, `-90..=90`.
    pub lat: f64,
    /// Longitude, `-180..=180`.
    pub lon: f64,
    /// Optional altitude in meters.
    pub alt: Option<f64>,
}

impl GeoCoordinates {
    /// Create coordinates without altitude.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            alt: None,
        }
    }

    /// Create coordinates with an altitude.
    pub const fn with_altitude(lat: f64, lon: f64, alt: f64) -> Self {
        Self {
            lat,
            lon,
            alt: Some(alt),
        }
    }

    /// Coordinates that carry no position at all.
    pub const fn invalid() -> Self {
        Self {
            lat: f64::NAN,
            lon: f64::NAN,
            alt: None,
        }
    }

    /// True if both latitude and longitude are usable.
    pub fn has_coordinates(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// True if an altitude is present.
    pub fn has_altitude(&self) -> bool {
        self.alt.is_some()
    }
}

/// A lat/lon rectangle given by its south-west and north-east corners.
///
/// A box whose east edge lies west of its west edge wraps across the
/// antimeridian. Use [`normalize_bounds`] to split it into boxes that do not.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoBounds {
    /// Lower-left corner (minimum latitude, west longitude).
    pub south_west: GeoCoordinates,
    /// Upper-right corner (maximum latitude, east longitude).
    pub north_east: GeoCoordinates,
}

impl GeoBounds {
    /// Create bounds from the four edges.
    pub const fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south_west: GeoCoordinates::new(south, west),
            north_east: GeoCoordinates::new(north, east),
        }
    }

    /// The whole globe.
    pub const fn world() -> Self {
        Self::new(-90.0, -180.0, 90.0, 180.0)
    }

    /// Southern edge.
    pub fn south(&self) -> f64 {
        self.south_west.lat
    }

    /// Western edge.
    pub fn west(&self) -> f64 {
        self.south_west.lon
    }

    /// Northern edge.
    pub fn north(&self) -> f64 {
        self.north_east.lat
    }

    /// Eastern edge.
    pub fn east(&self) -> f64 {
        self.north_east.lon
    }

    /// True if the box wraps across the antimeridian.
    pub fn crosses_dateline(&self) -> bool {
        self.east() < self.west()
    }

    /// Whether the point lies inside the box (edges inclusive).
    ///
    /// Boxes that cross the dateline are handled by checking both halves.
    pub fn contains(&self, coordinates: &GeoCoordinates) -> bool {
        if !coordinates.has_coordinates() {
            return false;
        }
        if coordinates.lat < self.south() || coordinates.lat > self.north() {
            return false;
        }
        if self.crosses_dateline() {
            coordinates.lon >= self.west() || coordinates.lon <= self.east()
        } else {
            coordinates.lon >= self.west() && coordinates.lon <= self.east()
        }
    }
}

/// Split bounds that cross the antimeridian into two boxes.
///
/// Bounds that do not cross are returned unchanged as the only element.
/// The western part (ending at the dateline's east side) comes first.
///
/// ```
/// use geotile_index::{GeoBounds, normalize_bounds};
///
/// let parts = normalize_bounds(&GeoBounds::new(10.0, 20.0, 15.0, -170.0));
/// assert_eq!(
///     parts,
///     [
///         GeoBounds::new(10.0, -180.0, 15.0, -170.0),
///         GeoBounds::new(10.0, 20.0, 15.0, 180.0),
///     ]
/// );
/// ```
pub fn normalize_bounds(bounds: &GeoBounds) -> Vec<GeoBounds> {
    let south = bounds.south();
    let north = bounds.north();
    let west = bounds.west();
    let east = bounds.east();

    if bounds.crosses_dateline() {
        vec![
            GeoBounds::new(south, -180.0, north, east),
            GeoBounds::new(south, west, north, 180.0),
        ]
    } else {
        vec![GeoBounds::new(south, west, north, east)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dateline_crossing_bounds_split_in_two() {
        let parts = normalize_bounds(&GeoBounds::new(10.0, 20.0, 15.0, -170.0));
        assert_eq!(parts.len(), 2, "crossing bounds must be split");
        assert_eq!(parts[0], GeoBounds::new(10.0, -180.0, 15.0, -170.0));
        assert_eq!(parts[1], GeoBounds::new(10.0, 20.0, 15.0, 180.0));
    }

    #[test]
    fn plain_bounds_pass_through() {
        let parts = normalize_bounds(&GeoBounds::new(10.0, 20.0, 12.0, 22.0));
        assert_eq!(parts, [GeoBounds::new(10.0, 20.0, 12.0, 22.0)]);
    }

    #[test]
    fn missing_coordinates() {
        assert!(!GeoCoordinates::invalid().has_coordinates());
        assert!(!GeoCoordinates::new(f64::INFINITY, 3.0).has_coordinates());
        assert!(GeoCoordinates::new(0.0, 0.0).has_coordinates());
        assert!(GeoCoordinates::with_altitude(1.0, 2.0, 300.0).has_altitude());
    }

    #[test]
    fn contains_wraps_across_dateline() {
        let b = GeoBounds::new(-10.0, 170.0, 10.0, -170.0);
        assert!(b.crosses_dateline());
        assert!(b.contains(&GeoCoordinates::new(0.0, 175.0)));
        assert!(b.contains(&GeoCoordinates::new(0.0, -175.0)));
        assert!(!b.contains(&GeoCoordinates::new(0.0, 0.0)));
        assert!(!b.contains(&GeoCoordinates::new(20.0, 175.0)));
    }
}
