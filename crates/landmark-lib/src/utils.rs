//! Utility functions for coordinate validation and planar degree geometry

use geo::{Coord, Rect};

/// WGS-84 longitude bounds in degrees
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

/// WGS-84 latitude bounds in degrees
pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;

/// Default minimum spacing between captured boundary vertices, in degrees
/// (about 10 m at mid-latitudes)
pub const DEFAULT_MIN_VERTEX_DISTANCE: f64 = 0.0001;

/// Default map center (lat, lon) used when there is nothing to frame
pub const DEFAULT_CENTER: (f64, f64) = (24.7869, 120.9968);

/// Euclidean distance between two `(lat, lon)` pairs on raw degree values.
///
/// This is not a geodesic metric. It is only meant for comparing points that are
/// a few screen pixels apart inside a single map view.
#[inline(always)]
pub fn degree_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    (lat2 - lat1).hypot(lon2 - lon1)
}

/// Check if a `(lat, lon)` pair is finite and within WGS-84 bounds
#[inline(always)]
pub fn is_valid_wgs84(lat: f64, lon: f64) -> bool {
    lat.is_finite()
        && lon.is_finite()
        && (MIN_LATITUDE..=MAX_LATITUDE).contains(&lat)
        && (MIN_LONGITUDE..=MAX_LONGITUDE).contains(&lon)
}

/// Rectangle covering the whole WGS-84 degree plane (x = lon, y = lat)
pub fn world_rect() -> Rect<f64> {
    Rect::new(
        Coord {
            x: MIN_LONGITUDE,
            y: MIN_LATITUDE,
        },
        Coord {
            x: MAX_LONGITUDE,
            y: MAX_LATITUDE,
        },
    )
}

/// Inclusive point-in-rectangle test (edges count as inside)
#[inline(always)]
pub fn rect_contains_inclusive(rect: &Rect<f64>, point: Coord<f64>) -> bool {
    let min = rect.min();
    let max = rect.max();
    point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
}

/// Inclusive rectangle overlap test (touching edges count as overlapping)
#[inline(always)]
pub fn rects_overlap(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    a.min().x <= b.max().x
        && a.max().x >= b.min().x
        && a.min().y <= b.max().y
        && a.max().y >= b.min().y
}
