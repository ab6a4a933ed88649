//! WGS-84 coordinate pair

use crate::utils;
use geo::{Coord, Point};
use serde::{Deserialize, Serialize};

/// A `(latitude, longitude)` pair in decimal degrees.
///
/// No normalization is performed; values are kept at their input precision.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    #[inline]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Planar distance in degrees (see [`utils::degree_distance`])
    #[inline]
    pub fn degree_distance(&self, other: &Coordinate) -> f64 {
        utils::degree_distance(self.lat, self.lng, other.lat, other.lng)
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        utils::is_valid_wgs84(self.lat, self.lng)
    }

    /// `geo` coordinate with `x = lng`, `y = lat`
    #[inline]
    pub fn to_geo(&self) -> Coord<f64> {
        Coord {
            x: self.lng,
            y: self.lat,
        }
    }
}

impl From<Coordinate> for Point<f64> {
    fn from(c: Coordinate) -> Self {
        Point::new(c.lng, c.lat)
    }
}

impl From<(f64, f64)> for Coordinate {
    /// Builds from a `(lat, lng)` tuple
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_axis_order() {
        let c = Coordinate::new(24.78, 120.99);
        let g = c.to_geo();
        assert_eq!(g.x, 120.99);
        assert_eq!(g.y, 24.78);

        let p: Point<f64> = c.into();
        assert_eq!(p.x(), 120.99);
        assert_eq!(p.y(), 24.78);
    }

    #[test]
    fn test_from_tuple_is_lat_lng() {
        let c: Coordinate = (1.0, 2.0).into();
        assert_eq!(c.lat, 1.0);
        assert_eq!(c.lng, 2.0);
    }
}
