//! Closed polygon rings and their geometry literal
//!
//! A [`Polygon`] is the closed ring produced by a finished gesture. It owns both the
//! raw vertex list (in `(lat, lng)` [`Coordinate`] form, first vertex repeated last)
//! and a prebuilt `geo::Polygon` used for containment tests.

use crate::{Coordinate, utils};
use geo::{BoundingRect, Intersects, LineString, Rect};
use std::collections::HashSet;
use std::fmt::Write;

/// Spatial reference identifier for WGS-84 longitude/latitude degrees
pub const SRID_WGS84: u32 = 4326;

/// A closed ring of WGS-84 coordinates.
///
/// The first and last vertex are always identical. Rings are not repaired: a
/// self-intersecting or collinear ring is kept as drawn and containment follows
/// whatever `geo` reports for it.
#[derive(Clone, Debug)]
pub struct Polygon {
    /// Vertices in drawing order, closed
    vertices: Vec<Coordinate>,
    /// Same ring in `geo` axis order (x = lng, y = lat)
    shape: geo::Polygon<f64>,
}

impl Polygon {
    /// Build a closed polygon from a vertex sequence.
    ///
    /// The ring is closed if the last vertex differs from the first. Returns `None`
    /// for an empty input, which callers treat as "no filter".
    pub fn close(mut vertices: Vec<Coordinate>) -> Option<Self> {
        let first = *vertices.first()?;
        if vertices.last() != Some(&first) || vertices.len() == 1 {
            vertices.push(first);
        }

        let ring: LineString<f64> = vertices.iter().map(Coordinate::to_geo).collect();
        let shape = geo::Polygon::new(ring, Vec::new());

        Some(Self { vertices, shape })
    }

    /// All stored vertices, including the closing repeat
    #[inline]
    pub fn vertices(&self) -> &[Coordinate] {
        &self.vertices
    }

    /// Number of distinct vertices in the ring
    pub fn unique_vertex_count(&self) -> usize {
        unique_count(&self.vertices)
    }

    /// Check the closure invariant (first == last)
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.vertices.first() == self.vertices.last()
    }

    /// Inclusive containment: points on an edge or vertex are inside
    #[inline]
    pub fn contains_inclusive(&self, point: &Coordinate) -> bool {
        self.shape.intersects(&point.to_geo())
    }

    /// Bounding rectangle in `geo` axis order
    pub fn bounding_rect(&self) -> Rect<f64> {
        self.shape.bounding_rect().unwrap_or_else(utils::world_rect)
    }

    /// Well-known-text body, e.g. `POLYGON((lng lat, lng lat, ...))`.
    ///
    /// Vertices are written longitude first.
    pub fn wkt(&self) -> String {
        let mut out = String::with_capacity(16 + self.vertices.len() * 24);
        out.push_str("POLYGON((");
        for (i, v) in self.vertices.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            // Writing into a String cannot fail
            let _ = write!(out, "{} {}", v.lng, v.lat);
        }
        out.push_str("))");
        out
    }

    /// Extended WKT literal with the WGS-84 SRID prefix, as sent to a spatial store
    pub fn ewkt(&self) -> String {
        format!("SRID={};{}", SRID_WGS84, self.wkt())
    }
}

/// Count distinct coordinates (bitwise equality, with `-0.0 == 0.0`)
pub(crate) fn unique_count(points: &[Coordinate]) -> usize {
    points
        .iter()
        .map(|c| ((c.lat + 0.0).to_bits(), (c.lng + 0.0).to_bits()))
        .collect::<HashSet<_>>()
        .len()
}
