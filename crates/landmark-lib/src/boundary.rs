//! Freehand boundary capture
//!
//! [`BoundaryCapture`] is a small state machine fed by pointer events. It thins the
//! incoming stream (pointer-move fires far more often than the map needs) and, when
//! the gesture ends, closes the recorded vertices into a [`Polygon`].
//!
//! None of the operations fail. Calls that make no sense in the current state (for
//! example `extend` with no gesture in progress) are ignored.

use crate::polygon::{self, Polygon};
use crate::{Coordinate, utils};

/// Minimum number of distinct vertices for a gesture to produce a polygon
pub const MIN_UNIQUE_VERTICES: usize = 3;

/// Whether a gesture is currently being recorded
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Drawing,
}

/// Records one gesture at a time and turns it into a closed polygon
#[derive(Clone, Debug)]
pub struct BoundaryCapture {
    /// Minimum degree distance between consecutive recorded vertices
    min_vertex_distance: f64,
    /// Vertices recorded for the gesture in progress
    points: Vec<Coordinate>,
    state: CaptureState,
}

impl Default for BoundaryCapture {
    fn default() -> Self {
        Self::new(utils::DEFAULT_MIN_VERTEX_DISTANCE)
    }
}

impl BoundaryCapture {
    /// Create an idle capture with the given vertex spacing threshold (degrees)
    pub fn new(min_vertex_distance: f64) -> Self {
        Self {
            min_vertex_distance: min_vertex_distance.max(0.0),
            points: Vec::new(),
            state: CaptureState::Idle,
        }
    }

    #[inline]
    pub fn state(&self) -> CaptureState {
        self.state
    }

    #[inline]
    pub fn is_drawing(&self) -> bool {
        self.state == CaptureState::Drawing
    }

    #[inline]
    pub fn min_vertex_distance(&self) -> f64 {
        self.min_vertex_distance
    }

    /// Partial boundary of the gesture in progress, for live feedback.
    ///
    /// Empty when idle.
    #[inline]
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Start a new gesture at `point`.
    ///
    /// A gesture already in progress is dropped without producing anything.
    pub fn begin(&mut self, point: Coordinate) {
        if self.is_drawing() {
            tracing::debug!(
                dropped_vertices = self.points.len(),
                "New gesture replaces unfinished one"
            );
        }
        self.points.clear();
        self.points.push(point);
        self.state = CaptureState::Drawing;
    }

    /// Record `point` if it is farther than the threshold from the last vertex.
    ///
    /// Returns whether the point was appended.
    pub fn extend(&mut self, point: Coordinate) -> bool {
        if !self.is_drawing() {
            return false;
        }

        let far_enough = self
            .points
            .last()
            .is_none_or(|last| last.degree_distance(&point) > self.min_vertex_distance);

        if far_enough {
            self.points.push(point);
        }
        far_enough
    }

    /// Finish the gesture.
    ///
    /// Returns the closed polygon, or `None` when fewer than three distinct vertices
    /// were recorded (or nothing was being drawn). The capture is idle afterwards.
    pub fn end(&mut self) -> Option<Polygon> {
        if !self.is_drawing() {
            return None;
        }
        self.state = CaptureState::Idle;

        let points = std::mem::take(&mut self.points);
        let unique = polygon::unique_count(&points);
        if unique < MIN_UNIQUE_VERTICES {
            tracing::debug!(unique, "Gesture too small, no polygon");
            return None;
        }

        Polygon::close(points)
    }

    /// Abort the gesture in progress, if any
    pub fn cancel(&mut self) {
        self.points.clear();
        self.state = CaptureState::Idle;
    }
}
