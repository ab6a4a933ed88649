//! Landmark Library - Freehand Region Filtering for Point-of-Interest Collections
//!
//! This library turns a hand-drawn map gesture into a closed polygon and uses it to
//! restrict a collection of landmarks to the ones falling inside the drawn region.
//!
//! # Architecture
//!
//! - **[`BoundaryCapture`]**: Finite-state gesture recorder (begin / extend / end / cancel)
//! - **[`Polygon`]**: Closed WGS-84 ring with inclusive containment and a geometry literal
//! - **[`LocationStore`]**: Store interface with "list all" and "list within polygon"
//! - **[`MemoryStore`]**: Name-ordered landmark store backed by a [`Quadtree`] index
//! - **[`SpatialFilter`]**: Runs one store query per request, with timeout and error collapse
//! - **[`FilterSession`]**: Per-session glue with stale-result discard
//!
//! # Coordinates
//!
//! [`Coordinate`] stores `(latitude, longitude)`. Everything that talks to `geo` or to a
//! geometry literal uses `(longitude, latitude)` order, i.e. `x = lng`, `y = lat`.

mod boundary;
mod coordinate;
mod filter;
mod location;
mod polygon;
mod quadtree;
mod session;
mod store;
pub mod utils;

// Public API exports
pub use boundary::{BoundaryCapture, CaptureState};
pub use coordinate::Coordinate;
pub use filter::{FilterError, SpatialFilter};
pub use location::{Location, LocationRecord, load_locations, parse_locations};
pub use polygon::{Polygon, SRID_WGS84};
pub use quadtree::Quadtree;
pub use session::{Config, FilterSession, FilterTicket, GestureOutcome, RunOutcome};
pub use store::{LocationQuery, LocationStore, MemoryStore};

/// Error types for the store side of the library
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Query timed out after {0:?}")]
    Timeout(std::time::Duration),
}

pub type Result<T> = std::result::Result<T, StoreError>;
