//! Location store interface and the in-memory implementation
//!
//! A store answers two questions: "every location, ordered by name" and "every
//! location inside this polygon (edges included), ordered by name". How the polygon
//! reaches the backing storage (a geometry literal for a spatial database, a
//! quadtree walk in memory) is the store's business.

use crate::{Coordinate, Location, Polygon, Quadtree, Result, utils};
use geo::Rect;
use rayon::prelude::*;
use std::future::Future;
use std::sync::Arc;

/// Candidate count above which containment tests run on the rayon pool
const PARALLEL_THRESHOLD: usize = 4096;

/// Default leaf capacity of the spatial index
pub(crate) const DEFAULT_MAX_LOCATIONS_PER_NODE: usize = 16;

/// A typed store request: no polygon means no filter
#[derive(Clone, Debug)]
pub enum LocationQuery {
    All,
    Within(Polygon),
}

impl LocationQuery {
    /// Build a request from raw boundary points.
    ///
    /// Empty input means "all"; anything else is closed defensively.
    pub fn from_points(points: Vec<Coordinate>) -> Self {
        match Polygon::close(points) {
            Some(polygon) => LocationQuery::Within(polygon),
            None => LocationQuery::All,
        }
    }

    pub fn polygon(&self) -> Option<&Polygon> {
        match self {
            LocationQuery::All => None,
            LocationQuery::Within(polygon) => Some(polygon),
        }
    }
}

impl From<Option<Polygon>> for LocationQuery {
    fn from(polygon: Option<Polygon>) -> Self {
        polygon.map_or(LocationQuery::All, LocationQuery::Within)
    }
}

/// Read-only source of locations
pub trait LocationStore: Send + Sync {
    /// Every location, ascending by name
    fn list_all(&self) -> impl Future<Output = Result<Vec<Arc<Location>>>> + Send;

    /// Locations inside or on the boundary of `polygon`, ascending by name
    fn list_within(
        &self,
        polygon: &Polygon,
    ) -> impl Future<Output = Result<Vec<Arc<Location>>>> + Send;

    /// Dispatch a typed request to one of the two capabilities
    fn fetch(
        &self,
        query: &LocationQuery,
    ) -> impl Future<Output = Result<Vec<Arc<Location>>>> + Send {
        async move {
            match query {
                LocationQuery::All => self.list_all().await,
                LocationQuery::Within(polygon) => self.list_within(polygon).await,
            }
        }
    }
}

/// Cached statistics for the store
#[derive(Debug, Clone, Default)]
struct CachedStats {
    /// Bounding box in degrees (x = lon, y = lat), None if empty
    bounding_box: Option<Rect<f64>>,
    /// Sum of latitudes and longitudes, for the map center
    lat_sum: f64,
    lng_sum: f64,
}

/// In-memory, name-ordered location store with a quadtree index
#[derive(Clone, Debug)]
pub struct MemoryStore {
    /// Locations sorted by name; positions in this list are the index entries
    locations: Vec<Arc<Location>>,
    /// Spatial index over `locations`
    index: Quadtree,
    cached_stats: CachedStats,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl MemoryStore {
    /// Create a store with the default index bucket size
    pub fn new(locations: Vec<Location>) -> Self {
        Self::with_bucket_size(locations, DEFAULT_MAX_LOCATIONS_PER_NODE)
    }

    /// Create a store, splitting index nodes above `max_locations_per_node` entries
    pub fn with_bucket_size(mut locations: Vec<Location>, max_locations_per_node: usize) -> Self {
        #[cfg(feature = "profiling")]
        profiling::scope!("store::build");

        // Stable, so equal names keep their source order
        locations.sort_by(|a, b| a.name.cmp(&b.name));

        let index = Quadtree::from_points(
            locations.iter().map(|l| l.position),
            max_locations_per_node,
        );
        let cached_stats = Self::compute_stats(&locations);
        let locations = locations.into_iter().map(Arc::new).collect();

        Self {
            locations,
            index,
            cached_stats,
        }
    }

    fn compute_stats(locations: &[Location]) -> CachedStats {
        let mut stats = CachedStats::default();
        for location in locations {
            let p = location.position.to_geo();
            stats.lat_sum += location.position.lat;
            stats.lng_sum += location.position.lng;
            stats.bounding_box = Some(match stats.bounding_box {
                Some(bbox) => Rect::new(
                    geo::Coord {
                        x: bbox.min().x.min(p.x),
                        y: bbox.min().y.min(p.y),
                    },
                    geo::Coord {
                        x: bbox.max().x.max(p.x),
                        y: bbox.max().y.max(p.y),
                    },
                ),
                None => Rect::new(p, p),
            });
        }
        stats
    }

    /// All locations in name order
    #[inline]
    pub fn locations(&self) -> &[Arc<Location>] {
        &self.locations
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Synchronous inclusive containment query, in name order
    pub fn query_within(&self, polygon: &Polygon) -> Vec<Arc<Location>> {
        let candidates = self.index.query(polygon.bounding_rect());

        let test = |&i: &usize| {
            let location = &self.locations[i];
            polygon
                .contains_inclusive(&location.position)
                .then(|| location.clone())
        };

        // Candidates come back in index order, which is name order
        let matches: Vec<Arc<Location>> = if candidates.len() >= PARALLEL_THRESHOLD {
            candidates.par_iter().filter_map(test).collect()
        } else {
            candidates.iter().filter_map(test).collect()
        };

        tracing::debug!(
            geometry = %polygon.ewkt(),
            candidates = candidates.len(),
            matches = matches.len(),
            "Polygon query"
        );
        matches
    }

    /// Bounding box of all positions as `(min_lat, min_lon, max_lat, max_lon)`.
    ///
    /// Returns `None` if the store is empty.
    pub fn bounding_box_wgs84(&self) -> Option<(f64, f64, f64, f64)> {
        let bbox = self.cached_stats.bounding_box?;
        Some((bbox.min().y, bbox.min().x, bbox.max().y, bbox.max().x))
    }

    /// Map center `(lat, lon)`: mean of all positions, or the default center when empty
    pub fn center_wgs84(&self) -> (f64, f64) {
        if self.locations.is_empty() {
            return utils::DEFAULT_CENTER;
        }
        let n = self.locations.len() as f64;
        (self.cached_stats.lat_sum / n, self.cached_stats.lng_sum / n)
    }
}

impl LocationStore for MemoryStore {
    async fn list_all(&self) -> Result<Vec<Arc<Location>>> {
        Ok(self.locations.clone())
    }

    async fn list_within(&self, polygon: &Polygon) -> Result<Vec<Arc<Location>>> {
        Ok(self.query_within(polygon))
    }
}
