//! Spatial filter query
//!
//! [`SpatialFilter`] issues exactly one store request per call and collapses every
//! failure (store error or timeout) into [`FilterError::QueryFailed`]. The underlying
//! cause is logged, never returned, and no partial result ever escapes.

use crate::{Coordinate, Location, LocationQuery, LocationStore, StoreError};
use std::sync::Arc;
use std::time::Duration;

/// Default upper bound on a single store request
pub(crate) const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// The only error the filter surfaces to its caller
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("filter query failed")]
    QueryFailed,
}

/// Runs typed location queries against a store
#[derive(Debug)]
pub struct SpatialFilter<S> {
    store: Arc<S>,
    timeout: Duration,
}

impl<S> Clone for SpatialFilter<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            timeout: self.timeout,
        }
    }
}

impl<S: LocationStore> SpatialFilter<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_timeout(store, DEFAULT_QUERY_TIMEOUT)
    }

    pub fn with_timeout(store: Arc<S>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Filter by raw boundary points; an empty list returns every location
    pub async fn filter(
        &self,
        points: Vec<Coordinate>,
    ) -> Result<Vec<Arc<Location>>, FilterError> {
        self.query(&LocationQuery::from_points(points)).await
    }

    /// Run one typed query with the configured timeout
    pub async fn query(
        &self,
        query: &LocationQuery,
    ) -> Result<Vec<Arc<Location>>, FilterError> {
        #[cfg(feature = "profiling")]
        profiling::scope!("filter::query");

        let started = std::time::Instant::now();
        let result = match tokio::time::timeout(self.timeout, self.store.fetch(query)).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.timeout)),
        };

        match result {
            Ok(locations) => {
                tracing::debug!(
                    filtered = query.polygon().is_some(),
                    results = locations.len(),
                    elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
                    "Filter query finished"
                );
                Ok(locations)
            }
            Err(e) => {
                tracing::error!(
                    filtered = query.polygon().is_some(),
                    error = %e,
                    "Filter query failed"
                );
                Err(FilterError::QueryFailed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, Polygon};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample_locations() -> Vec<Location> {
        vec![
            Location::new("zeta", "", Coordinate::new(0.5, 0.5), vec!["cafe".into()]),
            Location::new("beta", "", Coordinate::new(2.0, 2.0), Vec::new()),
            Location::new("alpha", "", Coordinate::new(0.0, 0.5), Vec::new()),
        ]
    }

    fn unit_square_points() -> Vec<Coordinate> {
        vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 1.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(1.0, 0.0),
            Coordinate::new(0.0, 0.0),
        ]
    }

    fn names(locations: &[Arc<Location>]) -> Vec<&str> {
        locations.iter().map(|l| l.name.as_str()).collect()
    }

    /// Wraps a memory store and counts requests
    struct CountingStore {
        inner: MemoryStore,
        calls: AtomicUsize,
    }

    impl LocationStore for CountingStore {
        async fn list_all(&self) -> crate::Result<Vec<Arc<Location>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.list_all().await
        }

        async fn list_within(&self, polygon: &Polygon) -> crate::Result<Vec<Arc<Location>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.list_within(polygon).await
        }
    }

    struct BrokenStore;

    impl LocationStore for BrokenStore {
        async fn list_all(&self) -> crate::Result<Vec<Arc<Location>>> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn list_within(&self, _polygon: &Polygon) -> crate::Result<Vec<Arc<Location>>> {
            Err(StoreError::InvalidGeometry("malformed literal".into()))
        }
    }

    struct SlowStore;

    impl LocationStore for SlowStore {
        async fn list_all(&self) -> crate::Result<Vec<Arc<Location>>> {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(Vec::new())
        }

        async fn list_within(&self, _polygon: &Polygon) -> crate::Result<Vec<Arc<Location>>> {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_empty_input_matches_baseline() {
        let store = Arc::new(MemoryStore::new(sample_locations()));
        let filter = SpatialFilter::new(store.clone());

        let unfiltered = filter.filter(Vec::new()).await.unwrap();
        let baseline = store.list_all().await.unwrap();
        assert_eq!(names(&unfiltered), names(&baseline));
        assert_eq!(names(&unfiltered), vec!["alpha", "beta", "zeta"]);
    }

    #[tokio::test]
    async fn test_unit_square_classification() {
        let filter = SpatialFilter::new(Arc::new(MemoryStore::new(sample_locations())));
        let found = filter.filter(unit_square_points()).await.unwrap();
        // alpha sits on the bottom edge, zeta is inside, beta is outside
        assert_eq!(names(&found), vec!["alpha", "zeta"]);
        assert_eq!(found[1].tags, vec!["cafe"]);
    }

    #[tokio::test]
    async fn test_unclosed_input_is_closed() {
        let filter = SpatialFilter::new(Arc::new(MemoryStore::new(sample_locations())));
        let mut open = unit_square_points();
        open.pop();
        let found = filter.filter(open).await.unwrap();
        assert_eq!(names(&found), vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn test_one_store_request_per_query() {
        let store = Arc::new(CountingStore {
            inner: MemoryStore::new(sample_locations()),
            calls: AtomicUsize::new(0),
        });
        let filter = SpatialFilter::new(store.clone());

        filter.filter(unit_square_points()).await.unwrap();
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);

        filter.filter(Vec::new()).await.unwrap();
        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_store_failure_is_opaque() {
        let filter = SpatialFilter::new(Arc::new(BrokenStore));
        assert_eq!(
            filter.filter(unit_square_points()).await,
            Err(FilterError::QueryFailed)
        );
        assert_eq!(filter.filter(Vec::new()).await, Err(FilterError::QueryFailed));
        assert_eq!(FilterError::QueryFailed.to_string(), "filter query failed");
    }

    #[tokio::test]
    async fn test_timeout_is_query_failure() {
        let filter = SpatialFilter::with_timeout(Arc::new(SlowStore), Duration::from_millis(20));
        assert_eq!(
            filter.filter(unit_square_points()).await,
            Err(FilterError::QueryFailed)
        );
    }
}
