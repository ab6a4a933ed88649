//! FilterSession - per-user glue between gesture capture and the spatial filter
//!
//! A session owns one [`BoundaryCapture`], the currently displayed listing and a
//! generation counter. Every finished gesture is stamped with a fresh generation;
//! a query result is only displayed if its generation is still the newest when it
//! arrives, so a slow query for an old gesture can never overwrite a newer one.
//!
//! Clearing the filter (cancel, or a gesture too small to form a polygon) never
//! talks to the store: it restores the cached unfiltered baseline.

use crate::boundary::{BoundaryCapture, CaptureState};
use crate::filter::{DEFAULT_QUERY_TIMEOUT, FilterError, SpatialFilter};
use crate::store::DEFAULT_MAX_LOCATIONS_PER_NODE;
use crate::{Coordinate, Location, LocationQuery, LocationRecord, LocationStore, Polygon, utils};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// Tunables for capture, querying and indexing
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Minimum degree distance between recorded boundary vertices.
    /// Default: 0.0001 (roughly 10 m at mid-latitudes)
    pub min_vertex_distance: f64,
    /// Upper bound on one store request; expiry counts as a failed query.
    /// Default: 5 s
    pub query_timeout: Duration,
    /// Leaf capacity of the in-memory spatial index. Default: 16
    pub max_locations_per_node: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_vertex_distance: utils::DEFAULT_MIN_VERTEX_DISTANCE,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            max_locations_per_node: DEFAULT_MAX_LOCATIONS_PER_NODE,
        }
    }
}

/// A generation-stamped query, produced when a gesture ends
#[derive(Clone, Debug)]
pub struct FilterTicket {
    generation: u64,
    query: LocationQuery,
}

impl FilterTicket {
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn query(&self) -> &LocationQuery {
        &self.query
    }

    #[inline]
    pub fn polygon(&self) -> Option<&Polygon> {
        self.query.polygon()
    }
}

/// What a gesture event did to the session
#[derive(Clone, Debug)]
pub enum GestureOutcome {
    /// Nothing was being drawn
    Ignored,
    /// The filter was cleared and the baseline restored; no query needed
    Cleared,
    /// A polygon was closed; run the ticket to update the listing
    Query(FilterTicket),
}

/// Result of running a ticket
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The listing now shows this many locations
    Applied { results: usize },
    /// A newer gesture took over; the result was dropped
    Superseded,
}

/// What is currently shown
#[derive(Debug, Default)]
struct Display {
    /// Generation of the ticket that produced `locations`
    generation: u64,
    locations: Vec<Arc<Location>>,
    /// Polygon behind `locations`, None when unfiltered
    active_polygon: Option<Polygon>,
    /// Last unfiltered listing, restored when the filter is cleared
    baseline: Option<Vec<Arc<Location>>>,
}

/// State shared with in-flight queries
struct Shared<S> {
    filter: SpatialFilter<S>,
    /// Newest generation handed out
    latest: AtomicU64,
    display: RwLock<Display>,
}

/// One drawing session over a location store
pub struct FilterSession<S> {
    capture: BoundaryCapture,
    shared: Arc<Shared<S>>,
}

impl<S: LocationStore + 'static> FilterSession<S> {
    pub fn new(store: Arc<S>, config: &Config) -> Self {
        Self {
            capture: BoundaryCapture::new(config.min_vertex_distance),
            shared: Arc::new(Shared {
                filter: SpatialFilter::with_timeout(store, config.query_timeout),
                latest: AtomicU64::new(0),
                display: RwLock::new(Display::default()),
            }),
        }
    }

    // ---------------------------------------------------------------------
    // Gesture events
    // ---------------------------------------------------------------------

    /// Pointer pressed: start a new boundary (any unfinished one is dropped)
    pub fn begin(&mut self, point: Coordinate) {
        self.capture.begin(point);
    }

    /// Pointer moved while pressed
    pub fn extend(&mut self, point: Coordinate) -> bool {
        self.capture.extend(point)
    }

    /// Pointer released: close the boundary and hand back a ticket, or clear
    pub fn end(&mut self) -> GestureOutcome {
        if !self.capture.is_drawing() {
            return GestureOutcome::Ignored;
        }

        match self.capture.end() {
            Some(polygon) => {
                let ticket = self.issue(LocationQuery::Within(polygon));
                tracing::debug!(
                    generation = ticket.generation,
                    vertices = ticket.polygon().map_or(0, |p| p.vertices().len()),
                    "Gesture closed"
                );
                GestureOutcome::Query(ticket)
            }
            None => {
                self.clear_filter();
                GestureOutcome::Cleared
            }
        }
    }

    /// Abort drawing and drop the filter (e.g. draw mode switched off).
    ///
    /// Takes effect immediately; no query is issued.
    pub fn cancel(&mut self) -> GestureOutcome {
        self.capture.cancel();
        self.clear_filter();
        GestureOutcome::Cleared
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Load and display the unfiltered listing, caching it as the baseline
    pub fn refresh(&self) -> impl Future<Output = Result<RunOutcome, FilterError>> + Send + use<S> {
        self.run(self.issue(LocationQuery::All))
    }

    /// Execute a ticket.
    ///
    /// The returned future owns everything it needs, so it can be spawned. Its result
    /// is displayed only if no newer ticket (or clear) happened in the meantime.
    /// On failure the displayed listing is left untouched.
    pub fn run(
        &self,
        ticket: FilterTicket,
    ) -> impl Future<Output = Result<RunOutcome, FilterError>> + Send + use<S> {
        let shared = self.shared.clone();
        async move { shared.run(ticket).await }
    }

    fn issue(&self, query: LocationQuery) -> FilterTicket {
        let generation = self.shared.latest.fetch_add(1, Ordering::SeqCst) + 1;
        FilterTicket { generation, query }
    }

    fn clear_filter(&self) {
        let generation = self.shared.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let mut view = self.shared.write_display();
        view.generation = generation;
        view.active_polygon = None;
        view.locations = view.baseline.clone().unwrap_or_default();
        let shown = view.locations.len();
        tracing::debug!(generation, shown, "Filter cleared");
    }

    // ---------------------------------------------------------------------
    // Observers
    // ---------------------------------------------------------------------

    #[inline]
    pub fn capture_state(&self) -> CaptureState {
        self.capture.state()
    }

    #[inline]
    pub fn is_drawing(&self) -> bool {
        self.capture.is_drawing()
    }

    /// Boundary of the gesture in progress, for live feedback
    #[inline]
    pub fn partial_boundary(&self) -> &[Coordinate] {
        self.capture.points()
    }

    /// Currently displayed locations, in name order
    pub fn displayed(&self) -> Vec<Arc<Location>> {
        self.shared.read_display().locations.clone()
    }

    /// Currently displayed locations as presentation records
    pub fn displayed_records(&self) -> Vec<LocationRecord> {
        self.shared
            .read_display()
            .locations
            .iter()
            .map(|l| l.to_record())
            .collect()
    }

    /// Polygon behind the displayed listing, if filtered
    pub fn active_polygon(&self) -> Option<Polygon> {
        self.shared.read_display().active_polygon.clone()
    }

    /// Generation of the ticket (or clear) behind the displayed listing
    pub fn displayed_generation(&self) -> u64 {
        self.shared.read_display().generation
    }
}

impl<S: LocationStore> Shared<S> {
    fn is_current(&self, generation: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == generation
    }

    fn read_display(&self) -> std::sync::RwLockReadGuard<'_, Display> {
        self.display.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_display(&self) -> std::sync::RwLockWriteGuard<'_, Display> {
        self.display.write().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run(&self, ticket: FilterTicket) -> Result<RunOutcome, FilterError> {
        // A stale unfiltered load still runs while there is no baseline to clear back to
        let needs_baseline =
            ticket.query.polygon().is_none() && self.read_display().baseline.is_none();
        if !needs_baseline && !self.is_current(ticket.generation) {
            tracing::debug!(generation = ticket.generation, "Ticket superseded before query");
            return Ok(RunOutcome::Superseded);
        }

        let result = self.filter.query(&ticket.query).await;

        let mut view = self.write_display();
        // Checked under the display lock so a clear or a newer result cannot interleave
        if !self.is_current(ticket.generation) {
            if let (None, Ok(locations)) = (ticket.query.polygon(), &result) {
                view.baseline = Some(locations.clone());
                if view.active_polygon.is_none() {
                    view.locations = locations.clone();
                }
            }
            tracing::debug!(generation = ticket.generation, "Discarding stale result");
            return Ok(RunOutcome::Superseded);
        }

        let locations = result?;
        let results = locations.len();
        let filtered = ticket.query.polygon().is_some();

        if !filtered {
            view.baseline = Some(locations.clone());
        }
        view.generation = ticket.generation;
        view.active_polygon = ticket.query.polygon().cloned();
        view.locations = locations;

        tracing::info!(
            generation = ticket.generation,
            filtered,
            results,
            "Listing updated"
        );
        Ok(RunOutcome::Applied { results })
    }
}
