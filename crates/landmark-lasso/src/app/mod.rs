//! Application module
//!
//! Drives a filter session from the command line:
//! - Loads the landmark collection into an in-memory store
//! - Shows the unfiltered listing, then replays a recorded lasso gesture
//! - Prints whatever listing is displayed once every query has settled

pub(crate) mod gesture;
pub(crate) mod settings;

use crate::app::gesture::{GestureEvent, load_gesture};
use crate::app::settings::{OutputFormat, Settings};
use landmark_lib::{
    Coordinate, FilterError, FilterSession, GestureOutcome, LocationRecord, LocationStore,
    MemoryStore, RunOutcome, StoreError, load_locations,
};
use std::io::Write;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Everything that can stop the application
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Gesture parse error: {0}")]
    Gesture(#[from] serde_json::Error),

    #[error("Query task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// How the queries issued by a replayed gesture ended
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub applied: usize,
    pub superseded: usize,
    pub failed: usize,
    pub cleared: usize,
}

/// Run the application with the given settings, printing to stdout
pub async fn run(settings: &Settings) -> Result<(), AppError> {
    let config = settings.config();

    let locations = load_locations(&settings.landmarks)?;
    let store = Arc::new(MemoryStore::with_bucket_size(
        locations,
        config.max_locations_per_node,
    ));

    let (lat, lng) = store.center_wgs84();
    match store.bounding_box_wgs84() {
        Some((min_lat, min_lng, max_lat, max_lng)) => tracing::info!(
            "Map centered at ({lat:.5}, {lng:.5}), extent ({min_lat:.5}, {min_lng:.5}) - ({max_lat:.5}, {max_lng:.5})"
        ),
        None => tracing::info!("Empty collection, map centered at ({lat:.5}, {lng:.5})"),
    }

    let events = match &settings.gesture {
        Some(path) => load_gesture(path)?,
        None => Vec::new(),
    };

    let mut session = FilterSession::new(store, &config);
    session.refresh().await?;

    let stats = replay(&mut session, &events).await?;
    tracing::info!(
        applied = stats.applied,
        superseded = stats.superseded,
        failed = stats.failed,
        cleared = stats.cleared,
        "Gesture replay finished"
    );

    let records = session.displayed_records();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_listing(&mut out, &records, settings.format)?;
    out.flush()?;
    Ok(())
}

/// Feed gesture events to the session.
///
/// Each completed lasso spawns its query right away, the way a map widget would
/// while the user keeps drawing. All of them are awaited before returning.
pub async fn replay<S: LocationStore + 'static>(
    session: &mut FilterSession<S>,
    events: &[GestureEvent],
) -> Result<ReplayStats, AppError> {
    #[cfg(feature = "profiling")]
    profiling::scope!("app::replay");

    let mut stats = ReplayStats::default();
    let mut pending: Vec<JoinHandle<Result<RunOutcome, FilterError>>> = Vec::new();

    for event in events {
        match *event {
            GestureEvent::Begin { lat, lng } => session.begin(Coordinate::new(lat, lng)),
            GestureEvent::Extend { lat, lng } => {
                session.extend(Coordinate::new(lat, lng));
            }
            GestureEvent::End => match session.end() {
                GestureOutcome::Query(ticket) => {
                    tracing::debug!(generation = ticket.generation(), "Spawning lasso query");
                    pending.push(tokio::spawn(session.run(ticket)));
                }
                GestureOutcome::Cleared => stats.cleared += 1,
                GestureOutcome::Ignored => {
                    tracing::debug!("Pointer release without an active gesture")
                }
            },
            GestureEvent::Cancel => {
                session.cancel();
                stats.cleared += 1;
            }
        }
    }

    for handle in pending {
        match handle.await? {
            Ok(RunOutcome::Applied { results }) => {
                tracing::info!("Lasso matched {} landmarks", results);
                stats.applied += 1;
            }
            Ok(RunOutcome::Superseded) => {
                tracing::debug!("Discarded result of a superseded lasso");
                stats.superseded += 1;
            }
            Err(e) => {
                tracing::warn!("Lasso query failed, keeping previous listing: {}", e);
                stats.failed += 1;
            }
        }
    }

    Ok(stats)
}

/// Print a listing in the requested format
pub fn write_listing<W: Write>(
    out: &mut W,
    records: &[LocationRecord],
    format: OutputFormat,
) -> Result<(), AppError> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, records)?;
            writeln!(out)?;
        }
        OutputFormat::Table => {
            writeln!(out, "name\taddress\tlongitude\tlatitude\tcategory_tags")?;
            for record in records {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}\t{}",
                    record.name,
                    record.address,
                    record.longitude,
                    record.latitude,
                    record.category_tags.join(", ")
                )?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::gesture::parse_gesture;
    use super::*;
    use landmark_lib::{Config, parse_locations};

    const LANDMARKS: &str = r#"[
        {"名稱": "Library", "地址": "1001 University Rd", "經度": 120.99, "緯度": 24.80, "類型": ["library", "point_of_interest"]},
        {"名稱": "Bakery", "地址": "2 Market St", "經度": "120.90", "緯度": "24.70", "類型": ["bakery"]},
        {"name": "Cafe", "address": "3 Lake Rd", "longitude": 121.05, "latitude": 24.75, "types": []}
    ]"#;

    fn session() -> FilterSession<MemoryStore> {
        let store = Arc::new(MemoryStore::new(parse_locations(LANDMARKS).unwrap()));
        FilterSession::new(store, &Config::default())
    }

    fn names(session: &FilterSession<MemoryStore>) -> Vec<String> {
        session
            .displayed_records()
            .into_iter()
            .map(|r| r.name)
            .collect()
    }

    const LASSO_LIBRARY: &str = r#"
        {"event": "begin", "lat": 24.79, "lng": 120.98},
        {"event": "extend", "lat": 24.79, "lng": 121.00},
        {"event": "extend", "lat": 24.81, "lng": 121.00},
        {"event": "extend", "lat": 24.81, "lng": 120.98},
        {"event": "end"}
    "#;

    #[tokio::test]
    async fn test_lasso_filters_listing() {
        let mut session = session();
        session.refresh().await.unwrap();
        assert_eq!(names(&session), vec!["Bakery", "Cafe", "Library"]);

        let events = parse_gesture(&format!("[{LASSO_LIBRARY}]")).unwrap();
        let stats = replay(&mut session, &events).await.unwrap();

        assert_eq!(stats.applied, 1);
        assert_eq!(names(&session), vec!["Library"]);
        assert!(session.active_polygon().is_some());
    }

    #[tokio::test]
    async fn test_cancel_restores_full_listing() {
        let mut session = session();
        session.refresh().await.unwrap();

        let events = parse_gesture(&format!(
            r#"[{LASSO_LIBRARY}, {{"event": "begin", "lat": 24.0, "lng": 120.0}}, {{"event": "cancel"}}]"#
        ))
        .unwrap();
        let stats = replay(&mut session, &events).await.unwrap();

        // The lasso query was still pending when the cancel cleared the filter
        assert_eq!(stats.superseded, 1);
        assert_eq!(stats.cleared, 1);
        assert_eq!(names(&session), vec!["Bakery", "Cafe", "Library"]);
        assert!(session.active_polygon().is_none());
    }

    #[tokio::test]
    async fn test_latest_lasso_wins() {
        let mut session = session();
        session.refresh().await.unwrap();

        // Second lasso encloses the bakery and the cafe
        let events = parse_gesture(&format!(
            r#"[{LASSO_LIBRARY},
                {{"event": "begin", "lat": 24.60, "lng": 120.80}},
                {{"event": "extend", "lat": 24.60, "lng": 121.10}},
                {{"event": "extend", "lat": 24.76, "lng": 121.10}},
                {{"event": "extend", "lat": 24.76, "lng": 120.80}},
                {{"event": "end"}}]"#
        ))
        .unwrap();
        let stats = replay(&mut session, &events).await.unwrap();

        assert_eq!(stats.applied, 1);
        assert_eq!(stats.superseded, 1);
        assert_eq!(names(&session), vec!["Bakery", "Cafe"]);
    }

    #[tokio::test]
    async fn test_tiny_gesture_clears() {
        let mut session = session();
        session.refresh().await.unwrap();

        let events = parse_gesture(
            r#"[{"event": "begin", "lat": 24.8, "lng": 120.99},
                {"event": "extend", "lat": 24.8, "lng": 120.99},
                {"event": "end"},
                {"event": "end"}]"#,
        )
        .unwrap();
        let stats = replay(&mut session, &events).await.unwrap();

        assert_eq!(
            stats,
            ReplayStats {
                cleared: 1,
                ..Default::default()
            }
        );
        assert_eq!(names(&session).len(), 3);
    }

    #[test]
    fn test_write_table() {
        let records = vec![LocationRecord {
            name: "Library".into(),
            address: "1001 University Rd".into(),
            longitude: 120.99,
            latitude: 24.8,
            category_tags: vec!["library".into(), "point_of_interest".into()],
        }];

        let mut out = Vec::new();
        write_listing(&mut out, &records, OutputFormat::Table).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "name\taddress\tlongitude\tlatitude\tcategory_tags");
        assert_eq!(
            lines[1],
            "Library\t1001 University Rd\t120.99\t24.8\tlibrary, point_of_interest"
        );
    }

    #[test]
    fn test_write_json() {
        let records = vec![LocationRecord {
            name: "Cafe".into(),
            address: String::new(),
            longitude: 121.05,
            latitude: 24.75,
            category_tags: vec![],
        }];

        let mut out = Vec::new();
        write_listing(&mut out, &records, OutputFormat::Json).unwrap();
        let parsed: Vec<LocationRecord> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, records);
    }
}
