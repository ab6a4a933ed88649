//! Recorded gesture events
//!
//! A gesture file is what a map widget would have emitted while the user drew:
//!
//! ```json
//! [
//!   {"event": "begin",  "lat": 24.78, "lng": 120.99},
//!   {"event": "extend", "lat": 24.79, "lng": 120.99},
//!   {"event": "end"}
//! ]
//! ```

use landmark_lib::Coordinate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One pointer event, in map coordinates
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GestureEvent {
    Begin { lat: f64, lng: f64 },
    Extend { lat: f64, lng: f64 },
    End,
    Cancel,
}

impl GestureEvent {
    /// Position carried by pointer-down / pointer-move events
    pub fn position(&self) -> Option<Coordinate> {
        match *self {
            GestureEvent::Begin { lat, lng } | GestureEvent::Extend { lat, lng } => {
                Some(Coordinate::new(lat, lng))
            }
            GestureEvent::End | GestureEvent::Cancel => None,
        }
    }
}

pub fn parse_gesture(json: &str) -> Result<Vec<GestureEvent>, serde_json::Error> {
    serde_json::from_str(json)
}

pub fn load_gesture<P: AsRef<Path>>(path: P) -> Result<Vec<GestureEvent>, super::AppError> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let events = parse_gesture(&text)?;
    tracing::info!(
        "Loaded {} gesture events from {}",
        events.len(),
        path.as_ref().display()
    );
    Ok(events)
}
