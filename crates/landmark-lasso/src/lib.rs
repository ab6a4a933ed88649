//! Landmark Lasso - Application Library
//!
//! Command-line front end over `landmark-lib`: loads a landmark collection,
//! replays a recorded lasso gesture and prints the resulting listing.

mod app;
mod logging;

pub use app::gesture::{GestureEvent, load_gesture, parse_gesture};
pub use app::settings::{OutputFormat, Settings};
pub use app::{AppError, ReplayStats, replay, run, write_listing};
pub use logging::setup_logging;
