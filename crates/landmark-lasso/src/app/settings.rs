use clap::{Parser, ValueEnum};
use landmark_lib::Config;
use std::path::PathBuf;
use std::time::Duration;

/// How the final listing is printed
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON array of records
    Json,
    /// One tab-separated line per landmark
    Table,
}

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Landmark Lasso - Filter a landmark collection by a hand-drawn map region
pub struct Settings {
    /// Landmark JSON file to load
    #[clap(short, long, value_name = "FILE")]
    pub landmarks: PathBuf,

    /// Recorded gesture (JSON array of begin/extend/end/cancel events) to replay
    #[clap(short, long, value_name = "FILE")]
    pub gesture: Option<PathBuf>,

    /// Minimum distance in degrees between recorded boundary vertices
    #[clap(long, default_value = "0.0001")]
    pub min_vertex_distance: f64,

    /// Store query timeout in milliseconds
    #[clap(long, default_value = "5000")]
    pub timeout_ms: u64,

    /// Maximum landmarks per spatial index node before subdivision
    #[clap(long, default_value = "16")]
    pub max_locations_per_node: usize,

    /// Output format for the resulting listing
    #[clap(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

impl Settings {
    /// Parse settings from the command line, exiting with usage on error
    pub fn from_cli() -> Self {
        match Settings::try_parse() {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }

    /// Library configuration derived from these settings
    pub fn config(&self) -> Config {
        Config {
            min_vertex_distance: self.min_vertex_distance,
            query_timeout: Duration::from_millis(self.timeout_ms),
            max_locations_per_node: self.max_locations_per_node,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::parse_from(["landmark-lasso", "--landmarks", "landmarks.json"]);
        assert_eq!(settings.landmarks, PathBuf::from("landmarks.json"));
        assert!(settings.gesture.is_none());
        assert_eq!(settings.format, OutputFormat::Table);
        assert_eq!(settings.config(), Config::default());
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::parse_from([
            "landmark-lasso",
            "-l",
            "a.json",
            "-g",
            "gesture.json",
            "--min-vertex-distance",
            "0.001",
            "--timeout-ms",
            "250",
            "--format",
            "json",
        ]);
        let config = settings.config();
        assert_eq!(config.min_vertex_distance, 0.001);
        assert_eq!(config.query_timeout, Duration::from_millis(250));
        assert_eq!(settings.format, OutputFormat::Json);
        assert_eq!(settings.gesture, Some(PathBuf::from("gesture.json")));
    }

    #[test]
    fn test_landmarks_is_required() {
        assert!(Settings::try_parse_from(["landmark-lasso"]).is_err());
    }
}
