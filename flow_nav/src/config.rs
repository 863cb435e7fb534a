//! Agent configuration, loaded from an `appsettings.json` style file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;
use crate::simulation::actions::ActionCatalog;
use crate::simulation::agent::Navigator;
use crate::simulation::flow::GridPoint;
use crate::simulation::map_reader::{load_flow_field, parse_color_map};
use crate::simulation::params::{
    DEFAULT_ACTION_STRENGTH, DEFAULT_MAX_TICKS, DEFAULT_TICK_INTERVAL_MS, OBSTACLE_WINDOW_SIZE,
};
use crate::simulation::policy::PolicyTable;
use crate::simulation::state::{BearingMode, StateEncoder};

/// Agent configuration.
///
/// Relative paths are resolved against `working_dir`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgentConfig {
    pub working_dir: PathBuf,

    #[serde(rename = "MapPNGPath")]
    pub map_png_path: PathBuf,

    /// Alternative map used with `--test-map`
    #[serde(rename = "TestMapPNGPath", default)]
    pub test_map_png_path: Option<PathBuf>,

    pub input_q_array_path: PathBuf,

    /// `"(x,y)"`
    pub start_position: String,
    pub end_position: String,

    #[serde(default)]
    pub test_start_position: Option<String>,
    #[serde(default)]
    pub test_end_position: Option<String>,

    /// `"(R,G,B) (strength,angle) comment"` entries
    #[serde(default)]
    pub color_map: Vec<String>,

    /// Strength shared by all compass actions
    #[serde(default = "default_action_strength")]
    pub action_strength: i32,

    /// Minimum time between ticks
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    #[serde(default = "default_obstacle_window")]
    pub obstacle_window: usize,

    /// Opt into the two-sided bearing; tables trained on one-sided bearings
    /// will miss most states with this on.
    #[serde(default)]
    pub signed_bearing: bool,

    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
}

fn default_action_strength() -> i32 {
    DEFAULT_ACTION_STRENGTH
}

fn default_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

fn default_obstacle_window() -> usize {
    OBSTACLE_WINDOW_SIZE
}

fn default_max_ticks() -> u64 {
    DEFAULT_MAX_TICKS
}

impl AgentConfig {
    /// Reads and deserialises a JSON config file.
    ///
    /// # Errors
    /// Returns `Io` or `Config` on read or parse failure.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// # Errors
    /// Returns `Config` if the JSON does not match the expected shape.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Joins a relative path onto `working_dir`.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }

    /// Map path for the selected scenario.
    #[must_use]
    pub fn map_path(&self, use_test_map: bool) -> PathBuf {
        let path = match (&self.test_map_png_path, use_test_map) {
            (Some(test), true) => test,
            _ => &self.map_png_path,
        };
        self.resolve(path)
    }

    /// # Errors
    /// Returns `InvalidPoint` if the position string is malformed.
    pub fn start(&self, use_test_map: bool) -> Result<GridPoint> {
        pick(&self.start_position, self.test_start_position.as_ref(), use_test_map)
    }

    /// # Errors
    /// Returns `InvalidPoint` if the position string is malformed.
    pub fn end(&self, use_test_map: bool) -> Result<GridPoint> {
        pick(&self.end_position, self.test_end_position.as_ref(), use_test_map)
    }

    /// # Errors
    /// Returns `InvalidWindow` for an even obstacle window.
    pub fn encoder(&self) -> Result<StateEncoder> {
        let mode = if self.signed_bearing {
            BearingMode::Signed
        } else {
            BearingMode::OneSided
        };
        StateEncoder::new(self.obstacle_window, mode)
    }

    #[must_use]
    pub fn catalog(&self) -> ActionCatalog {
        ActionCatalog::compass(self.action_strength)
    }

    /// Loads the map and the policy table and assembles a navigator with
    /// start and end points set.
    ///
    /// # Errors
    /// Propagates load failures and invalid points.
    pub fn build_navigator(&self, use_test_map: bool) -> Result<Navigator> {
        let colors = parse_color_map(&self.color_map);
        let mut field = load_flow_field(self.map_path(use_test_map), &colors)?;
        field.set_start_point(self.start(use_test_map)?);
        field.set_end_point(self.end(use_test_map)?)?;

        let table = PolicyTable::load(self.resolve(&self.input_q_array_path))?;
        Ok(Navigator::new(field, table, self.catalog(), self.encoder()?))
    }
}

fn pick(main: &str, test: Option<&String>, use_test: bool) -> Result<GridPoint> {
    match (test, use_test) {
        (Some(test), true) => test.parse(),
        _ => main.parse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NavError;

    const JSON: &str = r#"{
        "WorkingDir": "/data/run",
        "MapPNGPath": "maps/map.png",
        "TestMapPNGPath": "maps/test.png",
        "MapARRAYPath": "maps/map.txt",
        "InputQArrayPath": "q.txt",
        "StartPosition": "(5,5)",
        "EndPosition": "(95,95)",
        "TestStartPosition": "(1,2)",
        "TestEndPosition": "(3,4)",
        "ColorMap": ["(255,255,255) (0,0) water"]
    }"#;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = AgentConfig::from_json(JSON).unwrap();
        assert_eq!(config.action_strength, DEFAULT_ACTION_STRENGTH);
        assert_eq!(config.interval_ms, DEFAULT_TICK_INTERVAL_MS);
        assert_eq!(config.obstacle_window, OBSTACLE_WINDOW_SIZE);
        assert!(!config.signed_bearing);
        assert_eq!(config.color_map.len(), 1);
    }

    #[test]
    fn test_paths_resolve_against_working_dir() {
        let config = AgentConfig::from_json(JSON).unwrap();
        assert_eq!(config.map_path(false), PathBuf::from("/data/run/maps/map.png"));
        assert_eq!(config.map_path(true), PathBuf::from("/data/run/maps/test.png"));
        assert_eq!(
            config.resolve(Path::new("/abs/q.txt")),
            PathBuf::from("/abs/q.txt")
        );
    }

    #[test]
    fn test_scenario_points() {
        let config = AgentConfig::from_json(JSON).unwrap();
        assert_eq!(config.start(false).unwrap(), GridPoint::new(5, 5));
        assert_eq!(config.end(false).unwrap(), GridPoint::new(95, 95));
        assert_eq!(config.start(true).unwrap(), GridPoint::new(1, 2));
        assert_eq!(config.end(true).unwrap(), GridPoint::new(3, 4));
    }

    #[test]
    fn test_bad_point_reported() {
        let mut config = AgentConfig::from_json(JSON).unwrap();
        config.start_position = "5,5".to_string();
        assert!(matches!(config.start(false), Err(NavError::InvalidPoint(_))));
    }

    #[test]
    fn test_missing_required_field() {
        assert!(matches!(
            AgentConfig::from_json(r#"{"WorkingDir": "."}"#),
            Err(NavError::Config(_))
        ));
    }
}
