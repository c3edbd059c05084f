//! User configuration loaded from a TOML file.
//!
//! Every field is optional; missing fields fall back to the defaults below. The file lives at
//! `<config_dir>/tiltmaze/config.toml` unless a path is given on the command line.

use crate::error::{Result, TiltMazeError};
use crate::input::gesture::{
    GestureConfig, DEFAULT_CELL_ASPECT, DEFAULT_MIN_FLING_VELOCITY, DEFAULT_VELOCITY_WINDOW_MS,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "tiltmaze";
const DEFAULT_TICK_MS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Milliseconds between ball animation steps
    pub tick_ms: u64,
    /// Minimum release speed, in columns per second, for a drag to count as a fling
    pub min_fling_velocity: f32,
    /// Trailing window used to estimate release speed
    pub velocity_window_ms: u64,
    /// Height of a terminal cell relative to its width
    pub cell_aspect: f32,
    /// Where the checkpointed game is stored
    pub snapshot_path: Option<PathBuf>,
    /// Use the monochrome theme
    pub monochrome: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            min_fling_velocity: DEFAULT_MIN_FLING_VELOCITY,
            velocity_window_ms: DEFAULT_VELOCITY_WINDOW_MS,
            cell_aspect: DEFAULT_CELL_ASPECT,
            snapshot_path: None,
            monochrome: false,
        }
    }
}

impl Config {
    /// Load from `path`, or from the default location when `path` is `None`.
    ///
    /// An explicit path must exist; a missing default file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| TiltMazeError::file_error(format!("reading {}", path.display()), e))?;
        Self::from_toml(&text, path)
    }

    /// Parse and validate a TOML document. `origin` is only used in error messages.
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self> {
        let config: Config =
            toml::from_str(text).map_err(|e| TiltMazeError::config(origin, e.to_string().trim()))?;
        config.validate(origin)?;
        Ok(config)
    }

    fn validate(&self, origin: &Path) -> Result<()> {
        if self.tick_ms == 0 {
            return Err(TiltMazeError::config(origin, "tick_ms must be positive"));
        }
        if self.velocity_window_ms == 0 {
            return Err(TiltMazeError::config(
                origin,
                "velocity_window_ms must be positive",
            ));
        }
        if !self.min_fling_velocity.is_finite() || self.min_fling_velocity < 0.0 {
            return Err(TiltMazeError::config(
                origin,
                "min_fling_velocity must be a non-negative number",
            ));
        }
        if !self.cell_aspect.is_finite() || self.cell_aspect <= 0.0 {
            return Err(TiltMazeError::config(origin, "cell_aspect must be positive"));
        }
        Ok(())
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn gesture(&self) -> GestureConfig {
        GestureConfig {
            velocity_window: Duration::from_millis(self.velocity_window_ms),
            min_fling_velocity: self.min_fling_velocity,
            cell_aspect: self.cell_aspect,
        }
    }

    /// Configured snapshot location, or the platform data directory.
    pub fn snapshot_path(&self) -> PathBuf {
        self.snapshot_path
            .clone()
            .unwrap_or_else(default_snapshot_path)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

pub fn default_snapshot_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("snapshot.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> &'static Path {
        Path::new("config.toml")
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = Config::from_toml("", origin()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.tick(), Duration::from_millis(60));
    }

    #[test]
    fn partial_document_overrides_fields() {
        let config = Config::from_toml(
            "tick_ms = 30\nmin_fling_velocity = 2.5\nsnapshot_path = \"/tmp/maze.toml\"\n",
            origin(),
        )
        .unwrap();
        assert_eq!(config.tick_ms, 30);
        assert_eq!(config.gesture().min_fling_velocity, 2.5);
        assert_eq!(config.gesture().cell_aspect, DEFAULT_CELL_ASPECT);
        assert_eq!(config.snapshot_path(), PathBuf::from("/tmp/maze.toml"));
    }

    #[test]
    fn unknown_and_invalid_fields_are_rejected() {
        let unknown = Config::from_toml("speed = 3", origin()).unwrap_err();
        assert!(matches!(unknown, TiltMazeError::ConfigError { .. }));

        let zero_tick = Config::from_toml("tick_ms = 0", origin()).unwrap_err();
        assert!(zero_tick.to_string().contains("tick_ms"));

        let flat = Config::from_toml("cell_aspect = 0.0", origin()).unwrap_err();
        assert!(flat.to_string().contains("cell_aspect"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, TiltMazeError::FileError { .. }));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "monochrome = true\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert!(config.monochrome);
    }
}
