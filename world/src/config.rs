//! Session tuning loaded from TOML.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use shadowgrid_core::LevelConfig;
use thiserror::Error;

const MAX_SCAN_RADIUS: u32 = 64;
const MAX_MAP_SCALE: f64 = 10.0;

/// Errors raised while loading a session configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read session config at {}", .path.display())]
    Read {
        /// Location that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The contents are not valid TOML for a session configuration.
    #[error("failed to parse session config")]
    Parse(#[from] toml::de::Error),
    /// A value is outside its accepted range.
    #[error("invalid session config: {0}")]
    Invalid(String),
}

/// Tunable parameters of a session.
///
/// Every field has a default, so a TOML file only needs the keys it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Chance that an interior cell starts as a wall during cave generation.
    pub wall_probability: f64,
    /// Number of cellular automata smoothing rounds.
    pub smoothing_iterations: u32,
    /// Factor applied to a level's nominal grid size to obtain the map size.
    pub map_scale: f64,
    /// Radius, in steps, of every fog of war reveal.
    pub scan_radius: u32,
    /// Milliseconds between two rings of an animated reveal.
    pub reveal_interval_ms: u64,
    /// Resources granted by each collected resource tile.
    pub resource_value: u32,
    /// One-based level the session starts on.
    pub start_level: u32,
}

impl SessionConfig {
    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the configuration stored at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Checks that every value lies in its accepted range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.wall_probability) {
            return Err(ConfigError::Invalid(format!(
                "wall_probability must lie in [0, 1], got {}",
                self.wall_probability
            )));
        }
        if !(self.map_scale > 0.0 && self.map_scale <= MAX_MAP_SCALE) {
            return Err(ConfigError::Invalid(format!(
                "map_scale must lie in (0, {MAX_MAP_SCALE}], got {}",
                self.map_scale
            )));
        }
        if self.scan_radius > MAX_SCAN_RADIUS {
            return Err(ConfigError::Invalid(format!(
                "scan_radius must not exceed {MAX_SCAN_RADIUS}, got {}",
                self.scan_radius
            )));
        }
        if LevelConfig::for_level(self.start_level).is_none() {
            return Err(ConfigError::Invalid(format!(
                "start_level must lie in [1, {}], got {}",
                LevelConfig::COUNT,
                self.start_level
            )));
        }
        Ok(())
    }

    /// Delay between two rings of an animated reveal.
    #[must_use]
    pub fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.reveal_interval_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            wall_probability: 0.38,
            smoothing_iterations: 3,
            map_scale: 1.5,
            scan_radius: 5,
            reveal_interval_ms: 80,
            resource_value: 10,
            start_level: 1,
        }
    }
}
