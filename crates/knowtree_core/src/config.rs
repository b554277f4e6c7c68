//! Core tuning configuration.
//!
//! # Responsibility
//! - Group layout and search tuning into one deserializable document.
//! - Validate values before they reach the algorithms.
//!
//! # Invariants
//! - Missing keys fall back to defaults.
//! - A validated config never makes layout or search loop unboundedly.

use crate::layout::radial::LayoutConfig;
use crate::search::index::SearchOptions;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors from reading or validating configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file cannot be read.
    Io(std::io::Error),
    /// Config text is not valid TOML for this schema.
    Parse(toml::de::Error),
    /// Value parsed but is out of range.
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

/// Top-level configuration document.
///
/// ```toml
/// [layout]
/// radius_step = 150.0
///
/// [search]
/// threshold = 0.25
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub layout: LayoutConfig,
    pub search: SearchOptions,
}

impl CoreConfig {
    /// Parses and validates TOML text.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Checks ranges of every tunable.
    ///
    /// # Errors
    /// - `Invalid` for non-finite or non-positive layout steps, a spiral
    ///   without probes, or a search threshold outside `0.0..=1.0`.
    pub fn validate(&self) -> ConfigResult<()> {
        let layout = &self.layout;
        for (name, value) in [
            ("layout.radius_step", layout.radius_step),
            ("layout.spiral_angle_step", layout.spiral_angle_step),
            ("layout.spiral_radius_step", layout.spiral_radius_step),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "`{name}` must be a positive number, got {value}"
                )));
            }
        }
        if !layout.origin.x.is_finite() || !layout.origin.y.is_finite() {
            return Err(ConfigError::Invalid(
                "`layout.origin` must be finite".to_string(),
            ));
        }
        if layout.max_spiral_steps == 0 {
            return Err(ConfigError::Invalid(
                "`layout.max_spiral_steps` must be at least 1".to_string(),
            ));
        }

        let search = &self.search;
        if !(0.0..=1.0).contains(&search.threshold) {
            return Err(ConfigError::Invalid(format!(
                "`search.threshold` must be within 0.0..=1.0, got {}",
                search.threshold
            )));
        }
        if search.distance == 0 {
            return Err(ConfigError::Invalid(
                "`search.distance` must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
