#![forbid(unsafe_code)]

//! Tunable timing and interaction parameters for a dropdown instance.
//!
//! All constants the dropdown components use live in one [`DropdownConfig`]
//! that can be loaded from TOML or JSON (feature `config`).
//!
//! # Loading
//!
//! ```toml
//! # navdrop.toml
//! [transition]
//! duration_ms = 220
//! first_interaction_window_ms = 15
//!
//! [interaction]
//! touch_mode_max_viewport_height = 600.0
//! ```
//!
//! ```rust,ignore
//! let config = DropdownConfig::from_toml_file("navdrop.toml")?;
//! let config = DropdownConfig::from_json_str(json)?;
//! ```
//!
//! # Defaults
//!
//! `DropdownConfig::default()` reproduces the stock dropdown feel: 220 ms
//! eased moves, a 15 ms first-interaction snap window, and touch mode at or
//! below a 600 px viewport height.

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use web_time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct DropdownConfig {
    /// Animation timing policy.
    pub transition: TransitionConfig,
    /// Input-mode arbitration.
    pub interaction: InteractionConfig,
    /// Anchor measurement.
    pub dimensions: DimensionConfig,
}

/// Animation timing policy for the panel, background, and indicator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct TransitionConfig {
    /// Reference duration for every eased property.
    pub duration_ms: u64,
    /// Width/height run slightly faster than position.
    pub size_duration_factor: f64,
    /// How long position/size changes snap after the panel opens.
    pub first_interaction_window_ms: u64,
    /// Fraction of `duration_ms` after closing before the next open snaps again.
    pub exit_reset_factor: f64,
    /// Delay before opacity and tilt start moving.
    pub fade_delay_ms: u64,
    /// Delay before the pointer-events gate flips.
    pub pointer_events_delay_ms: u64,
    /// Panel tilt around X while idle, in degrees.
    pub idle_tilt_deg: f64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            duration_ms: 220,
            size_duration_factor: 0.93,
            first_interaction_window_ms: 15,
            exit_reset_factor: 0.9,
            fade_delay_ms: 50,
            pointer_events_delay_ms: 50,
            idle_tilt_deg: -15.0,
        }
    }
}

impl TransitionConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn size_duration(&self) -> Duration {
        scale(self.duration(), self.size_duration_factor)
    }

    pub fn first_interaction_window(&self) -> Duration {
        Duration::from_millis(self.first_interaction_window_ms)
    }

    pub fn exit_reset_delay(&self) -> Duration {
        scale(self.duration(), self.exit_reset_factor)
    }

    pub fn fade_delay(&self) -> Duration {
        Duration::from_millis(self.fade_delay_ms)
    }

    pub fn pointer_events_delay(&self) -> Duration {
        Duration::from_millis(self.pointer_events_delay_ms)
    }
}

/// Input-mode arbitration parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct InteractionConfig {
    /// Viewports this tall or shorter are treated as touch-only.
    pub touch_mode_max_viewport_height: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            touch_mode_max_viewport_height: 600.0,
        }
    }
}

/// Anchor measurement parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct DimensionConfig {
    /// Re-measure anchors on every viewport resize.
    pub responsive: bool,
}

impl Default for DimensionConfig {
    fn default() -> Self {
        Self { responsive: true }
    }
}

fn scale(duration: Duration, factor: f64) -> Duration {
    let nanos = (duration.as_nanos() as f64 * factor).round();
    Duration::from_nanos(nanos.max(0.0) as u64)
}

impl DropdownConfig {
    /// Parse TOML. Missing keys keep their defaults.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Read and parse a TOML file.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_toml_str(&text)
    }

    /// Parse JSON. Missing keys keep their defaults.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Read and parse a JSON file.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json_str(&text)
    }

    /// Load from a file, picking the format from its extension
    /// (`.json` is JSON, anything else TOML), then validate.
    #[cfg(feature = "config")]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_file(path)?,
            _ => Self::from_toml_file(path)?,
        };
        config.validated()
    }

    /// Every out-of-range parameter, one message each. Empty when usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let t = &self.transition;

        if t.duration_ms == 0 {
            problems.push("transition.duration_ms must be > 0".into());
        }
        if !(t.size_duration_factor > 0.0 && t.size_duration_factor <= 1.0) {
            problems.push(format!(
                "transition.size_duration_factor must be in (0, 1], got {}",
                t.size_duration_factor
            ));
        }
        if !(t.exit_reset_factor > 0.0 && t.exit_reset_factor <= 1.0) {
            problems.push(format!(
                "transition.exit_reset_factor must be in (0, 1], got {}",
                t.exit_reset_factor
            ));
        }
        if t.first_interaction_window_ms >= t.duration_ms {
            problems.push(format!(
                "transition.first_interaction_window_ms ({}) must be shorter than duration_ms ({})",
                t.first_interaction_window_ms, t.duration_ms
            ));
        }
        if !t.idle_tilt_deg.is_finite() || t.idle_tilt_deg.abs() > 90.0 {
            problems.push(format!(
                "transition.idle_tilt_deg must be within [-90, 90], got {}",
                t.idle_tilt_deg
            ));
        }

        let threshold = self.interaction.touch_mode_max_viewport_height;
        if !threshold.is_finite() || threshold < 0.0 {
            problems.push(format!(
                "interaction.touch_mode_max_viewport_height must be a non-negative number, got {threshold}"
            ));
        }

        problems
    }

    /// Return `self` if valid, otherwise all validation errors.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Errors from loading or validating a [`DropdownConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    Io(std::io::Error),
    /// Malformed TOML or a mistyped key.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// Malformed JSON or a mistyped key.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Parsed, but [`DropdownConfig::validate`] found problems.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err}"),
            #[cfg(feature = "config")]
            Self::Toml(err) => write!(f, "invalid TOML: {err}"),
            #[cfg(feature = "config")]
            Self::Json(err) => write!(f, "invalid JSON: {err}"),
            Self::Validation(errors) => write!(f, "validation errors: {}", errors.join("; ")),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            #[cfg(feature = "config")]
            Self::Toml(err) => Some(err),
            #[cfg(feature = "config")]
            Self::Json(err) => Some(err),
            Self::Validation(_) => None,
        }
    }
}
