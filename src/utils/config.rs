//! Overlay configuration with clamped knobs and JSON persistence.
//!
//! Out-of-range values are clamped rather than rejected: a host passing
//! `max_vertical_level = 40` gets 10, not an error. The clamp bounds also
//! protect the collision pass, which is O(active²) per level.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::algorithms::layout::LayoutParams;
use crate::core::constants::H_PIXELS_PER_DEGREE;
use crate::processing::tracker::TrackerConfig;

/// Upper bound for `max_vertical_level`
pub const MAX_VERTICAL_LEVEL_LIMIT: u32 = 10;

/// Upper bound for `max_visible_annotations`
pub const MAX_VISIBLE_ANNOTATIONS_LIMIT: usize = 500;

/// Engine-wide configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Highest stacking level that renders, clamped to 0–10
    pub max_vertical_level: u32,
    /// Active-annotation cap, clamped to 0–500
    pub max_visible_annotations: usize,
    /// Distance cutoff for activation in meters; 0 means unlimited
    pub max_distance_m: f64,
    /// Exponential heading smoothing factor, clamped to (0, 1];
    /// 1 renders the raw heading, smaller values smooth harder
    pub heading_smoothing_factor: f64,
    /// Overlay pixels per degree of azimuth
    pub pixels_per_degree: f64,
    /// Annotation view width in pixels (drives collision width)
    pub annotation_view_width_px: f64,
    /// Annotation view height in pixels (drives stacking offsets)
    pub annotation_view_height_px: f64,
    /// Sensor tracking knobs
    pub tracker: TrackerConfig,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            max_vertical_level: 5,
            max_visible_annotations: 100,
            max_distance_m: 0.0,
            heading_smoothing_factor: 1.0,
            pixels_per_degree: H_PIXELS_PER_DEGREE,
            annotation_view_width_px: 150.0,
            annotation_view_height_px: 50.0,
            tracker: TrackerConfig::default(),
        }
    }
}

impl OverlayConfig {
    /// Copy of this configuration with every knob forced into range
    pub fn clamped(&self) -> Self {
        let mut clamped = self.clone();
        clamped.max_vertical_level = self.max_vertical_level.min(MAX_VERTICAL_LEVEL_LIMIT);
        clamped.max_visible_annotations = self
            .max_visible_annotations
            .min(MAX_VISIBLE_ANNOTATIONS_LIMIT);
        clamped.max_distance_m = self.max_distance_m.max(0.0);
        clamped.heading_smoothing_factor = if self.heading_smoothing_factor.is_finite() {
            self.heading_smoothing_factor.clamp(f64::MIN_POSITIVE, 1.0)
        } else {
            1.0
        };
        clamped.pixels_per_degree = if self.pixels_per_degree.is_finite() && self.pixels_per_degree > 0.0 {
            self.pixels_per_degree
        } else {
            H_PIXELS_PER_DEGREE
        };
        clamped.annotation_view_width_px = self.annotation_view_width_px.max(1.0);
        clamped.annotation_view_height_px = self.annotation_view_height_px.max(1.0);
        clamped
    }

    /// Layout parameters derived from the current knobs
    pub fn layout_params(&self) -> LayoutParams {
        LayoutParams {
            pixels_per_degree: self.pixels_per_degree,
            view_width_px: self.annotation_view_width_px,
            view_height_px: self.annotation_view_height_px,
            max_vertical_level: self.max_vertical_level,
        }
    }

    /// Load a configuration from a JSON file and clamp it
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            message: format!("failed to read config file '{}': {}", path_str, e),
        })?;

        let config: OverlayConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Serialization {
                message: format!("failed to parse config file '{}': {}", path_str, e),
            })?;

        debug!(path = %path_str, "configuration loaded");
        Ok(config.clamped())
    }

    /// Write the configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialization {
                message: format!("failed to serialize config: {}", e),
            })?;

        fs::write(&path, content).map_err(|e| ConfigError::Io {
            message: format!("failed to write config file '{}': {}", path_str, e),
        })
    }
}

/// Configuration persistence errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Io { message: String },
    Serialization { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { message } => write!(f, "config I/O error: {}", message),
            ConfigError::Serialization { message } => {
                write!(f, "config serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
