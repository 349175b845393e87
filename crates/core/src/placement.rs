//! QR placement configuration.
//!
//! A [`PlacementConfig`] says how large the QR code is (as a percentage of the
//! certificate width), which corner or edge it is anchored to, and how far it
//! sits from that edge. It is serializable so frontends can keep it in a YAML
//! or JSON file next to their inputs.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default QR size as a percentage of certificate width.
pub const DEFAULT_SIZE_PERCENT: f64 = 15.0;

/// Default margin as a percentage of certificate width.
pub const DEFAULT_MARGIN_PERCENT: f64 = 2.0;

/// Error type for placement configuration.
#[derive(Debug, Error)]
pub enum PlacementError {
    #[error("QR size must be a positive percentage, got {0}")]
    InvalidSize(f64),

    #[error("Margin must be a non-negative percentage, got {0}")]
    InvalidMargin(f64),

    #[error("Unknown {axis} anchor '{value}'. Allowed: {allowed}")]
    UnknownAnchor { axis: &'static str, value: String, allowed: &'static str },

    #[error("Failed to read placement config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse placement config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse placement config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Horizontal anchor for the QR code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAnchor {
    #[default]
    Left,
    Center,
    Right,
}

impl HorizontalAnchor {
    pub fn as_str(&self) -> &'static str {
        match self {
            HorizontalAnchor::Left => "left",
            HorizontalAnchor::Center => "center",
            HorizontalAnchor::Right => "right",
        }
    }
}

impl FromStr for HorizontalAnchor {
    type Err = PlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(HorizontalAnchor::Left),
            "center" => Ok(HorizontalAnchor::Center),
            "right" => Ok(HorizontalAnchor::Right),
            _ => Err(PlacementError::UnknownAnchor {
                axis: "horizontal",
                value: s.to_string(),
                allowed: "left, center, right",
            }),
        }
    }
}

impl fmt::Display for HorizontalAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vertical anchor for the QR code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAnchor {
    #[default]
    Top,
    Middle,
    Bottom,
}

impl VerticalAnchor {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerticalAnchor::Top => "top",
            VerticalAnchor::Middle => "middle",
            VerticalAnchor::Bottom => "bottom",
        }
    }
}

impl FromStr for VerticalAnchor {
    type Err = PlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(VerticalAnchor::Top),
            "middle" => Ok(VerticalAnchor::Middle),
            "bottom" => Ok(VerticalAnchor::Bottom),
            _ => Err(PlacementError::UnknownAnchor {
                axis: "vertical",
                value: s.to_string(),
                allowed: "top, middle, bottom",
            }),
        }
    }
}

impl fmt::Display for VerticalAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_size_percent() -> f64 {
    DEFAULT_SIZE_PERCENT
}

fn default_margin_percent() -> f64 {
    DEFAULT_MARGIN_PERCENT
}

/// Where and how large to draw the QR code on each certificate.
///
/// Both percentages are taken against the certificate *width*, including the
/// vertical margin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementConfig {
    /// QR edge length as a percentage of certificate width.
    #[serde(default = "default_size_percent")]
    pub size_percent: f64,
    #[serde(default)]
    pub horizontal: HorizontalAnchor,
    #[serde(default)]
    pub vertical: VerticalAnchor,
    /// Distance from the anchored edges as a percentage of certificate width.
    #[serde(default = "default_margin_percent")]
    pub margin_percent: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            size_percent: DEFAULT_SIZE_PERCENT,
            horizontal: HorizontalAnchor::default(),
            vertical: VerticalAnchor::default(),
            margin_percent: DEFAULT_MARGIN_PERCENT,
        }
    }
}

impl PlacementConfig {
    pub fn new(
        size_percent: f64,
        horizontal: HorizontalAnchor,
        vertical: VerticalAnchor,
        margin_percent: f64,
    ) -> Self {
        Self { size_percent, horizontal, vertical, margin_percent }
    }

    /// Check the hard invariants: a positive size and a non-negative margin.
    ///
    /// Oversized placements are allowed; see [`exceeds_recommended`](Self::exceeds_recommended).
    pub fn validate(&self) -> Result<(), PlacementError> {
        if !self.size_percent.is_finite() || self.size_percent <= 0.0 {
            return Err(PlacementError::InvalidSize(self.size_percent));
        }
        if !self.margin_percent.is_finite() || self.margin_percent < 0.0 {
            return Err(PlacementError::InvalidMargin(self.margin_percent));
        }
        Ok(())
    }

    /// True when the QR plus both margins would not fit across the width.
    ///
    /// Such placements still render; the overflow is clipped by the canvas.
    pub fn exceeds_recommended(&self) -> bool {
        self.size_percent + 2.0 * self.margin_percent > 100.0
    }

    /// Load a placement config from YAML, or JSON when the extension is `.json`.
    pub fn from_path(path: &Path) -> Result<Self, PlacementError> {
        let body = std::fs::read(path)
            .map_err(|source| PlacementError::Read { path: path.to_path_buf(), source })?;
        let config: PlacementConfig = if is_json_path(path) {
            serde_json::from_slice(&body)?
        } else {
            serde_yaml::from_slice(&body)?
        };
        Ok(config)
    }
}

/// Whether a config path should be treated as JSON rather than YAML.
pub fn is_json_path(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("json"))
}
