use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use certstamp_core::placement::{HorizontalAnchor, PlacementConfig, VerticalAnchor};
use clap::Args;

/// Placement flags shared by `merge` and `preview`.
///
/// Layering: built-in defaults, then `--config`, then individual flags.
#[derive(Args, Debug, Clone, Default)]
pub struct PlacementArgs {
    /// YAML or JSON placement config file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// QR size as a percentage of certificate width (5-30 recommended).
    #[arg(long)]
    pub size: Option<f64>,

    /// Horizontal anchor: left, center, or right.
    #[arg(long)]
    pub horizontal: Option<String>,

    /// Vertical anchor: top, middle, or bottom.
    #[arg(long)]
    pub vertical: Option<String>,

    /// Margin as a percentage of certificate width (1-10 recommended).
    #[arg(long)]
    pub margin: Option<f64>,
}

pub fn validate_horizontal(value: &str) -> Result<HorizontalAnchor> {
    value.parse::<HorizontalAnchor>().map_err(|e| anyhow!("Invalid --horizontal: {e}"))
}

pub fn validate_vertical(value: &str) -> Result<VerticalAnchor> {
    value.parse::<VerticalAnchor>().map_err(|e| anyhow!("Invalid --vertical: {e}"))
}

/// Resolve the effective placement from defaults, config file, and flags.
pub fn resolve_placement(args: &PlacementArgs) -> Result<PlacementConfig> {
    let mut config = match &args.config {
        Some(path) => PlacementConfig::from_path(path)
            .with_context(|| format!("Failed to load placement config {}", path.display()))?,
        None => PlacementConfig::default(),
    };

    if let Some(size) = args.size {
        config.size_percent = size;
    }
    if let Some(margin) = args.margin {
        config.margin_percent = margin;
    }
    if let Some(h) = &args.horizontal {
        config.horizontal = validate_horizontal(h)?;
    }
    if let Some(v) = &args.vertical {
        config.vertical = validate_vertical(v)?;
    }

    config.validate().context("Invalid placement")?;
    Ok(config)
}

/// One-line description of a placement for human-readable output.
pub fn describe_placement(config: &PlacementConfig) -> String {
    format!(
        "{}% at {}/{} with {}% margin",
        config.size_percent, config.horizontal, config.vertical, config.margin_percent
    )
}
