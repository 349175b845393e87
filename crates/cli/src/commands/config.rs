use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use certstamp_core::placement::{is_json_path, PlacementConfig};

use crate::ensure_writable;

/// Default file name for `init-config`.
pub const DEFAULT_CONFIG_FILE: &str = "placement.yaml";

/// Serialize a placement in the format implied by the target path.
pub fn render_config(config: &PlacementConfig, path: &Path) -> Result<String> {
    if is_json_path(path) {
        serde_json::to_string_pretty(config).context("Failed to serialize placement config JSON")
    } else {
        serde_yaml::to_string(config).context("Failed to serialize placement config YAML")
    }
}

/// `init-config` subcommand: write the default placement config.
pub fn init_config_command(path: &str, force: bool) -> Result<()> {
    let path = Path::new(path);
    ensure_writable(path, force)?;

    let config = PlacementConfig::default();
    let body = render_config(&config, path)?;
    fs::write(path, body)
        .with_context(|| format!("Failed to write placement config at {}", path.display()))?;

    println!("Wrote default placement config:");
    println!("  Path: {}", path.display());
    println!("  Size: {}%", config.size_percent);
    println!("  Anchor: {}/{}", config.horizontal, config.vertical);
    println!("  Margin: {}%", config.margin_percent);

    Ok(())
}
