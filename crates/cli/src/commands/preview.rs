use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use certstamp_core::compositor::RasterCompositor;
use certstamp_core::pipeline::MergePipeline;
use certstamp_core::placement::PlacementConfig;

use crate::commands::describe_placement;
use crate::{ensure_writable, read_input};

/// `preview` subcommand: render a single certificate/QR pair to a JPEG file.
pub fn preview_command(
    qr_archive: &str,
    certificate_archive: &str,
    identifier: i64,
    output: &str,
    placement: &PlacementConfig,
    force: bool,
) -> Result<()> {
    let output_path = Path::new(output);
    ensure_writable(output_path, force)?;

    let qr_bytes = read_input(Path::new(qr_archive), "QR archive")?;
    let certificate_bytes = read_input(Path::new(certificate_archive), "certificate archive")?;

    let compositor = RasterCompositor::new();
    let pipeline = MergePipeline::new(&compositor);
    let image = pipeline
        .preview(&qr_bytes, &certificate_bytes, identifier, placement)
        .with_context(|| format!("Failed to render preview for identifier {identifier}"))?;

    fs::write(output_path, &image)
        .with_context(|| format!("Failed to write preview at {}", output_path.display()))?;

    println!("Rendered preview:");
    println!("  Identifier: {identifier}");
    println!("  Placement: {}", describe_placement(placement));
    println!("  Output: {}", output_path.display());

    Ok(())
}
