use std::path::Path;

use anyhow::{Context, Result};
use certstamp_core::archive;
use certstamp_core::identifier::{identifier_of, is_matchable};
use certstamp_core::model::AssetListing;

use crate::read_input;

/// Every image entry in an archive with its identifier, in archive order.
///
/// Unlike an `AssetSet`, entries without an identifier are included.
pub fn archive_listing(path: &Path) -> Result<Vec<AssetListing>> {
    let bytes = read_input(path, "archive")?;
    let entries = archive::extract(&bytes)
        .with_context(|| format!("Failed to read archive {}", path.display()))?;
    Ok(entries
        .into_iter()
        .map(|entry| AssetListing {
            identifier: identifier_of(&entry.filename),
            size_bytes: entry.content.len(),
            filename: entry.filename,
        })
        .collect())
}

/// List the images in an archive and the identifiers they pair by.
pub fn list_command(archive: &str, json: bool) -> Result<()> {
    let listing = archive_listing(Path::new(archive))?;

    if json {
        let serialized =
            serde_json::to_string_pretty(&listing).context("Failed to serialize listing to JSON")?;
        println!("{}", serialized);
        return Ok(());
    }

    println!("Images ({}):", listing.len());
    if listing.is_empty() {
        println!("  (none)");
        return Ok(());
    }

    for item in listing {
        let id_display = if is_matchable(item.identifier) {
            item.identifier.to_string()
        } else {
            "-".to_string()
        };
        println!("  - {} [id: {}] {} bytes", item.filename, id_display, item.size_bytes);
    }

    Ok(())
}
