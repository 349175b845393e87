use std::io::{Cursor, Read};

use tracing::{debug, trace};

use super::{ArchiveError, ArchiveResult};

/// Raster extensions accepted from input archives (lowercase, with dot).
pub const SUPPORTED_EXTENSIONS: [&str; 3] = [".jpg", ".jpeg", ".png"];

/// An image file extracted from an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Entry name with any directory components removed.
    pub filename: String,
    pub content: Vec<u8>,
}

/// Whether a filename carries one of the supported raster extensions.
pub fn is_supported_image(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    SUPPORTED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Strip directory components, accepting both `/` and `\` separators.
fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Open an in-memory ZIP and return every image entry, fully read.
///
/// Directories and non-image entries are skipped silently. Entries in
/// subfolders are flattened to their base name; duplicate base names are all
/// kept. Fails with [`ArchiveError::Format`] when the container (or one of its
/// image entries) cannot be read.
pub fn extract(bytes: &[u8]) -> ArchiveResult<Vec<ArchiveEntry>> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| ArchiveError::Format(e.to_string()))?;

    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| ArchiveError::Format(format!("Failed to read entry {i}: {e}")))?;

        if entry.is_dir() {
            continue;
        }

        let full_name = entry.name().to_string();
        if !is_supported_image(&full_name) {
            trace!(entry = %full_name, "skipping non-image archive entry");
            continue;
        }

        let mut content = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
        entry.read_to_end(&mut content).map_err(|e| {
            ArchiveError::Format(format!("Failed to read entry '{full_name}': {e}"))
        })?;

        let filename = base_name(&full_name).to_string();
        debug!(entry = %full_name, %filename, bytes = content.len(), "extracted image entry");
        entries.push(ArchiveEntry { filename, content });
    }

    debug!(count = entries.len(), "archive extraction finished");
    Ok(entries)
}
