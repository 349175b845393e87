use std::collections::HashMap;
use std::io::{Cursor, Write};

use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{ArchiveError, ArchiveResult};
use crate::model::OutputEntry;

/// Extension appended to every packed entry name.
pub const OUTPUT_EXTENSION: &str = "jpg";

/// Pack named buffers into a ZIP, one top-level `<name>.jpg` entry each.
///
/// An empty slice yields a valid empty archive. When two entries share a
/// name, the later one wins.
pub fn pack(entries: &[OutputEntry<'_>]) -> ArchiveResult<Vec<u8>> {
    // Last occurrence of each name, in first-seen order.
    let mut latest: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for (idx, entry) in entries.iter().enumerate() {
        if latest.insert(entry.name, idx).is_some() {
            warn!(name = %entry.name, "duplicate output name; keeping the later entry");
        } else {
            order.push(entry.name);
        }
    }

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for name in order {
        let entry = &entries[latest[name]];
        let entry_name = format!("{}.{}", entry.name, OUTPUT_EXTENSION);
        writer.start_file(entry_name.as_str(), options).map_err(|e| {
            ArchiveError::Write(format!("Failed to start entry '{entry_name}': {e}"))
        })?;
        writer.write_all(entry.content).map_err(|e| {
            ArchiveError::Write(format!("Failed to write entry '{entry_name}': {e}"))
        })?;
        debug!(entry = %entry_name, bytes = entry.content.len(), "packed output entry");
    }

    let cursor = writer.finish().map_err(|e| ArchiveError::Write(e.to_string()))?;
    Ok(cursor.into_inner())
}
