//! ZIP archive handling for asset inputs and merged outputs.
//!
//! - `reader`: opens an in-memory archive and yields its image entries.
//! - `writer`: packs merged results into a fresh archive.

pub mod reader;
pub mod writer;

use thiserror::Error;

pub use reader::{extract, is_supported_image, ArchiveEntry, SUPPORTED_EXTENSIONS};
pub use writer::{pack, OUTPUT_EXTENSION};

/// Error type for archive operations.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The bytes are not a readable ZIP container.
    #[error("Invalid or corrupt archive: {0}")]
    Format(String),

    /// Packing the output archive failed.
    #[error("Failed to write archive: {0}")]
    Write(String),
}

/// Convenience result type for archive operations.
pub type ArchiveResult<T> = Result<T, ArchiveError>;
