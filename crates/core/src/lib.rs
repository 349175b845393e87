//! certstamp-core
//!
//! Core library for stamping QR codes onto certificate images in batch.
//!
//! This crate defines the asset model, archive reading/writing, filename
//! identifier extraction, QR placement and compositing, and the merge
//! pipeline that pairs certificates with their QR codes.
//!
//! All substantive logic lives here so it is fully testable and reusable
//! from multiple frontends (CLI, desktop shells, etc.).

pub mod archive;
pub mod compositor;
pub mod identifier;
pub mod model;
pub mod pipeline;
pub mod placement;
pub mod report;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
