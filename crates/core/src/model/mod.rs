//! Core data model: extracted assets, asset sets, and per-certificate outcomes.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::archive::{self, ArchiveEntry, ArchiveError};
use crate::identifier::{format_output_name, identifier_of, is_matchable};

/// One image extracted from an archive, tagged with its filename identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAsset {
    /// Base name of the archive entry.
    pub filename: String,
    pub content: Vec<u8>,
    /// First digit run in `filename`, or [`UNMATCHED_ID`](crate::identifier::UNMATCHED_ID).
    pub identifier: i64,
}

impl RawAsset {
    pub fn new(filename: impl Into<String>, content: Vec<u8>) -> Self {
        let filename = filename.into();
        let identifier = identifier_of(&filename);
        Self { filename, content, identifier }
    }
}

impl From<ArchiveEntry> for RawAsset {
    fn from(entry: ArchiveEntry) -> Self {
        RawAsset::new(entry.filename, entry.content)
    }
}

/// Caller-facing view of one extracted asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetListing {
    pub filename: String,
    pub identifier: i64,
    pub size_bytes: usize,
}

/// Matchable assets from one archive, sorted ascending by identifier.
///
/// The sort is stable, so assets sharing an identifier keep archive order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetSet {
    assets: Vec<RawAsset>,
}

impl AssetSet {
    /// Build a set from extracted assets, dropping those without an identifier.
    pub fn from_assets(assets: impl IntoIterator<Item = RawAsset>) -> Self {
        let mut assets: Vec<RawAsset> = assets
            .into_iter()
            .filter(|asset| {
                let keep = is_matchable(asset.identifier);
                if !keep {
                    debug!(filename = %asset.filename, "skipping asset without identifier");
                }
                keep
            })
            .collect();
        assets.sort_by_key(|asset| asset.identifier);
        Self { assets }
    }

    /// Extract an archive and build the set from its image entries.
    pub fn from_archive(bytes: &[u8]) -> Result<Self, ArchiveError> {
        let entries = archive::extract(bytes)?;
        Ok(Self::from_assets(entries.into_iter().map(RawAsset::from)))
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RawAsset> {
        self.assets.iter()
    }

    pub fn assets(&self) -> &[RawAsset] {
        &self.assets
    }

    /// Consume the set, handing out owned assets in identifier order.
    pub fn into_assets(self) -> Vec<RawAsset> {
        self.assets
    }

    /// First asset carrying `identifier`, if any.
    pub fn find(&self, identifier: i64) -> Option<&RawAsset> {
        self.assets.iter().find(|asset| asset.identifier == identifier)
    }

    pub fn listing(&self) -> Vec<AssetListing> {
        self.assets
            .iter()
            .map(|asset| AssetListing {
                filename: asset.filename.clone(),
                identifier: asset.identifier,
                size_bytes: asset.content.len(),
            })
            .collect()
    }
}

/// Final state of one certificate in a merge run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStatus {
    /// QR code composited onto the certificate.
    Merged,
    /// No QR code shares the certificate's identifier.
    Unmatched,
    /// Decoding, compositing, or encoding failed for this pair.
    Failed,
}

impl MergeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStatus::Merged => "merged",
            MergeStatus::Unmatched => "unmatched",
            MergeStatus::Failed => "failed",
        }
    }
}

/// Result of attempting to merge one certificate.
///
/// Constructed once, already finalized; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    pub identifier: i64,
    pub output_name: String,
    pub status: MergeStatus,
    #[serde(skip)]
    pub result_content: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl MergeOutcome {
    pub fn merged(identifier: i64, content: Vec<u8>) -> Self {
        Self {
            identifier,
            output_name: format_output_name(identifier),
            status: MergeStatus::Merged,
            result_content: Some(content),
            error_detail: None,
        }
    }

    pub fn unmatched(identifier: i64) -> Self {
        Self {
            identifier,
            output_name: format_output_name(identifier),
            status: MergeStatus::Unmatched,
            result_content: None,
            error_detail: None,
        }
    }

    pub fn failed(identifier: i64, detail: impl Into<String>) -> Self {
        Self {
            identifier,
            output_name: format_output_name(identifier),
            status: MergeStatus::Failed,
            result_content: None,
            error_detail: Some(detail.into()),
        }
    }

    pub fn is_merged(&self) -> bool {
        self.status == MergeStatus::Merged
    }
}

/// Named binary payload destined for the output archive.
///
/// Borrows from the outcome that owns the bytes; packing never copies an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputEntry<'a> {
    /// Entry name without extension; the writer appends `.jpg`.
    pub name: &'a str,
    pub content: &'a [u8],
}

impl<'a> OutputEntry<'a> {
    pub fn new(name: &'a str, content: &'a [u8]) -> Self {
        Self { name, content }
    }
}
