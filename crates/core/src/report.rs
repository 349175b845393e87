//! Aggregated result of a merge run.

use serde::{Deserialize, Serialize};

use crate::archive::{self, ArchiveError};
use crate::model::{MergeOutcome, MergeStatus, OutputEntry};

/// Batch-level classification of a finished (or cancelled) run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchState {
    /// Every certificate was merged.
    Complete,
    /// Some certificates merged, others were unmatched, failed, or never reached.
    Partial,
    /// No certificate was merged (including an empty certificate set).
    NothingMerged,
}

impl BatchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchState::Complete => "complete",
            BatchState::Partial => "partial",
            BatchState::NothingMerged => "nothing_merged",
        }
    }
}

/// Outcomes of one run plus how many certificates were scheduled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// One entry per processed certificate, ascending by identifier.
    pub outcomes: Vec<MergeOutcome>,
    /// Number of matchable certificates in the run.
    pub total: usize,
    /// True when the run stopped early on a cancellation request.
    pub cancelled: bool,
}

impl MergeReport {
    pub fn new(outcomes: Vec<MergeOutcome>, total: usize, cancelled: bool) -> Self {
        Self { outcomes, total, cancelled }
    }

    fn count(&self, status: MergeStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn merged_count(&self) -> usize {
        self.count(MergeStatus::Merged)
    }

    pub fn unmatched_count(&self) -> usize {
        self.count(MergeStatus::Unmatched)
    }

    pub fn failed_count(&self) -> usize {
        self.count(MergeStatus::Failed)
    }

    pub fn batch_state(&self) -> BatchState {
        let merged = self.merged_count();
        if merged == 0 {
            BatchState::NothingMerged
        } else if merged == self.total && !self.cancelled {
            BatchState::Complete
        } else {
            BatchState::Partial
        }
    }

    /// Borrowed `(name, content)` views of every merged outcome, in outcome order.
    pub fn output_entries(&self) -> Vec<OutputEntry<'_>> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.is_merged())
            .filter_map(|outcome| {
                let content = outcome.result_content.as_deref()?;
                Some(OutputEntry::new(&outcome.output_name, content))
            })
            .collect()
    }

    /// Pack every merged outcome into a ZIP archive.
    pub fn pack(&self) -> Result<Vec<u8>, ArchiveError> {
        archive::pack(&self.output_entries())
    }

    /// Serializable view without image bytes.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            state: self.batch_state(),
            total: self.total,
            merged: self.merged_count(),
            unmatched: self.unmatched_count(),
            failed: self.failed_count(),
            cancelled: self.cancelled,
            outcomes: self
                .outcomes
                .iter()
                .map(|o| OutcomeSummary {
                    identifier: o.identifier,
                    output_name: o.output_name.clone(),
                    status: o.status,
                    size_bytes: o.result_content.as_ref().map(Vec::len),
                    error_detail: o.error_detail.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeSummary {
    pub identifier: i64,
    pub output_name: String,
    pub status: MergeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub state: BatchState,
    pub total: usize,
    pub merged: usize,
    pub unmatched: usize,
    pub failed: usize,
    pub cancelled: bool,
    pub outcomes: Vec<OutcomeSummary>,
}
