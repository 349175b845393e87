//! The merge pipeline: extract both archives, pair by identifier, composite.
//!
//! A run is split in two steps so callers can inspect or cancel between them:
//! [`MergeRun::prepare`] does all fatal work up front (config validation and
//! archive extraction), then [`MergePipeline::execute`] walks the certificates
//! in identifier order. Per-pair failures are recorded as outcomes and never
//! abort the batch.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::archive::ArchiveError;
use crate::compositor::{CompositeError, Compositor};
use crate::model::{AssetSet, MergeOutcome, RawAsset};
use crate::placement::{PlacementConfig, PlacementError};
use crate::report::MergeReport;

/// Which input set an error or lookup refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    QrCode,
    Certificate,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::QrCode => f.write_str("QR code"),
            AssetKind::Certificate => f.write_str("certificate"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid placement: {0}")]
    Config(#[from] PlacementError),

    /// One of the input archives could not be opened. Nothing was processed.
    #[error("Failed to read {kind} archive: {source}")]
    Archive {
        kind: AssetKind,
        #[source]
        source: ArchiveError,
    },

    #[error("No {kind} with identifier {identifier}")]
    IdentifierNotFound { kind: AssetKind, identifier: i64 },

    #[error(transparent)]
    Composite(#[from] CompositeError),
}

/// Cooperative cancellation flag, checked between pairs.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// State of one user-initiated merge.
///
/// Owns both asset sets and the placement. Dropping the run releases every
/// buffer it still holds.
#[derive(Debug)]
pub struct MergeRun {
    pub qr_codes: AssetSet,
    pub certificates: AssetSet,
    pub config: PlacementConfig,
    pub cancel: CancelToken,
    outcomes: Vec<MergeOutcome>,
}

impl MergeRun {
    /// Validate the placement and extract both archives.
    ///
    /// Any error here is fatal to the whole run.
    pub fn prepare(
        qr_archive: &[u8],
        certificate_archive: &[u8],
        config: &PlacementConfig,
    ) -> Result<Self, PipelineError> {
        config.validate()?;

        let qr_codes = AssetSet::from_archive(qr_archive)
            .map_err(|source| PipelineError::Archive { kind: AssetKind::QrCode, source })?;
        let certificates = AssetSet::from_archive(certificate_archive)
            .map_err(|source| PipelineError::Archive { kind: AssetKind::Certificate, source })?;

        Self::from_sets(qr_codes, certificates, config)
    }

    /// Build a run from already extracted sets.
    pub fn from_sets(
        qr_codes: AssetSet,
        certificates: AssetSet,
        config: &PlacementConfig,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        if config.exceeds_recommended() {
            warn!(
                size_percent = config.size_percent,
                margin_percent = config.margin_percent,
                "QR size plus margins exceeds certificate width; overflow will be clipped"
            );
        }

        let outcomes = Vec::with_capacity(certificates.len());
        Ok(Self {
            qr_codes,
            certificates,
            config: config.clone(),
            cancel: CancelToken::new(),
            outcomes,
        })
    }

    /// Share an externally owned cancellation token.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Reports `(completed, total)` after each certificate; `completed` only grows.
struct Progress<F> {
    completed: usize,
    total: usize,
    callback: F,
}

impl<F: FnMut(usize, usize)> Progress<F> {
    fn new(total: usize, callback: F) -> Self {
        Self { completed: 0, total, callback }
    }

    fn advance(&mut self) {
        self.completed += 1;
        (self.callback)(self.completed, self.total);
    }
}

/// QR lookup by identifier; on duplicates the later asset wins.
fn qr_lookup(qr_codes: &AssetSet) -> HashMap<i64, &RawAsset> {
    let mut lookup = HashMap::with_capacity(qr_codes.len());
    for asset in qr_codes.iter() {
        if let Some(previous) = lookup.insert(asset.identifier, asset) {
            warn!(
                identifier = asset.identifier,
                replaced = %previous.filename,
                kept = %asset.filename,
                "duplicate QR identifier; the later file wins"
            );
        }
    }
    lookup
}

/// Coordinator that pairs certificates with QR codes and drives the compositor.
pub struct MergePipeline<'a> {
    pub compositor: &'a dyn Compositor,
}

impl<'a> MergePipeline<'a> {
    pub fn new(compositor: &'a dyn Compositor) -> Self {
        Self { compositor }
    }

    /// Prepare and execute a run in one call, sequentially.
    pub fn run<F>(
        &self,
        qr_archive: &[u8],
        certificate_archive: &[u8],
        config: &PlacementConfig,
        on_progress: F,
    ) -> Result<MergeReport, PipelineError>
    where
        F: FnMut(usize, usize),
    {
        let run = MergeRun::prepare(qr_archive, certificate_archive, config)?;
        Ok(self.execute(run, on_progress))
    }

    /// Like [`run`](Self::run), but composites pairs on the rayon pool.
    pub fn run_parallel<F>(
        &self,
        qr_archive: &[u8],
        certificate_archive: &[u8],
        config: &PlacementConfig,
        on_progress: F,
    ) -> Result<MergeReport, PipelineError>
    where
        F: FnMut(usize, usize) + Send,
    {
        let run = MergeRun::prepare(qr_archive, certificate_archive, config)?;
        Ok(self.execute_parallel(run, on_progress))
    }

    /// Process every certificate in ascending identifier order.
    ///
    /// Each certificate's buffer is released as soon as its pair is done.
    pub fn execute<F>(&self, run: MergeRun, on_progress: F) -> MergeReport
    where
        F: FnMut(usize, usize),
    {
        let MergeRun { qr_codes, certificates, config, cancel, mut outcomes } = run;
        let total = certificates.len();
        info!(qr_codes = qr_codes.len(), certificates = total, "starting merge run");

        let lookup = qr_lookup(&qr_codes);
        let mut progress = Progress::new(total, on_progress);
        let mut cancelled = false;

        for certificate in certificates.into_assets() {
            if cancel.is_cancelled() {
                cancelled = true;
                info!(completed = progress.completed, total, "merge run cancelled");
                break;
            }
            let qr = lookup.get(&certificate.identifier).copied();
            outcomes.push(self.merge_pair(&certificate, qr, &config));
            drop(certificate);
            progress.advance();
        }

        let report = MergeReport::new(outcomes, total, cancelled);
        log_finished(&report);
        report
    }

    /// Process certificates concurrently; outcomes come back sorted by identifier.
    ///
    /// The progress callback is serialized, so `completed` still only grows.
    pub fn execute_parallel<F>(&self, run: MergeRun, on_progress: F) -> MergeReport
    where
        F: FnMut(usize, usize) + Send,
    {
        let MergeRun { qr_codes, certificates, config, cancel, outcomes: _ } = run;
        let total = certificates.len();
        info!(qr_codes = qr_codes.len(), certificates = total, "starting parallel merge run");

        let lookup = qr_lookup(&qr_codes);
        let progress = Mutex::new(Progress::new(total, on_progress));

        let mut outcomes: Vec<MergeOutcome> = certificates
            .into_assets()
            .into_par_iter()
            .filter_map(|certificate| {
                if cancel.is_cancelled() {
                    return None;
                }
                let qr = lookup.get(&certificate.identifier).copied();
                let outcome = self.merge_pair(&certificate, qr, &config);
                drop(certificate);
                progress.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).advance();
                Some(outcome)
            })
            .collect();
        outcomes.sort_by_key(|outcome| outcome.identifier);

        let cancelled = outcomes.len() < total;
        if cancelled {
            info!(completed = outcomes.len(), total, "merge run cancelled");
        }
        let report = MergeReport::new(outcomes, total, cancelled);
        log_finished(&report);
        report
    }

    /// Merge one certificate with its QR code, if it has one.
    pub fn merge_pair(
        &self,
        certificate: &RawAsset,
        qr: Option<&RawAsset>,
        config: &PlacementConfig,
    ) -> MergeOutcome {
        let identifier = certificate.identifier;
        let Some(qr) = qr else {
            debug!(identifier, certificate = %certificate.filename, "no QR code for certificate");
            return MergeOutcome::unmatched(identifier);
        };

        match self.compositor.composite(&certificate.content, &qr.content, config) {
            Ok(content) => {
                debug!(
                    identifier,
                    certificate = %certificate.filename,
                    qr = %qr.filename,
                    bytes = content.len(),
                    "merged pair"
                );
                MergeOutcome::merged(identifier, content)
            }
            Err(err) => {
                warn!(
                    identifier,
                    certificate = %certificate.filename,
                    error = %err,
                    "merge failed"
                );
                MergeOutcome::failed(identifier, err.to_string())
            }
        }
    }

    /// Composite a single pair from the two archives for position tuning.
    ///
    /// Uses the first certificate and the last QR code carrying `identifier`,
    /// matching the pairing rules of a full run.
    pub fn preview(
        &self,
        qr_archive: &[u8],
        certificate_archive: &[u8],
        identifier: i64,
        config: &PlacementConfig,
    ) -> Result<Vec<u8>, PipelineError> {
        let run = MergeRun::prepare(qr_archive, certificate_archive, config)?;
        let certificate = run.certificates.find(identifier).ok_or(
            PipelineError::IdentifierNotFound { kind: AssetKind::Certificate, identifier },
        )?;
        let lookup = qr_lookup(&run.qr_codes);
        let qr = lookup
            .get(&identifier)
            .ok_or(PipelineError::IdentifierNotFound { kind: AssetKind::QrCode, identifier })?;

        Ok(self.compositor.preview(&certificate.content, &qr.content, &run.config)?)
    }
}

fn log_finished(report: &MergeReport) {
    info!(
        merged = report.merged_count(),
        unmatched = report.unmatched_count(),
        failed = report.failed_count(),
        total = report.total,
        state = report.batch_state().as_str(),
        "merge run finished"
    );
}
