use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use certstamp_core::compositor::RasterCompositor;
use certstamp_core::model::MergeStatus;
use certstamp_core::pipeline::MergePipeline;
use certstamp_core::placement::PlacementConfig;
use certstamp_core::report::{MergeReport, RunSummary};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::commands::describe_placement;
use crate::{ensure_writable, read_input, sha256_bytes};

/// Inputs for a merge run, resolved from CLI flags.
#[derive(Debug, Clone)]
pub struct MergeRequest {
    pub qr_archive: PathBuf,
    pub certificate_archive: PathBuf,
    pub output: PathBuf,
    pub placement: PlacementConfig,
    pub parallel: bool,
    pub report: Option<PathBuf>,
    pub force: bool,
}

/// Digest of one packed output entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputDigest {
    pub name: String,
    pub sha256: String,
}

/// JSON run report written next to the output archive on request.
#[derive(Debug, Serialize, Deserialize)]
pub struct MergeRunMetadata {
    pub qr_archive: String,
    pub certificate_archive: String,
    pub output: String,
    pub output_sha256: String,
    pub placement: PlacementConfig,
    pub parallel: bool,
    pub started_at: String,
    pub finished_at: String,
    pub summary: RunSummary,
    pub entries: Vec<OutputDigest>,
}

/// Digest every merged image in a report.
pub fn output_digests(report: &MergeReport) -> Vec<OutputDigest> {
    report
        .output_entries()
        .iter()
        .map(|entry| OutputDigest {
            name: entry.name.to_string(),
            sha256: sha256_bytes(entry.content),
        })
        .collect()
}

/// Run the pipeline, write the output archive (and optional report), and
/// return the report for presentation.
pub fn run_merge(request: &MergeRequest) -> Result<MergeReport> {
    ensure_writable(&request.output, request.force)?;
    if let Some(report_path) = &request.report {
        ensure_writable(report_path, request.force)?;
    }

    let qr_bytes = read_input(&request.qr_archive, "QR archive")?;
    let certificate_bytes = read_input(&request.certificate_archive, "certificate archive")?;

    let started_at = Utc::now().to_rfc3339();
    let compositor = RasterCompositor::new();
    let pipeline = MergePipeline::new(&compositor);
    let progress = |done: usize, total: usize| debug!(done, total, "certificate processed");

    let report = if request.parallel {
        pipeline.run_parallel(&qr_bytes, &certificate_bytes, &request.placement, progress)
    } else {
        pipeline.run(&qr_bytes, &certificate_bytes, &request.placement, progress)
    }
    .context("Merge run failed")?;
    drop(qr_bytes);
    drop(certificate_bytes);

    let archive = report.pack().context("Failed to package merged certificates")?;
    fs::write(&request.output, &archive).with_context(|| {
        format!("Failed to write output archive at {}", request.output.display())
    })?;

    if let Some(report_path) = &request.report {
        let metadata = MergeRunMetadata {
            qr_archive: request.qr_archive.display().to_string(),
            certificate_archive: request.certificate_archive.display().to_string(),
            output: request.output.display().to_string(),
            output_sha256: sha256_bytes(&archive),
            placement: request.placement.clone(),
            parallel: request.parallel,
            started_at,
            finished_at: Utc::now().to_rfc3339(),
            summary: report.summary(),
            entries: output_digests(&report),
        };
        fs::write(report_path, serde_json::to_string_pretty(&metadata)?)
            .with_context(|| format!("Failed to write run report at {}", report_path.display()))?;
    }

    Ok(report)
}

/// `merge` subcommand: stamp QR codes onto matching certificates.
pub fn merge_command(request: &MergeRequest, json: bool) -> Result<()> {
    let report = run_merge(request)?;
    let summary = report.summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Merged {} of {} certificates", summary.merged, summary.total);
    println!("  Placement: {}", describe_placement(&request.placement));
    println!("  State: {}", summary.state.as_str());
    if summary.cancelled {
        println!("  Run was cancelled before all certificates were processed");
    }
    println!("  Output: {}", request.output.display());
    if let Some(report_path) = &request.report {
        println!("  Report: {}", report_path.display());
    }

    for outcome in &summary.outcomes {
        match (&outcome.status, &outcome.error_detail) {
            (MergeStatus::Failed, Some(detail)) => {
                println!("  - {} [{}] {}", outcome.output_name, outcome.status.as_str(), detail)
            }
            _ => println!("  - {} [{}]", outcome.output_name, outcome.status.as_str()),
        }
    }

    Ok(())
}
