//! The ingestion run: parse → normalize per report, in parallel, then submit
//! to the sink.
//!
//! Reports are independent until the sink, so each one is parsed and
//! normalized on a rayon worker. The per-report results are gathered back in
//! job order and submitted sequentially: when two reports carry the same
//! dedup key, the earlier job always wins.

use crate::discovery::ReportJob;
use anyhow::{Context, Result};
use cxxsense_core::{
    DedupSink, IngestError, PathResolver, SinkStats, Violation, ViolationNormalizer,
    ViolationRecorder,
};
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Skip malformed reports instead of failing the run.
    pub error_recovery: bool,
    pub threads: Option<usize>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            error_recovery: true,
            threads: None,
        }
    }
}

/// Normalized violations of one report.
#[derive(Debug, Clone, Default)]
pub struct ReportOutcome {
    pub violations: Vec<Violation>,
    /// Records dropped because their path could not be resolved.
    pub unresolved: usize,
    /// Memory errors without a project frame.
    pub unlocatable: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedReport {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub reports: usize,
    pub failed_reports: Vec<FailedReport>,
    pub unresolved: usize,
    pub unlocatable: usize,
    pub sink: SinkStats,
}

/// Parse and normalize a single report. Records that cannot be normalized
/// are logged and dropped; only a malformed report is an error.
pub fn process_report(
    job: &ReportJob,
    normalizer: &ViolationNormalizer<'_>,
) -> Result<ReportOutcome, IngestError> {
    let records = job.format.parse(&job.path)?;
    let repository_key = job.format.repository_key();
    let mut outcome = ReportOutcome::default();

    for (index, record) in records.into_iter().enumerate() {
        match normalizer.normalize(repository_key, record) {
            Ok(violation) => outcome.violations.push(violation),
            Err(err @ IngestError::Unlocatable { .. }) => {
                outcome.unlocatable += 1;
                tracing::warn!(
                    report = %job.path.display(),
                    record = index,
                    error = %err,
                    "cannot find a project file to assign the error to"
                );
            }
            Err(err) => {
                outcome.unresolved += 1;
                tracing::error!(
                    report = %job.path.display(),
                    record = index,
                    kind = err.kind(),
                    error = %err,
                    "dropping violation"
                );
            }
        }
    }

    tracing::debug!(
        report = %job.path.display(),
        format = %job.format,
        violations = outcome.violations.len(),
        "processed report"
    );
    Ok(outcome)
}

/// Run every job and submit the results to `sink`.
///
/// With `error_recovery` disabled the first malformed report (in job order)
/// fails the run; violations of earlier reports have been submitted by then.
pub fn run_analysis<R: ViolationRecorder>(
    jobs: &[ReportJob],
    resolver: &PathResolver,
    sink: &DedupSink<R>,
    options: &AnalysisOptions,
) -> Result<RunSummary> {
    let normalizer = ViolationNormalizer::new(resolver);
    let parse_all = || -> Vec<Result<ReportOutcome, IngestError>> {
        jobs.par_iter()
            .map(|job| process_report(job, &normalizer))
            .collect()
    };

    let outcomes = match options.threads {
        Some(threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .context("failed to build worker pool")?
            .install(parse_all),
        None => parse_all(),
    };

    let mut summary = RunSummary {
        reports: jobs.len(),
        ..Default::default()
    };
    for (job, outcome) in jobs.iter().zip(outcomes) {
        match outcome {
            Ok(outcome) => {
                summary.unresolved += outcome.unresolved;
                summary.unlocatable += outcome.unlocatable;
                for violation in outcome.violations {
                    sink.submit(violation);
                }
            }
            Err(err) => {
                tracing::error!(
                    report = %job.path.display(),
                    format = %job.format,
                    error = %err,
                    "skipping report"
                );
                if !options.error_recovery {
                    return Err(anyhow::Error::new(err).context(format!(
                        "error recovery is disabled, failing analysis on {}",
                        job.path.display()
                    )));
                }
                summary.failed_reports.push(FailedReport {
                    path: job.path.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    summary.sink = sink.stats();
    tracing::info!(
        reports = summary.reports,
        failed = summary.failed_reports.len(),
        forwarded = summary.sink.forwarded,
        suppressed = summary.sink.suppressed,
        "analysis finished"
    );
    Ok(summary)
}
