//! Report path resolution.
//!
//! Each format is configured with a list of report paths. Entries may be
//! absolute or relative to the base directory and may contain glob
//! wildcards (`build/**/*.plist`).

use crate::format::ReportFormat;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One report file to ingest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReportJob {
    pub format: ReportFormat,
    pub path: PathBuf,
}

impl ReportJob {
    pub fn new(format: ReportFormat, path: impl Into<PathBuf>) -> Self {
        Self {
            format,
            path: path.into(),
        }
    }
}

/// Expand `patterns` into existing report files, in pattern order. Matches
/// of one pattern are sorted; a file matched twice is listed once.
pub fn resolve_report_paths(base_dir: &Path, patterns: &[String]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut reports = Vec::new();

    for pattern in patterns {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            continue;
        }
        // Only the user's part is a pattern; the base dir is matched literally.
        let full = if Path::new(pattern).is_absolute() {
            PathBuf::from(pattern)
        } else {
            PathBuf::from(glob::Pattern::escape(&base_dir.to_string_lossy())).join(pattern)
        };

        let entries = match glob::glob(&full.to_string_lossy()) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(pattern, error = %err, "invalid report path pattern");
                continue;
            }
        };

        let mut matched: Vec<PathBuf> = entries
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(err) => {
                    tracing::warn!(pattern, error = %err, "cannot read report candidate");
                    None
                }
            })
            .filter(|path| path.is_file())
            .collect();
        matched.sort();

        if matched.is_empty() {
            tracing::warn!(pattern, base_dir = %base_dir.display(), "no report found");
        }
        for path in matched {
            if seen.insert(path.clone()) {
                reports.push(path);
            }
        }
    }
    reports
}

/// Build jobs for one format.
pub fn discover(format: ReportFormat, base_dir: &Path, patterns: &[String]) -> Vec<ReportJob> {
    let jobs: Vec<ReportJob> = resolve_report_paths(base_dir, patterns)
        .into_iter()
        .map(|path| ReportJob::new(format, path))
        .collect();
    tracing::info!(format = %format, reports = jobs.len(), "discovered reports");
    jobs
}
