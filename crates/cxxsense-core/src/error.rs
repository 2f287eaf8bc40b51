//! Error taxonomy shared by every stage of the ingestion pipeline.
//!
//! None of these are fatal on their own: a malformed report is skipped, an
//! unresolvable or unlocatable violation is dropped. Whether a skipped report
//! should abort the run is decided by the caller (see `cxxsense-sensors`).

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The report could not be read or does not have the expected structure.
    #[error("malformed report '{}': {reason}", report.display())]
    MalformedReport { report: PathBuf, reason: String },

    /// A violation's source path could not be canonicalized.
    #[error("cannot resolve path '{}': {source}", path.display())]
    PathResolution {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No stack frame of a memory error lies inside the project.
    #[error("no project frame for '{kind}' error: {description}")]
    Unlocatable { kind: String, description: String },
}

impl IngestError {
    pub fn malformed(report: impl Into<PathBuf>, reason: impl ToString) -> Self {
        IngestError::MalformedReport {
            report: report.into(),
            reason: reason.to_string(),
        }
    }

    /// Short, stable label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            IngestError::MalformedReport { .. } => "malformed_report",
            IngestError::PathResolution { .. } => "path_resolution",
            IngestError::Unlocatable { .. } => "unlocatable",
        }
    }
}
