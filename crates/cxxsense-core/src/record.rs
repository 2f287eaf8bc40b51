//! Raw per-format records, as produced by the report parsers.
//!
//! These are ephemeral: created during one report parse and consumed by the
//! normalizer right after.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One point in a multi-step diagnostic explanation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowStep {
    pub message: String,
    pub file: String,
    pub line: u32,
}

/// A static-analyzer diagnostic with its resolved source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDiagnostic {
    pub description: String,
    pub checker_name: String,
    pub file_path: String,
    pub line: u32,
    /// Event steps in document order.
    pub flow_steps: Vec<FlowStep>,
}

/// One `<error>` element of an "other tool" report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawError {
    pub file: String,
    pub line: u32,
    pub rule_id: String,
    pub message: String,
}

/// A single frame of a memory-error stack trace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    /// Source path (`dir` joined with `file`), if the frame has debug info.
    pub path: Option<PathBuf>,
    pub line: Option<u32>,
    /// Function name (`fn`).
    pub function: Option<String>,
    /// Object file the instruction pointer belongs to.
    pub object: Option<String>,
    pub ip: Option<String>,
}

impl Frame {
    pub fn located(path: impl Into<PathBuf>, line: u32) -> Self {
        Frame {
            path: Some(path.into()),
            line: Some(line),
            ..Default::default()
        }
    }
}

/// A memory-analysis error. It has no location of its own; see
/// [`crate::frame::select_own_frame`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryError {
    pub kind: String,
    pub what: Option<String>,
    pub auxiliary: Vec<String>,
    /// Primary stack, innermost frame first.
    pub frames: Vec<Frame>,
}

impl MemoryError {
    /// Human-readable message for the violation: the `what` text followed
    /// by any auxiliary notes.
    pub fn description(&self) -> String {
        let mut text = self.what.clone().unwrap_or_else(|| self.kind.clone());
        if !self.auxiliary.is_empty() {
            text.push_str(" (");
            text.push_str(&self.auxiliary.join("; "));
            text.push(')');
        }
        text
    }
}

/// Output of any report parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawRecord {
    Diagnostic(RawDiagnostic),
    Error(RawError),
    Memory(MemoryError),
}

impl From<RawDiagnostic> for RawRecord {
    fn from(value: RawDiagnostic) -> Self {
        RawRecord::Diagnostic(value)
    }
}

impl From<RawError> for RawRecord {
    fn from(value: RawError) -> Self {
        RawRecord::Error(value)
    }
}

impl From<MemoryError> for RawRecord {
    fn from(value: MemoryError) -> Self {
        RawRecord::Memory(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_falls_back_to_kind() {
        let err = MemoryError {
            kind: "Leak_DefinitelyLost".to_string(),
            ..Default::default()
        };
        assert_eq!(err.description(), "Leak_DefinitelyLost");
    }

    #[test]
    fn description_appends_auxiliary_notes() {
        let err = MemoryError {
            kind: "InvalidRead".to_string(),
            what: Some("Invalid read of size 4".to_string()),
            auxiliary: vec!["Address 0x0 is not stack'd".to_string()],
            frames: vec![],
        };
        assert_eq!(
            err.description(),
            "Invalid read of size 4 (Address 0x0 is not stack'd)"
        );
    }
}
