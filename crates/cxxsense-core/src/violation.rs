//! The canonical violation record every report format converges on.

use crate::record::FlowStep;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Rule repository of Clang Static Analyzer checkers.
pub const CLANGSA_REPOSITORY_KEY: &str = "ClangSA";
/// Rule repository of custom "other tool" rules.
pub const OTHER_REPOSITORY_KEY: &str = "other";
/// Rule repository of Valgrind memcheck error kinds.
pub const VALGRIND_REPOSITORY_KEY: &str = "valgrind";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub rule_repository_key: String,
    /// Canonical path of the source file.
    pub file_path: PathBuf,
    pub line: u32,
    pub rule_id: String,
    pub message: String,
    /// Present only for diagnostics with more than one step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_steps: Option<Vec<FlowStep>>,
}

impl Violation {
    /// `repository:rule`, the fully qualified rule key.
    pub fn rule_key(&self) -> String {
        format!("{}:{}", self.rule_repository_key, self.rule_id)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: [{}] {}",
            self.file_path.display(),
            self.line,
            self.rule_key(),
            self.message
        )
    }
}
