//! Clang Static Analyzer report ingestion.
//!
//! `scan-build -plist` / `clang --analyze -Xanalyzer -analyzer-output=plist`
//! write one property list per translation unit:
//!
//! ```text
//! <dict>
//!   files        = [ "/src/a.cpp", "/src/a.h", ... ]
//!   diagnostics  = [
//!     { description, check_name,
//!       location = { line, col, file: <index into files> },
//!       path     = [ { kind = "event" | "control" | ..., message, location }, ... ] }
//!   ]
//! </dict>
//! ```
//!
//! Both XML and binary property lists are accepted. Any structural problem
//! fails the whole report; there is no partial result.

mod files;
pub mod flow;

use cxxsense_core::RawDiagnostic;
use plist::{Dictionary, Value};
use std::io::Cursor;
use std::path::Path;

pub use files::SourceFiles;
pub use flow::extract_flow;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ClangSaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid property list: {0}")]
    Plist(#[from] plist::Error),

    #[error("root object is not a dictionary")]
    RootNotDictionary,

    #[error("missing key '{key}' in {context}")]
    MissingKey { key: &'static str, context: String },

    #[error("key '{key}' in {context} is not a {expected}")]
    Mistyped {
        key: &'static str,
        context: String,
        expected: &'static str,
    },

    #[error("file index {index} out of range ({len} files) in {context}")]
    FileIndexOutOfRange {
        index: u64,
        len: usize,
        context: String,
    },
}

// ============================================================================
// Parsing
// ============================================================================

/// Read and parse a report file.
pub fn parse_report(path: &Path) -> Result<Vec<RawDiagnostic>, ClangSaError> {
    let bytes = std::fs::read(path)?;
    let diagnostics = parse_bytes(&bytes)?;
    tracing::debug!(
        report = %path.display(),
        diagnostics = diagnostics.len(),
        "parsed clang static analyzer report"
    );
    Ok(diagnostics)
}

/// Parse an XML or binary property list held in memory.
pub fn parse_bytes(bytes: &[u8]) -> Result<Vec<RawDiagnostic>, ClangSaError> {
    let root = Value::from_reader(Cursor::new(bytes))?;
    parse_value(&root)
}

/// Extract every diagnostic of an already decoded property list.
pub fn parse_value(root: &Value) -> Result<Vec<RawDiagnostic>, ClangSaError> {
    let root = root.as_dictionary().ok_or(ClangSaError::RootNotDictionary)?;
    let files = SourceFiles::from_root(root)?;
    let diagnostics = array(root, "diagnostics", "report root")?;

    diagnostics
        .iter()
        .enumerate()
        .map(|(index, diagnostic)| parse_diagnostic(index, diagnostic, &files))
        .collect()
}

fn parse_diagnostic(
    index: usize,
    value: &Value,
    files: &SourceFiles<'_>,
) -> Result<RawDiagnostic, ClangSaError> {
    let context = format!("diagnostic #{index}");
    let diagnostic = value.as_dictionary().ok_or_else(|| ClangSaError::Mistyped {
        key: "diagnostics",
        context: context.clone(),
        expected: "dictionary",
    })?;

    let description = string(diagnostic, "description", &context)?.to_string();
    let checker_name = string(diagnostic, "check_name", &context)?.to_string();
    let location = Location::parse(dictionary(diagnostic, "location", &context)?, files, &context)?;

    let flow_steps = match diagnostic.get("path") {
        None => Vec::new(),
        Some(path) => {
            let entries = path.as_array().ok_or_else(|| ClangSaError::Mistyped {
                key: "path",
                context: context.clone(),
                expected: "array",
            })?;
            extract_flow(entries, files, &context)?
        }
    };

    Ok(RawDiagnostic {
        description,
        checker_name,
        file_path: location.file.to_string(),
        line: location.line,
        flow_steps,
    })
}

// ============================================================================
// Typed accessors
// ============================================================================

/// A `location` dictionary with its file index already resolved.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Location<'a> {
    pub file: &'a str,
    pub line: u32,
}

impl<'a> Location<'a> {
    pub(crate) fn parse(
        location: &Dictionary,
        files: &SourceFiles<'a>,
        context: &str,
    ) -> Result<Self, ClangSaError> {
        let context = format!("{context} location");
        let line = integer(location, "line", &context)?;
        let line = u32::try_from(line).map_err(|_| ClangSaError::Mistyped {
            key: "line",
            context: context.clone(),
            expected: "32-bit line number",
        })?;
        let index = integer(location, "file", &context)?;
        let file = files.resolve(index, &context)?;
        Ok(Location { file, line })
    }
}

pub(crate) fn value<'a>(
    dict: &'a Dictionary,
    key: &'static str,
    context: &str,
) -> Result<&'a Value, ClangSaError> {
    dict.get(key).ok_or_else(|| ClangSaError::MissingKey {
        key,
        context: context.to_string(),
    })
}

pub(crate) fn string<'a>(
    dict: &'a Dictionary,
    key: &'static str,
    context: &str,
) -> Result<&'a str, ClangSaError> {
    value(dict, key, context)?
        .as_string()
        .ok_or_else(|| mistyped(key, context, "string"))
}

pub(crate) fn integer(dict: &Dictionary, key: &'static str, context: &str) -> Result<u64, ClangSaError> {
    value(dict, key, context)?
        .as_unsigned_integer()
        .ok_or_else(|| mistyped(key, context, "non-negative integer"))
}

pub(crate) fn array<'a>(
    dict: &'a Dictionary,
    key: &'static str,
    context: &str,
) -> Result<&'a [Value], ClangSaError> {
    value(dict, key, context)?
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| mistyped(key, context, "array"))
}

pub(crate) fn dictionary<'a>(
    dict: &'a Dictionary,
    key: &'static str,
    context: &str,
) -> Result<&'a Dictionary, ClangSaError> {
    value(dict, key, context)?
        .as_dictionary()
        .ok_or_else(|| mistyped(key, context, "dictionary"))
}

fn mistyped(key: &'static str, context: &str, expected: &'static str) -> ClangSaError {
    ClangSaError::Mistyped {
        key,
        context: context.to_string(),
        expected,
    }
}
