//! Flow extraction from a diagnostic's `path` array.
//!
//! The analyzer's path interleaves `event` entries (the numbered notes shown
//! in scan-build's HTML) with `control` entries (jump edges between ranges)
//! and, for macro-heavy code, `macro_expansion` / `note` entries. Only events
//! become flow steps.

use crate::{dictionary, string, value, ClangSaError, Location, SourceFiles};
use cxxsense_core::FlowStep;
use plist::Value;

const EVENT_KIND: &str = "event";

/// Collect the event steps of `path` in document order.
///
/// The analyzer lists events from the start of the bug path to the point
/// where the bug manifests. The order is kept as is.
pub fn extract_flow(
    path: &[Value],
    files: &SourceFiles<'_>,
    context: &str,
) -> Result<Vec<FlowStep>, ClangSaError> {
    let mut steps = Vec::new();
    for (index, entry) in path.iter().enumerate() {
        let context = format!("{context} path entry #{index}");
        let entry = entry.as_dictionary().ok_or_else(|| ClangSaError::Mistyped {
            key: "path",
            context: context.clone(),
            expected: "dictionary",
        })?;

        let kind = value(entry, "kind", &context)?
            .as_string()
            .unwrap_or_default();
        if kind != EVENT_KIND {
            continue;
        }

        let message = string(entry, "message", &context)?;
        let location = Location::parse(dictionary(entry, "location", &context)?, files, &context)?;
        steps.push(FlowStep {
            message: message.to_string(),
            file: location.file.to_string(),
            line: location.line,
        });
    }

    tracing::trace!(steps = steps.len(), "{context}: extracted flow");
    Ok(steps)
}
