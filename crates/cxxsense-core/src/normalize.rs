//! Mapping of raw per-format records into [`Violation`]s.

use crate::error::IngestError;
use crate::frame::select_own_frame_by;
use crate::path::PathResolver;
use crate::record::{FlowStep, MemoryError, RawDiagnostic, RawError, RawRecord};
use crate::violation::Violation;

#[derive(Debug, Clone, Copy)]
pub struct ViolationNormalizer<'a> {
    resolver: &'a PathResolver,
}

impl<'a> ViolationNormalizer<'a> {
    pub fn new(resolver: &'a PathResolver) -> Self {
        Self { resolver }
    }

    pub fn normalize(
        &self,
        repository_key: &str,
        record: RawRecord,
    ) -> Result<Violation, IngestError> {
        match record {
            RawRecord::Diagnostic(diagnostic) => self.normalize_diagnostic(repository_key, diagnostic),
            RawRecord::Error(error) => self.normalize_error(repository_key, error),
            RawRecord::Memory(error) => self.normalize_memory_error(repository_key, error),
        }
    }

    pub fn normalize_diagnostic(
        &self,
        repository_key: &str,
        diagnostic: RawDiagnostic,
    ) -> Result<Violation, IngestError> {
        let file_path = self.resolver.canonicalize(&diagnostic.file_path)?;
        Ok(Violation {
            rule_repository_key: repository_key.to_string(),
            file_path,
            line: diagnostic.line,
            rule_id: diagnostic.checker_name,
            message: diagnostic.description,
            flow_steps: multi_step_flow(diagnostic.flow_steps),
        })
    }

    pub fn normalize_error(
        &self,
        repository_key: &str,
        error: RawError,
    ) -> Result<Violation, IngestError> {
        let file_path = self.resolver.canonicalize(&error.file)?;
        Ok(Violation {
            rule_repository_key: repository_key.to_string(),
            file_path,
            line: error.line,
            rule_id: error.rule_id,
            message: error.message,
            flow_steps: None,
        })
    }

    pub fn normalize_memory_error(
        &self,
        repository_key: &str,
        error: MemoryError,
    ) -> Result<Violation, IngestError> {
        let resolver = self.resolver;
        let located = select_own_frame_by(&error.frames, |path| resolver.contains(path))
            .and_then(|frame| Some((frame.path.as_deref()?, frame.line?)));
        let Some((path, line)) = located else {
            return Err(IngestError::Unlocatable {
                kind: error.kind.clone(),
                description: error.description(),
            });
        };

        let file_path = self.resolver.canonicalize(&path.to_string_lossy())?;
        let message = error.description();
        Ok(Violation {
            rule_repository_key: repository_key.to_string(),
            file_path,
            line,
            rule_id: error.kind,
            message,
            flow_steps: None,
        })
    }
}

/// A flow is only worth reporting when it has more than one step.
fn multi_step_flow(steps: Vec<FlowStep>) -> Option<Vec<FlowStep>> {
    if steps.len() > 1 {
        Some(steps)
    } else {
        None
    }
}
