//! Deduplicating violation sink.
//!
//! ```text
//!   report A ──┐
//!   report B ──┼──► DedupSink::submit ──► seen-key set ──► ViolationRecorder
//!   report C ──┘         (mutex)            (per run)
//! ```
//!
//! The sink owns the per-run set of dedup keys. A key is checked and inserted
//! under one lock, so two workers can never both forward the same violation.

use crate::violation::Violation;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================================
// Dedup keys
// ============================================================================

/// Which fields make two violations "the same".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DedupPolicy {
    /// `(file, line, rule)`.
    #[default]
    FileLineRule,
    /// `(file, line, rule, message)`.
    FileLineRuleMessage,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub file_path: PathBuf,
    pub line: u32,
    pub rule_id: String,
    pub message: Option<String>,
}

impl DedupKey {
    pub fn of(violation: &Violation, policy: DedupPolicy) -> Self {
        DedupKey {
            file_path: violation.file_path.clone(),
            line: violation.line,
            rule_id: violation.rule_id.clone(),
            message: match policy {
                DedupPolicy::FileLineRule => None,
                DedupPolicy::FileLineRuleMessage => Some(violation.message.clone()),
            },
        }
    }
}

// ============================================================================
// Recorder contract
// ============================================================================

/// The external reporting collaborator.
pub trait ViolationRecorder: Send + Sync {
    fn record_violation(&self, violation: &Violation);
}

/// Recorder that keeps every forwarded violation in memory.
#[derive(Debug, Default)]
pub struct CollectingRecorder {
    violations: Mutex<Vec<Violation>>,
}

impl CollectingRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.violations.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.lock().is_empty()
    }

    pub fn snapshot(&self) -> Vec<Violation> {
        self.violations.lock().clone()
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations.into_inner()
    }
}

impl ViolationRecorder for CollectingRecorder {
    fn record_violation(&self, violation: &Violation) {
        self.violations.lock().push(violation.clone());
    }
}

impl<R: ViolationRecorder + ?Sized> ViolationRecorder for &R {
    fn record_violation(&self, violation: &Violation) {
        (**self).record_violation(violation)
    }
}

// ============================================================================
// Sink
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SinkStats {
    pub submitted: usize,
    pub forwarded: usize,
    pub suppressed: usize,
}

pub struct DedupSink<R> {
    recorder: R,
    policy: DedupPolicy,
    seen: Mutex<HashSet<DedupKey>>,
    submitted: AtomicUsize,
    suppressed: AtomicUsize,
}

impl<R: ViolationRecorder> DedupSink<R> {
    pub fn new(recorder: R) -> Self {
        Self::with_policy(recorder, DedupPolicy::default())
    }

    pub fn with_policy(recorder: R, policy: DedupPolicy) -> Self {
        Self {
            recorder,
            policy,
            seen: Mutex::new(HashSet::new()),
            submitted: AtomicUsize::new(0),
            suppressed: AtomicUsize::new(0),
        }
    }

    /// Forward `violation` unless an equal key was already submitted during
    /// this run. Duplicates are discarded silently.
    pub fn submit(&self, violation: Violation) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
        let key = DedupKey::of(&violation, self.policy);

        let mut seen = self.seen.lock();
        if !seen.insert(key) {
            drop(seen);
            self.suppressed.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(
                file = %violation.file_path.display(),
                line = violation.line,
                rule = %violation.rule_id,
                "duplicate violation suppressed"
            );
            return;
        }
        // Forwarding under the lock keeps recorder order equal to key
        // insertion order.
        self.recorder.record_violation(&violation);
    }

    pub fn stats(&self) -> SinkStats {
        let submitted = self.submitted.load(Ordering::Relaxed);
        let suppressed = self.suppressed.load(Ordering::Relaxed);
        SinkStats {
            submitted,
            forwarded: self.seen.lock().len(),
            suppressed,
        }
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    pub fn into_recorder(self) -> R {
        self.recorder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violation(file: &str, line: u32, rule: &str, message: &str) -> Violation {
        Violation {
            rule_repository_key: "other".to_string(),
            file_path: PathBuf::from(file),
            line,
            rule_id: rule.to_string(),
            message: message.to_string(),
            flow_steps: None,
        }
    }

    #[test]
    fn identical_keys_are_forwarded_once() {
        let sink = DedupSink::new(CollectingRecorder::new());
        sink.submit(violation("/p/a.cpp", 1, "E1", "first"));
        sink.submit(violation("/p/a.cpp", 1, "E1", "second"));

        let forwarded = sink.recorder().snapshot();
        assert_eq!(forwarded.len(), 1);
        assert_eq!(forwarded[0].message, "first");
        assert_eq!(
            sink.stats(),
            SinkStats {
                submitted: 2,
                forwarded: 1,
                suppressed: 1
            }
        );
    }

    #[test]
    fn different_line_or_rule_is_not_a_duplicate() {
        let sink = DedupSink::new(CollectingRecorder::new());
        sink.submit(violation("/p/a.cpp", 1, "E1", "m"));
        sink.submit(violation("/p/a.cpp", 2, "E1", "m"));
        sink.submit(violation("/p/a.cpp", 1, "E2", "m"));
        sink.submit(violation("/p/b.cpp", 1, "E1", "m"));
        assert_eq!(sink.recorder().len(), 4);
    }

    #[test]
    fn message_policy_keeps_distinct_messages() {
        let sink = DedupSink::with_policy(
            CollectingRecorder::new(),
            DedupPolicy::FileLineRuleMessage,
        );
        sink.submit(violation("/p/a.cpp", 1, "E1", "first"));
        sink.submit(violation("/p/a.cpp", 1, "E1", "second"));
        sink.submit(violation("/p/a.cpp", 1, "E1", "second"));
        assert_eq!(sink.recorder().len(), 2);
    }

    #[test]
    fn concurrent_submissions_forward_each_key_once() {
        let sink = DedupSink::new(CollectingRecorder::new());
        std::thread::scope(|scope| {
            for worker in 0..8 {
                let sink = &sink;
                scope.spawn(move || {
                    for line in 0..200 {
                        sink.submit(violation("/p/a.cpp", line, "E1", &format!("w{worker}")));
                    }
                });
            }
        });
        assert_eq!(sink.recorder().len(), 200);
        assert_eq!(sink.stats().suppressed, 7 * 200);
    }
}
