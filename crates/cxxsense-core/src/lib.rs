//! cxxsense core: the canonical violation model and the stages every report
//! format shares.
//!
//! - `record`: raw per-format records produced by the parsers
//! - `path`: canonicalization against the analysis base directory
//! - `frame`: own-frame selection for memory-error stack traces
//! - `normalize`: raw record → [`Violation`]
//! - `sink`: deduplicating, thread-safe hand-off to the reporting side
//!
//! Parsers live in the `cxxsense-ingest-*` crates; orchestration lives in
//! `cxxsense-sensors`.

pub mod error;
pub mod frame;
pub mod normalize;
pub mod path;
pub mod record;
pub mod sink;
pub mod violation;

pub use error::IngestError;
pub use frame::{select_own_frame, select_own_frame_by};
pub use normalize::ViolationNormalizer;
pub use path::PathResolver;
pub use record::{FlowStep, Frame, MemoryError, RawDiagnostic, RawError, RawRecord};
pub use sink::{
    CollectingRecorder, DedupKey, DedupPolicy, DedupSink, SinkStats, ViolationRecorder,
};
pub use violation::{
    Violation, CLANGSA_REPOSITORY_KEY, OTHER_REPOSITORY_KEY, VALGRIND_REPOSITORY_KEY,
};
