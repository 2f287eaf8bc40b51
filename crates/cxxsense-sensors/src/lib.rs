//! Sensors: everything between "a list of configured report paths" and "a
//! deduplicated stream of violations".
//!
//! ```text
//!   SensorConfig ──► discover ──► [ReportJob] ──► run_analysis
//!                                                   │  rayon workers:
//!                                                   │    ReportFormat::parse
//!                                                   │    ViolationNormalizer
//!                                                   ▼
//!                                                DedupSink ──► ViolationRecorder
//! ```

pub mod config;
pub mod discovery;
pub mod format;
pub mod pipeline;

pub use config::{ReportPaths, SensorConfig, DEFAULT_CONFIG_FILE};
pub use discovery::{discover, resolve_report_paths, ReportJob};
pub use format::ReportFormat;
pub use pipeline::{
    process_report, run_analysis, AnalysisOptions, FailedReport, ReportOutcome, RunSummary,
};
