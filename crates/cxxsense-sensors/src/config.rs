//! `cxxsense.toml` configuration.
//!
//! ```toml
//! base_dir = "."
//! error_recovery = true
//! dedup = "file-line-rule"        # or "file-line-rule-message"
//! threads = 4
//!
//! [reports]
//! clangsa = ["build/analyzer/**/*.plist"]
//! other = ["reports/rats.xml"]
//! valgrind = ["reports/memcheck-*.xml"]
//! ```
//!
//! A relative `base_dir` is taken relative to the configuration file.

use crate::discovery::{discover, ReportJob};
use crate::format::ReportFormat;
use anyhow::{Context, Result};
use cxxsense_core::DedupPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "cxxsense.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SensorConfig {
    pub base_dir: PathBuf,
    /// Skip malformed reports instead of failing the run.
    pub error_recovery: bool,
    pub dedup: DedupPolicy,
    /// Worker threads; `None` uses rayon's default.
    pub threads: Option<usize>,
    pub reports: ReportPaths,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            error_recovery: true,
            dedup: DedupPolicy::default(),
            threads: None,
            reports: ReportPaths::default(),
        }
    }
}

/// Report path patterns per format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportPaths {
    pub clangsa: Vec<String>,
    pub other: Vec<String>,
    pub valgrind: Vec<String>,
}

impl ReportPaths {
    pub fn patterns(&self, format: ReportFormat) -> &[String] {
        match format {
            ReportFormat::ClangSa => &self.clangsa,
            ReportFormat::Other => &self.other,
            ReportFormat::Valgrind => &self.valgrind,
        }
    }

    pub fn patterns_mut(&mut self, format: ReportFormat) -> &mut Vec<String> {
        match format {
            ReportFormat::ClangSa => &mut self.clangsa,
            ReportFormat::Other => &mut self.other,
            ReportFormat::Valgrind => &mut self.valgrind,
        }
    }

    pub fn is_empty(&self) -> bool {
        ReportFormat::ALL
            .iter()
            .all(|format| self.patterns(*format).is_empty())
    }
}

impl SensorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid cxxsense configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config = Self::from_toml_str(&text)
            .with_context(|| format!("in {}", path.display()))?;
        if config.base_dir.is_relative() {
            let parent = path.parent().unwrap_or_else(|| Path::new("."));
            config.base_dir = parent.join(&config.base_dir);
        }
        Ok(config)
    }

    /// All report jobs, format by format in [`ReportFormat::ALL`] order.
    pub fn jobs(&self, base_dir: &Path) -> Vec<ReportJob> {
        ReportFormat::ALL
            .iter()
            .flat_map(|format| discover(*format, base_dir, self.reports.patterns(*format)))
            .collect()
    }
}
