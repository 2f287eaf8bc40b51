//! Report formats and their dispatch to the format parsers.

use cxxsense_core::{
    IngestError, RawRecord, CLANGSA_REPOSITORY_KEY, OTHER_REPOSITORY_KEY, VALGRIND_REPOSITORY_KEY,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Clang Static Analyzer property lists.
    ClangSa,
    /// Generic `<error file line id msg>` XML.
    Other,
    /// Valgrind memcheck XML.
    Valgrind,
}

impl ReportFormat {
    pub const ALL: [ReportFormat; 3] = [ReportFormat::ClangSa, ReportFormat::Other, ReportFormat::Valgrind];

    /// Configuration key of the format.
    pub fn key(self) -> &'static str {
        match self {
            ReportFormat::ClangSa => "clangsa",
            ReportFormat::Other => "other",
            ReportFormat::Valgrind => "valgrind",
        }
    }

    /// Rule repository stamped on every violation of this format.
    pub fn repository_key(self) -> &'static str {
        match self {
            ReportFormat::ClangSa => CLANGSA_REPOSITORY_KEY,
            ReportFormat::Other => OTHER_REPOSITORY_KEY,
            ReportFormat::Valgrind => VALGRIND_REPOSITORY_KEY,
        }
    }

    /// Parse one report file into raw records. Any parser failure is
    /// reported as [`IngestError::MalformedReport`] for the whole file.
    pub fn parse(self, report: &Path) -> Result<Vec<RawRecord>, IngestError> {
        let malformed = |err: &dyn fmt::Display| IngestError::malformed(report, err);
        let records: Vec<RawRecord> = match self {
            ReportFormat::ClangSa => cxxsense_ingest_clangsa::parse_report(report)
                .map_err(|e| malformed(&e))?
                .into_iter()
                .map(RawRecord::from)
                .collect(),
            ReportFormat::Other => cxxsense_ingest_other::parse_report(report)
                .map_err(|e| malformed(&e))?
                .into_iter()
                .map(RawRecord::from)
                .collect(),
            ReportFormat::Valgrind => cxxsense_ingest_valgrind::parse_report(report)
                .map_err(|e| malformed(&e))?
                .into_iter()
                .map(RawRecord::from)
                .collect(),
        };
        Ok(records)
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clangsa" | "clang-sa" | "clang" => Ok(ReportFormat::ClangSa),
            "other" => Ok(ReportFormat::Other),
            "valgrind" | "memcheck" => Ok(ReportFormat::Valgrind),
            other => Err(format!(
                "unknown report format '{other}' (expected clangsa|other|valgrind)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_from_str() {
        for format in ReportFormat::ALL {
            assert_eq!(format.key().parse::<ReportFormat>().unwrap(), format);
        }
        assert_eq!("MemCheck".parse::<ReportFormat>().unwrap(), ReportFormat::Valgrind);
        assert!("cppcheck".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn repository_keys() {
        assert_eq!(ReportFormat::ClangSa.repository_key(), "ClangSA");
        assert_eq!(ReportFormat::Other.repository_key(), "other");
        assert_eq!(ReportFormat::Valgrind.repository_key(), "valgrind");
    }

    #[test]
    fn parser_failures_become_malformed_reports() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xml");
        std::fs::write(&path, "<results><error").unwrap();

        for format in ReportFormat::ALL {
            let err = format.parse(&path).unwrap_err();
            assert_eq!(err.kind(), "malformed_report", "{format}");
        }
    }
}
