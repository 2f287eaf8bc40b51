//! Valgrind memcheck report ingestion (`valgrind --xml=yes --xml-file=...`).
//!
//! ```text
//! <valgrindoutput>
//!   <error>
//!     <kind>Leak_DefinitelyLost</kind>
//!     <xwhat><text>8 bytes in 1 blocks are definitely lost ...</text></xwhat>
//!     <stack>
//!       <frame><ip/><obj/><fn/><dir/><file/><line/></frame>   innermost first
//!       ...
//!     </stack>
//!     <auxwhat>...</auxwhat>
//!     <stack>...</stack>                                       auxiliary stack
//!   </error>
//! </valgrindoutput>
//! ```
//!
//! The compact attribute form `<error kind=".."><stack><frame path=".."
//! line=".." fn=".."/></stack></error>` is accepted as well. Only the first
//! stack of an error is kept; it is the one the error is attributed to.
//!
//! Errors are returned unlocated. Attribution to a project file happens in
//! the normalizer (see `cxxsense_core::frame`).

mod reader;

use cxxsense_core::MemoryError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ValgrindError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error at byte {position}: {source}")]
    Xml {
        position: usize,
        #[source]
        source: quick_xml::Error,
    },

    #[error("document has no root element")]
    MissingRoot,

    #[error("document ends inside an open element")]
    UnexpectedEof,

    #[error("error #{index} has no kind")]
    MissingKind { index: usize },

    #[error("error #{index} has a frame with non-numeric line '{value}'")]
    InvalidLine { index: usize, value: String },
}

/// Read and parse a report file.
pub fn parse_report(path: &Path) -> Result<Vec<MemoryError>, ValgrindError> {
    let file = File::open(path)?;
    let errors = parse_reader(BufReader::new(file))?;
    tracing::debug!(report = %path.display(), errors = errors.len(), "parsed valgrind report");
    Ok(errors)
}

pub fn parse_str(xml: &str) -> Result<Vec<MemoryError>, ValgrindError> {
    parse_reader(xml.as_bytes())
}

pub fn parse_reader<R: BufRead>(input: R) -> Result<Vec<MemoryError>, ValgrindError> {
    reader::ValgrindReader::new(input).read_all()
}
