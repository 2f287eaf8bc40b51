//! Generic "other tool" report ingestion.
//!
//! Any analyzer can be plugged in by converting its output (usually with an
//! XSLT stylesheet run beforehand) to this shape:
//!
//! ```xml
//! <results>
//!   <error file="src/a.cpp" line="5" id="E1" msg="leak"/>
//!   ...
//! </results>
//! ```
//!
//! The document is streamed with a pull parser; only `<error>` elements that
//! are direct children of the root are read. Other elements are ignored.

use cxxsense_core::RawError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const ERROR_ELEMENT: &[u8] = b"error";

#[derive(Debug, thiserror::Error)]
pub enum OtherReportError {
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

    #[error("<error> #{index} has no '{attribute}' attribute")]
    MissingAttribute {
        index: usize,
        attribute: &'static str,
    },

    #[error("<error> #{index} has a non-numeric line '{value}'")]
    InvalidLine { index: usize, value: String },
}

/// Read and parse a report file.
pub fn parse_report(path: &Path) -> Result<Vec<RawError>, OtherReportError> {
    let file = File::open(path)?;
    let errors = parse_reader(BufReader::new(file))?;
    tracing::debug!(report = %path.display(), errors = errors.len(), "parsed 'other' report");
    Ok(errors)
}

pub fn parse_str(xml: &str) -> Result<Vec<RawError>, OtherReportError> {
    parse_reader(xml.as_bytes())
}

/// Stream `<error>` records out of `input`, in document order.
pub fn parse_reader<R: BufRead>(input: R) -> Result<Vec<RawError>, OtherReportError> {
    let mut reader = Reader::from_reader(input);
    let mut buf = Vec::new();
    let mut errors = Vec::new();
    let mut depth = 0usize;
    let mut saw_root = false;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|source| OtherReportError::Xml {
                position: reader.buffer_position(),
                source,
            })?;
        match event {
            Event::Start(element) => {
                if depth == 0 {
                    saw_root = true;
                } else if depth == 1 && element.name().as_ref() == ERROR_ELEMENT {
                    errors.push(read_error(&element, errors.len())?);
                }
                depth += 1;
            }
            Event::Empty(element) => {
                if depth == 0 {
                    saw_root = true;
                } else if depth == 1 && element.name().as_ref() == ERROR_ELEMENT {
                    errors.push(read_error(&element, errors.len())?);
                }
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(OtherReportError::MissingRoot);
    }
    if depth != 0 {
        return Err(OtherReportError::UnexpectedEof);
    }
    Ok(errors)
}

fn read_error(element: &BytesStart<'_>, index: usize) -> Result<RawError, OtherReportError> {
    let required = |name: &'static str| -> Result<String, OtherReportError> {
        attribute(element, name)?.ok_or(OtherReportError::MissingAttribute {
            index,
            attribute: name,
        })
    };

    let file = required("file")?;
    let line_text = required("line")?;
    let rule_id = required("id")?;
    let message = attribute(element, "msg")?.unwrap_or_default();

    let line = line_text
        .trim()
        .parse::<u32>()
        .map_err(|_| OtherReportError::InvalidLine {
            index,
            value: line_text.clone(),
        })?;

    Ok(RawError {
        file,
        line,
        rule_id,
        message,
    })
}

fn attribute(element: &BytesStart<'_>, name: &str) -> Result<Option<String>, OtherReportError> {
    let xml_error = |source: quick_xml::Error| OtherReportError::Xml {
        position: 0,
        source,
    };
    match element.try_get_attribute(name).map_err(xml_error)? {
        Some(attr) => Ok(Some(attr.unescape_value().map_err(xml_error)?.into_owned())),
        None => Ok(None),
    }
}
