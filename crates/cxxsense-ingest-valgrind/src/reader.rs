use crate::ValgrindError;
use cxxsense_core::{Frame, MemoryError};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::BufRead;
use std::path::PathBuf;

// Depth of each element of interest, counting the root as 0.
const ERROR_DEPTH: usize = 1;
const ERROR_CHILD_DEPTH: usize = 2;
const FRAME_DEPTH: usize = 3;

#[derive(Debug, Default)]
struct ErrorBuilder {
    kind: Option<String>,
    what: Option<String>,
    auxiliary: Vec<String>,
    stacks: usize,
    frames: Vec<Frame>,
}

#[derive(Debug, Default)]
struct FrameBuilder {
    path: Option<String>,
    dir: Option<String>,
    file: Option<String>,
    line: Option<String>,
    function: Option<String>,
    object: Option<String>,
    ip: Option<String>,
}

impl FrameBuilder {
    fn build(self, index: usize) -> Result<Frame, ValgrindError> {
        let path = match (self.path, self.dir, self.file) {
            (Some(path), _, _) => Some(PathBuf::from(path)),
            (None, Some(dir), Some(file)) => Some(PathBuf::from(dir).join(file)),
            (None, None, Some(file)) => Some(PathBuf::from(file)),
            (None, _, None) => None,
        };
        let line = self
            .line
            .map(|value| {
                value
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| ValgrindError::InvalidLine { index, value })
            })
            .transpose()?;
        Ok(Frame {
            path,
            line,
            function: self.function,
            object: self.object,
            ip: self.ip,
        })
    }
}

pub(crate) struct ValgrindReader<R> {
    reader: Reader<R>,
    open: Vec<String>,
    saw_root: bool,
    current: Option<ErrorBuilder>,
    frame: Option<FrameBuilder>,
    /// Character data of the innermost open element, committed on its end tag.
    text: String,
    errors: Vec<MemoryError>,
}

impl<R: BufRead> ValgrindReader<R> {
    pub(crate) fn new(input: R) -> Self {
        let reader = Reader::from_reader(input);
        Self {
            reader,
            open: Vec::new(),
            saw_root: false,
            current: None,
            frame: None,
            text: String::new(),
            errors: Vec::new(),
        }
    }

    pub(crate) fn read_all(mut self) -> Result<Vec<MemoryError>, ValgrindError> {
        let mut buf = Vec::new();
        loop {
            let event = self
                .reader
                .read_event_into(&mut buf)
                .map_err(|source| ValgrindError::Xml {
                    position: self.reader.buffer_position(),
                    source,
                })?;
            match event {
                Event::Start(element) => {
                    let name = element_name(&element);
                    self.open_element(&element, &name)?;
                    self.open.push(name);
                    self.text.clear();
                }
                Event::Empty(element) => {
                    let name = element_name(&element);
                    self.open_element(&element, &name)?;
                    self.close_element(&name, self.open.len())?;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(|source| self.xml_error(source))?;
                    self.text.push_str(&text);
                }
                Event::CData(data) => {
                    self.text.push_str(&String::from_utf8_lossy(&data));
                }
                Event::End(_) => {
                    self.commit_text();
                    if let Some(name) = self.open.pop() {
                        self.close_element(&name, self.open.len())?;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !self.saw_root {
            return Err(ValgrindError::MissingRoot);
        }
        if !self.open.is_empty() {
            return Err(ValgrindError::UnexpectedEof);
        }
        Ok(self.errors)
    }

    fn xml_error(&self, source: quick_xml::Error) -> ValgrindError {
        ValgrindError::Xml {
            position: self.reader.buffer_position(),
            source,
        }
    }

    fn attribute(&self, element: &BytesStart<'_>, name: &str) -> Result<Option<String>, ValgrindError> {
        match element.try_get_attribute(name).map_err(|e| self.xml_error(e))? {
            Some(attr) => Ok(Some(
                attr.unescape_value()
                    .map_err(|e| self.xml_error(e))?
                    .into_owned(),
            )),
            None => Ok(None),
        }
    }

    fn open_element(&mut self, element: &BytesStart<'_>, name: &str) -> Result<(), ValgrindError> {
        let depth = self.open.len();
        match (depth, name) {
            (0, _) => self.saw_root = true,
            (ERROR_DEPTH, "error") => {
                self.current = Some(ErrorBuilder {
                    kind: self.attribute(element, "kind")?,
                    ..Default::default()
                });
            }
            (ERROR_CHILD_DEPTH, "stack") => {
                if let Some(current) = self.current.as_mut() {
                    current.stacks += 1;
                }
            }
            (FRAME_DEPTH, "frame") => {
                let primary = self.current.as_ref().is_some_and(|c| c.stacks == 1)
                    && self.open.get(ERROR_CHILD_DEPTH).is_some_and(|n| n == "stack");
                if primary {
                    self.frame = Some(FrameBuilder {
                        path: self.attribute(element, "path")?,
                        line: self.attribute(element, "line")?,
                        function: self.attribute(element, "fn")?,
                        ..Default::default()
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// `depth` is the depth of the element being closed.
    fn close_element(&mut self, name: &str, depth: usize) -> Result<(), ValgrindError> {
        match (depth, name) {
            (FRAME_DEPTH, "frame") => {
                if let (Some(frame), Some(current)) = (self.frame.take(), self.current.as_mut()) {
                    current.frames.push(frame.build(self.errors.len())?);
                }
            }
            (ERROR_DEPTH, "error") => {
                if let Some(current) = self.current.take() {
                    let index = self.errors.len();
                    let kind = current.kind.ok_or(ValgrindError::MissingKind { index })?;
                    self.errors.push(MemoryError {
                        kind,
                        what: current.what,
                        auxiliary: current.auxiliary,
                        frames: current.frames,
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Store the text of the element about to close, if it is a field we keep.
    fn commit_text(&mut self) {
        let text = std::mem::take(&mut self.text);
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let Some(current) = self.current.as_mut() else {
            return;
        };
        let names: Vec<&str> = self.open.iter().map(String::as_str).collect();
        let value = text.to_string();

        match names.as_slice() {
            [_, "error", "kind"] => current.kind = Some(value),
            [_, "error", "what"] => current.what = Some(value),
            [_, "error", "auxwhat"] => current.auxiliary.push(value),
            [_, "error", "xwhat", "text"] => current.what = Some(value),
            [_, "error", "xauxwhat", "text"] => current.auxiliary.push(value),
            [_, "error", "stack", "frame", field] => {
                let Some(frame) = self.frame.as_mut() else {
                    return;
                };
                match *field {
                    "ip" => frame.ip = Some(value),
                    "obj" => frame.object = Some(value),
                    "fn" => frame.function = Some(value),
                    "dir" => frame.dir = Some(value),
                    "file" => frame.file = Some(value),
                    "line" => frame.line = Some(value),
                    _ => {}
                }
            }
            _ => {}
        }
    }
}

fn element_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.name().as_ref()).into_owned()
}
