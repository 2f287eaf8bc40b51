use crate::{array, ClangSaError};
use plist::Dictionary;

/// The report's `files` array, built once per report. Locations refer to it
/// by index.
#[derive(Debug, Clone)]
pub struct SourceFiles<'a> {
    files: Vec<&'a str>,
}

impl<'a> SourceFiles<'a> {
    pub fn from_root(root: &'a Dictionary) -> Result<Self, ClangSaError> {
        let files = array(root, "files", "report root")?
            .iter()
            .enumerate()
            .map(|(index, file)| {
                file.as_string().ok_or_else(|| ClangSaError::Mistyped {
                    key: "files",
                    context: format!("files entry #{index}"),
                    expected: "string",
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { files })
    }

    /// Bounds-checked lookup of a `location.file` index.
    pub fn resolve(&self, index: u64, context: &str) -> Result<&'a str, ClangSaError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.files.get(i).copied())
            .ok_or_else(|| ClangSaError::FileIndexOutOfRange {
                index,
                len: self.files.len(),
                context: context.to_string(),
            })
    }
}
