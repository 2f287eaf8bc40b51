//! Path resolution against the analysis base directory.
//!
//! Report tools emit paths in every shape: absolute, `./file.cpp`, paths with
//! `..` segments, trailing whitespace. Everything is resolved against one base
//! directory before it reaches the sink.

use crate::error::IngestError;
use std::io;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone)]
pub struct PathResolver {
    /// Base directory as configured (absolute, lexically normalized).
    base_dir: PathBuf,
    /// Base directory with symlinks resolved.
    canonical_base: PathBuf,
}

impl PathResolver {
    /// Create a resolver rooted at `base_dir`, which must exist.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self, IngestError> {
        let given = base_dir.as_ref();
        let canonical_base = given
            .canonicalize()
            .map_err(|source| IngestError::PathResolution {
                path: given.to_path_buf(),
                source,
            })?;
        let base_dir = if given.is_absolute() {
            normalize_lexically(given)
        } else {
            canonical_base.clone()
        };
        Ok(Self {
            base_dir,
            canonical_base,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.canonical_base
    }

    /// Join a relative path onto the base directory; absolute paths pass
    /// through. Surrounding whitespace is ignored.
    pub fn absolutize(&self, raw: &str) -> PathBuf {
        let path = Path::new(raw.trim());
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.canonical_base.join(path)
        }
    }

    /// Resolve `raw` to a canonical path on disk.
    pub fn canonicalize(&self, raw: &str) -> Result<PathBuf, IngestError> {
        if raw.trim().is_empty() {
            return Err(IngestError::PathResolution {
                path: PathBuf::from(raw),
                source: io::Error::new(io::ErrorKind::InvalidInput, "empty path"),
            });
        }
        let candidate = self.absolutize(raw);
        candidate
            .canonicalize()
            .map_err(|source| IngestError::PathResolution {
                path: candidate,
                source,
            })
    }

    /// Whether `path` lies under the base directory. Existing paths are
    /// compared canonically (symlinks followed); paths that do not exist on
    /// this machine are compared lexically.
    pub fn contains(&self, path: &Path) -> bool {
        let candidate = if path.is_absolute() {
            comparable_path(path)
        } else {
            comparable_path(&self.canonical_base.join(path))
        };
        candidate.starts_with(&self.canonical_base) || candidate.starts_with(&self.base_dir)
    }
}

/// The canonical form of `path` if it exists, its lexical normal form
/// otherwise.
pub fn comparable_path(path: &Path) -> PathBuf {
    path.canonicalize()
        .unwrap_or_else(|_| normalize_lexically(path))
}

/// Remove `.` segments and fold `..` segments without touching the file
/// system. `..` above the root is dropped.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => continue,
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            Component::Normal(part) => out.push(part),
        }
    }
    out
}
