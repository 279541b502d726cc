//! Safe path resolution against the served root.
//!
//! # Responsibilities
//! - Canonicalize the served root once at startup
//! - Normalize user-supplied relative paths (collapse `.` and `..`)
//! - Reject any input that would resolve outside the root
//!
//! # Design Decisions
//! - Normalization is purely lexical: no filesystem access per request
//! - `..` that would climb above the root is an error, not silently clamped
//! - Everything downstream takes a [`ResolvedPath`], never a raw string

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Error type for path resolution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// The input would resolve outside the served root.
    #[error("path escapes the served root")]
    Escape,
    /// The input contains a component that cannot be served (e.g. NUL).
    #[error("malformed path")]
    Malformed,
}

/// The fixed directory beneath which all served content must reside.
///
/// Immutable for the process lifetime. Constructed once at startup from
/// the configured root, which must exist and be a directory.
#[derive(Debug, Clone)]
pub struct ServedRoot {
    root: PathBuf,
}

/// An absolute path guaranteed to be the served root or a descendant of it.
///
/// Only [`ServedRoot::resolve`] can construct one; handlers and the
/// filesystem components accept nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    inner: PathBuf,
}

impl ResolvedPath {
    pub fn as_path(&self) -> &Path {
        &self.inner
    }

    /// Final component of the path, used as the download filename.
    pub fn file_name(&self) -> Option<&str> {
        self.inner.file_name().and_then(|n| n.to_str())
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.inner
    }
}

impl ServedRoot {
    /// Canonicalize and validate the configured root directory.
    pub fn open(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = std::fs::canonicalize(root)?;
        let meta = std::fs::metadata(&root)?;
        if !meta.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotADirectory,
                "served root is not a directory",
            ));
        }
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Resolve a user-supplied relative path against the root.
    ///
    /// Empty input resolves to the root itself. Leading separators are
    /// ignored so `/a/b` behaves like `a/b`. Any `..` that would climb
    /// above the root fails with [`PathError::Escape`].
    pub fn resolve(&self, raw: &str) -> Result<ResolvedPath, PathError> {
        if raw.contains('\0') {
            return Err(PathError::Malformed);
        }

        let mut stack: Vec<&std::ffi::OsStr> = Vec::new();
        for component in Path::new(raw).components() {
            match component {
                Component::Normal(seg) => stack.push(seg),
                Component::CurDir => {}
                // Treat rooted input as relative to the served root.
                Component::RootDir | Component::Prefix(_) => stack.clear(),
                Component::ParentDir => {
                    if stack.pop().is_none() {
                        return Err(PathError::Escape);
                    }
                }
            }
        }

        let mut resolved = self.root.clone();
        for seg in stack {
            resolved.push(seg);
        }

        // Invariant check; the component walk above already guarantees it.
        if !resolved.starts_with(&self.root) {
            return Err(PathError::Escape);
        }
        Ok(ResolvedPath { inner: resolved })
    }
}
