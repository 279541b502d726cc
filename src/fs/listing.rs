//! Directory listing with per-entry metadata.
//!
//! # Responsibilities
//! - Enumerate visible (non-hidden) entries of a resolved directory
//! - Attach human-readable size and modified-time labels
//! - Aggregate recursive byte sizes for directories
//!
//! # Design Decisions
//! - Hidden entries (leading `.`) never appear, not even in the
//!   empty-directory determination
//! - A metadata failure drops that one entry; the listing survives
//! - Directory sizes come from a native async walk, not a spawned `du`

use std::io;
use std::path::PathBuf;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use serde::Serialize;
use thiserror::Error;

use crate::fs::resolve::ResolvedPath;

/// Error type for directory enumeration.
#[derive(Debug, Error)]
pub enum ListError {
    /// The directory exists but has no visible entries.
    #[error("empty directory")]
    Empty,
    /// The directory could not be enumerated at all.
    #[error("failed to read directory")]
    Read(#[from] io::Error),
}

/// Whether a listing entry is a directory or a regular file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Folder,
    File,
}

/// One row of a directory listing, ready for JSON serialization.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub size: String,
    pub modified: String,
}

/// Enumerate the visible entries of `dir`, sorted folders-first then by
/// name (case-sensitive) within each group.
pub async fn list(dir: &ResolvedPath) -> Result<Vec<DirectoryEntry>, ListError> {
    let mut reader = tokio::fs::read_dir(dir.as_path()).await?;
    let mut entries = Vec::new();

    while let Some(entry) = reader.next_entry().await? {
        let name = match entry.file_name().into_string() {
            Ok(n) => n,
            Err(_) => continue, // not valid UTF-8, cannot be addressed by query
        };
        if name.starts_with('.') {
            continue;
        }

        match describe(&entry, name).await {
            Ok(row) => entries.push(row),
            Err(e) => {
                tracing::warn!(
                    entry = %entry.path().display(),
                    error = %e,
                    "Skipping entry with unreadable metadata"
                );
            }
        }
    }

    if entries.is_empty() {
        return Err(ListError::Empty);
    }

    entries.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.name.cmp(&b.name)));
    Ok(entries)
}

/// Build the listing row for a single entry.
async fn describe(entry: &tokio::fs::DirEntry, name: String) -> io::Result<DirectoryEntry> {
    let meta = entry.metadata().await?;
    let kind = if meta.is_dir() {
        EntryKind::Folder
    } else {
        EntryKind::File
    };
    let bytes = match kind {
        EntryKind::Folder => dir_size(entry.path()).await?,
        EntryKind::File => meta.len(),
    };
    Ok(DirectoryEntry {
        name,
        kind,
        size: format_size(bytes),
        modified: format_mtime(meta.modified()?),
    })
}

/// Recursive byte size of a directory tree. Symlinks are counted by their
/// own length rather than followed, so a link cycle cannot hang the walk.
async fn dir_size(root: PathBuf) -> io::Result<u64> {
    let mut total = 0u64;
    let mut pending = vec![root];

    while let Some(dir) = pending.pop() {
        let mut reader = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = reader.next_entry().await? {
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                pending.push(entry.path());
            } else {
                total = total.saturating_add(entry.metadata().await?.len());
            }
        }
    }
    Ok(total)
}

/// Render a byte count with the largest unit keeping the magnitude below
/// 1024. Bytes print as an integer, larger units with two decimals.
pub fn format_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KIB {
        format!("{bytes} B")
    } else if b < KIB * KIB {
        format!("{:.2} KB", b / KIB)
    } else if b < KIB * KIB * KIB {
        format!("{:.2} MB", b / (KIB * KIB))
    } else {
        format!("{:.2} GB", b / (KIB * KIB * KIB))
    }
}

/// Fixed-format local-time label for a modification timestamp.
fn format_mtime(mtime: SystemTime) -> String {
    DateTime::<Local>::from(mtime)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
