//! Filesystem subsystem.
//!
//! # Data Flow
//! ```text
//! Raw query path
//!     → resolve.rs (normalize, reject root escapes)
//!     → listing.rs (enumerate + metadata)  — for /api/v1/files
//!     → stream.rs  (paced byte stream)     — for /api/v1/download, /api/v1/raw
//! ```
//!
//! # Design Decisions
//! - resolve.rs is the single security boundary: nothing downstream
//!   accepts a raw path string
//! - All per-request I/O is async; nothing blocks the runtime

pub mod listing;
pub mod resolve;
pub mod stream;

pub use listing::{DirectoryEntry, EntryKind, ListError};
pub use resolve::{PathError, ResolvedPath, ServedRoot};
pub use stream::{Disposition, FileStream, StreamError};
