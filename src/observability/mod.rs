//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!
//! Consumers:
//!     → Log aggregation (stdout, journald, remote)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through all log lines of a request
//! - Filter configurable via config file and `RUST_LOG`

pub mod logging;
