//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming download/raw request:
//!     → rate_limit.rs (record event, check per-client window)
//!     → over the limit? stream is paced, never refused
//! ```
//!
//! # Design Decisions
//! - Throttle, don't reject: abusive clients get slowed, not cut off
//! - Fail open: a tracker defect must never block legitimate serving
//! - No trust in client input; path safety lives in `fs::resolve`

pub mod rate_limit;

pub use rate_limit::{RateTracker, Route};
