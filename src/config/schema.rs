//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! gateway. All types derive Serde traits for deserialization from config
//! files, and every field has a default so a minimal (or absent) config
//! still yields a runnable server.

use serde::{Deserialize, Serialize};

/// Root configuration for the file gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// What to serve and where to redirect the landing page.
    pub serve: ServeConfig,

    /// Sliding-window rate limiting and bandwidth throttling.
    pub rate_limit: RateLimitConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3069").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3069".to_string(),
        }
    }
}

/// Content-serving configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Root directory beneath which all served content must reside.
    /// Canonicalized at startup; must exist and be a directory.
    pub root: String,

    /// Where `GET /` sends visitors.
    pub redirect_url: String,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            root: "/srv/files".to_string(),
            redirect_url: "https://dl.kxtz.dev".to_string(),
        }
    }
}

/// Rate limiting and throttling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Trailing window over which requests are counted, in seconds.
    pub window_secs: u64,

    /// Downloads allowed per client per window before throttling.
    pub download_limit: u32,

    /// Raw views allowed per client per window before throttling.
    pub raw_limit: u32,

    /// Transfer rate applied to throttled streams, in bytes per second.
    pub throttle_bytes_per_sec: u64,

    /// How often idle client keys are swept from the tracker, in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: 300,
            download_limit: 5,
            raw_limit: 30,
            // 5 Mbit/s
            throttle_bytes_per_sec: 625_000,
            sweep_interval_secs: 300,
        }
    }
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default tracing filter, overridable via `RUST_LOG`.
    pub log_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "file_gateway=debug,tower_http=debug".to_string(),
        }
    }
}
