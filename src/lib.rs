//! Public file-serving gateway library.

pub mod config;
pub mod fs;
pub mod http;
pub mod observability;
pub mod security;

pub use config::GatewayConfig;
pub use http::HttpServer;
