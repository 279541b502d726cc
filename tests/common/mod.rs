//! Shared utilities for end-to-end tests.

use std::net::SocketAddr;
use std::path::Path;

use file_gateway::config::GatewayConfig;
use file_gateway::http::HttpServer;
use tokio::net::TcpListener;

/// Build a small fixture tree:
///
/// ```text
/// root/
///   a/
///     inner.txt   (100 bytes)
///   b.txt         (5 bytes: "hello")
///   .hidden       (never listed)
/// ```
pub fn build_fixture_tree(root: &Path) {
    std::fs::create_dir(root.join("a")).unwrap();
    std::fs::write(root.join("a").join("inner.txt"), vec![b'x'; 100]).unwrap();
    std::fs::write(root.join("b.txt"), b"hello").unwrap();
    std::fs::write(root.join(".hidden"), b"shh").unwrap();
}

/// Default config pointed at `root`; tests bind the listener themselves
/// so each run gets an ephemeral port.
pub fn test_config(root: &Path) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.serve.root = root.display().to_string();
    config
}

/// Spawn the gateway on an ephemeral port and return its address.
pub async fn spawn_gateway(config: GatewayConfig) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();
    tokio::spawn(async move {
        server.run(listener).await.unwrap();
    });
    addr
}

pub fn url(addr: SocketAddr, path_and_query: &str) -> String {
    format!("http://{addr}{path_and_query}")
}
