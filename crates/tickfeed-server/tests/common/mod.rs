//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tickfeed_core::AssetMode;
use tickfeed_server::config::ServerConfig;
use tickfeed_server::server::TickfeedServer;
use tokio::task::JoinHandle;

/// The repository's `static/` directory, the same tree the binary embeds.
pub fn repo_static_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("static")
}

/// Loopback config on an OS-assigned port.
pub fn test_config(asset_mode: AssetMode, static_dir: PathBuf) -> ServerConfig {
    ServerConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        static_dir,
        asset_mode,
    }
}

/// Boot a server in the background and return its address.
pub async fn boot_server(
    asset_mode: AssetMode,
) -> (SocketAddr, JoinHandle<Result<(), tickfeed_core::ServerError>>) {
    let server = TickfeedServer::new(test_config(asset_mode, repo_static_dir()));
    server.listen().await.expect("Failed to start test server")
}

/// Log sink for `tracing::subscriber::set_default`.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Wait until a log line containing `needle` shows up.
    pub async fn wait_for(&self, needle: &str, limit: Duration) -> bool {
        tokio::time::timeout(limit, async {
            while !self.contents().contains(needle) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .is_ok()
    }
}

/// Capture logs emitted on the current thread while the guard lives.
pub fn capture_logs() -> (LogCapture, tracing::subscriber::DefaultGuard) {
    let capture = LogCapture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    (capture, tracing::subscriber::set_default(subscriber))
}
