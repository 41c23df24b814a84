//! TCP stage

use std::time::Instant;

use tokio::net::TcpStream;
use tracing::debug;

use super::types::ProbeOutcome;
use super::with_timeout;

/// Open and immediately release a TCP connection to `(host, port)`
pub async fn tcp_probe(host: &str, port: u16, timeout_secs: u64) -> ProbeOutcome {
    let started = Instant::now();

    match with_timeout(timeout_secs, TcpStream::connect((host, port))).await {
        Ok(stream) => {
            drop(stream);
            ProbeOutcome::success("TCP connect ok", started)
        }
        Err(e) => {
            debug!("TCP {}:{} failed: {}", host, port, e);
            ProbeOutcome::failure(format!("TCP connect failed: {}", e), started)
        }
    }
}
