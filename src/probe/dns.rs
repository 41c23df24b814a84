//! DNS stage

use std::time::Instant;

use tokio::net::lookup_host;
use tracing::debug;

use super::error::StageError;
use super::types::ProbeOutcome;
use super::with_timeout;

/// Resolve `host` to at least one address within the timeout
pub async fn dns_probe(host: &str, timeout_secs: u64) -> ProbeOutcome {
    let started = Instant::now();

    match resolve(host, timeout_secs).await {
        Ok(count) => {
            debug!("DNS {} resolved to {} address(es)", host, count);
            ProbeOutcome::success("DNS resolve ok", started)
        }
        Err(e) => {
            debug!("DNS {} failed: {}", host, e);
            ProbeOutcome::failure(format!("DNS resolve failed: {}", e), started)
        }
    }
}

async fn resolve(host: &str, timeout_secs: u64) -> Result<usize, StageError> {
    let addrs = with_timeout(timeout_secs, lookup_host((host, 0))).await?;
    match addrs.count() {
        0 => Err(StageError::NoAddresses),
        n => Ok(n),
    }
}
