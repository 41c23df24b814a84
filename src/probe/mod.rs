//! Probe Pipeline
//!
//! Layered reachability diagnostics for a single `(host, port)`:
//! 1. DNS - the host resolves to at least one address
//! 2. TCP - a connection can be opened
//! 3. SSH banner - the server volunteers an `SSH-` identification line
//!
//! All three stages always run and are always reported. Network failures
//! become `ok = false` outcomes; nothing here returns an error. Every socket
//! is owned by the stage that opened it and is released when the stage
//! returns or its future is dropped.

mod banner;
mod dns;
mod error;
mod tcp;
mod types;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use tracing::debug;

pub use banner::{banner_probe, classify_banner, BANNER_DETAIL_CHARS, BANNER_READ_LIMIT};
pub use dns::dns_probe;
pub use error::StageError;
pub use tcp::tcp_probe;
pub use types::{adhoc_endpoint_id, ProbeOutcome, ProbeResult, StageProbes};

/// Bound an I/O future by `timeout_secs`
pub(crate) async fn with_timeout<T, F>(timeout_secs: u64, fut: F) -> Result<T, StageError>
where
    F: Future<Output = std::io::Result<T>>,
{
    tokio::time::timeout(Duration::from_secs(timeout_secs), fut)
        .await
        .map_err(|_| StageError::Timeout(timeout_secs))?
        .map_err(StageError::from)
}

/// Run all three stages against `(host, port)`
///
/// Stages are independent and run concurrently; each measures its own
/// elapsed time from its own start.
pub async fn run_probe(host: &str, port: u16, timeout_secs: u64) -> ProbeResult {
    debug!("Probing {}:{} (timeout {}s)", host, port, timeout_secs);

    let (dns, tcp, ssh_banner) = tokio::join!(
        dns_probe(host, timeout_secs),
        tcp_probe(host, port, timeout_secs),
        banner_probe(host, port, timeout_secs),
    );

    ProbeResult {
        endpoint_id: adhoc_endpoint_id(host, port),
        host: host.to_string(),
        port,
        probes: StageProbes {
            dns,
            tcp,
            ssh_banner,
        },
    }
}

/// Something that can diagnose a `(host, port)`
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, host: &str, port: u16, timeout_secs: u64) -> ProbeResult;
}

/// Prober backed by real network I/O
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkProber;

#[async_trait]
impl Prober for NetworkProber {
    async fn probe(&self, host: &str, port: u16, timeout_secs: u64) -> ProbeResult {
        run_probe(host, port, timeout_secs).await
    }
}

/// Probe several targets with at most `max_concurrent` in flight
///
/// Results come back in input order, each keyed by the target's id.
pub async fn probe_all(
    prober: &dyn Prober,
    targets: Vec<(String, String, u16)>,
    timeout_secs: u64,
    max_concurrent: usize,
) -> Vec<ProbeResult> {
    stream::iter(targets)
        .map(|(id, host, port)| async move {
            prober
                .probe(&host, port, timeout_secs)
                .await
                .with_endpoint_id(id)
        })
        .buffered(max_concurrent.max(1))
        .collect()
        .await
}
