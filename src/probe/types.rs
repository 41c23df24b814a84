//! Probe result types

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Outcome of a single diagnostic stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeOutcome {
    pub ok: bool,
    pub detail: String,
    pub elapsed_ms: u64,
}

impl ProbeOutcome {
    pub fn success(detail: impl Into<String>, started: Instant) -> Self {
        Self {
            ok: true,
            detail: detail.into(),
            elapsed_ms: elapsed_ms(started),
        }
    }

    pub fn failure(detail: impl Into<String>, started: Instant) -> Self {
        Self {
            ok: false,
            detail: detail.into(),
            elapsed_ms: elapsed_ms(started),
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// The three stages, always all present
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageProbes {
    pub dns: ProbeOutcome,
    pub tcp: ProbeOutcome,
    pub ssh_banner: ProbeOutcome,
}

/// Full diagnostic picture for one (host, port)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    pub endpoint_id: String,
    pub host: String,
    pub port: u16,
    pub probes: StageProbes,
}

impl ProbeResult {
    /// Whether the stages that gate a connection both passed.
    /// DNS is diagnostic only.
    pub fn connect_ready(&self) -> bool {
        self.probes.tcp.ok && self.probes.ssh_banner.ok
    }

    /// Re-key the result to a registry endpoint id
    pub fn with_endpoint_id(mut self, endpoint_id: impl Into<String>) -> Self {
        self.endpoint_id = endpoint_id.into();
        self
    }
}

/// Default id for ad-hoc probes
pub fn adhoc_endpoint_id(host: &str, port: u16) -> String {
    format!("{}:{}", host, port)
}
