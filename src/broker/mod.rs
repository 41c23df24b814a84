//! Connection Broker
//!
//! Turns an authorization outcome and a fresh probe into a connect/deny
//! decision. Authorization is checked first so an unauthorized caller never
//! triggers network probing.

mod types;

use std::sync::Arc;

use tracing::{info, warn};

pub use types::{
    ConnectDecision, ConnectionDescriptor, ConnectionType, LaunchHint, LaunchKind,
    LAUNCH_TEMPLATE_NOTE,
};

use crate::access::{denial_reason, Principal};
use crate::config::AppSettings;
use crate::probe::Prober;

/// Reason returned when the connection gate stages did not both pass
pub const PROBE_FAILED_REASON: &str =
    "Probe failed. TCP and SSH banner checks must pass before connect.";

pub struct ConnectionBroker {
    prober: Arc<dyn Prober>,
}

impl ConnectionBroker {
    pub fn new(prober: Arc<dyn Prober>) -> Self {
        Self { prober }
    }

    pub async fn connect(
        &self,
        host: &str,
        port: u16,
        principal: &Principal,
        settings: &AppSettings,
        authorized: bool,
    ) -> ConnectDecision {
        if !authorized {
            warn!(
                "Connect to {}:{} denied for '{}': missing capability {}",
                host, port, principal.username, settings.required_capability
            );
            return ConnectDecision::Unauthorized {
                reason: denial_reason(&settings.required_capability),
            };
        }

        let probe = self
            .prober
            .probe(host, port, settings.probe_timeout_seconds)
            .await;

        if !probe.connect_ready() {
            warn!("Connect to {}:{} refused: probe failed", host, port);
            return ConnectDecision::ProbeFailed {
                reason: PROBE_FAILED_REASON.to_string(),
                probe,
            };
        }

        info!("Connect to {}:{} granted for '{}'", host, port, principal.username);
        ConnectDecision::Granted {
            connection: build_descriptor(host, port, principal, settings),
            probe,
        }
    }
}

fn build_descriptor(
    host: &str,
    port: u16,
    principal: &Principal,
    settings: &AppSettings,
) -> ConnectionDescriptor {
    ConnectionDescriptor {
        connection_type: ConnectionType::Ssh,
        host: host.to_string(),
        port,
        user: principal.username.clone(),
        ssh_uri: format!("ssh://{}@{}:{}", principal.uri_user(), host, port),
        launch: LaunchHint::from_template(
            &settings.launch_url_template,
            host,
            port,
            &principal.username,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{adhoc_endpoint_id, ProbeOutcome, ProbeResult, StageProbes};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns fixed tcp/banner outcomes and counts calls
    struct FixedProber {
        tcp_ok: bool,
        banner_ok: bool,
        calls: AtomicUsize,
    }

    impl FixedProber {
        fn new(tcp_ok: bool, banner_ok: bool) -> Arc<Self> {
            Arc::new(Self {
                tcp_ok,
                banner_ok,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Prober for FixedProber {
        async fn probe(&self, host: &str, port: u16, _timeout_secs: u64) -> ProbeResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let outcome = |ok: bool| ProbeOutcome {
                ok,
                detail: "fixed".to_string(),
                elapsed_ms: 1,
            };
            ProbeResult {
                endpoint_id: adhoc_endpoint_id(host, port),
                host: host.to_string(),
                port,
                probes: StageProbes {
                    dns: outcome(false),
                    tcp: outcome(self.tcp_ok),
                    ssh_banner: outcome(self.banner_ok),
                },
            }
        }
    }

    fn alice() -> Principal {
        Principal::new("alice", ["admin_connect"])
    }

    #[tokio::test]
    async fn test_unauthorized_skips_probe() {
        let prober = FixedProber::new(true, true);
        let broker = ConnectionBroker::new(prober.clone());
        let settings = AppSettings {
            required_capability: "admin_connect".to_string(),
            ..Default::default()
        };

        let decision = broker
            .connect("10.0.0.5", 22, &Principal::default(), &settings, false)
            .await;

        assert_eq!(
            decision,
            ConnectDecision::Unauthorized {
                reason: "Missing capability admin_connect".to_string()
            }
        );
        assert_eq!(prober.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_granted_without_template() {
        let broker = ConnectionBroker::new(FixedProber::new(true, true));
        let decision = broker
            .connect("10.0.0.5", 22, &alice(), &AppSettings::default(), true)
            .await;

        // DNS failed in the fixture; it does not gate the connection
        let ConnectDecision::Granted { connection, probe } = decision else {
            panic!("expected grant");
        };
        assert!(!probe.probes.dns.ok);
        assert_eq!(connection.ssh_uri, "ssh://alice@10.0.0.5:22");
        assert_eq!(connection.user, "alice");
        assert_eq!(connection.launch.kind, LaunchKind::ExternalSshClient);
        assert!(!connection.launch.note.is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_user_placeholder() {
        let broker = ConnectionBroker::new(FixedProber::new(true, true));
        let settings = AppSettings {
            launch_url_template: "https://t/{user}@{host}:{port}".to_string(),
            ..Default::default()
        };
        let decision = broker
            .connect("h", 2222, &Principal::default(), &settings, true)
            .await;

        let ConnectDecision::Granted { connection, .. } = decision else {
            panic!("expected grant");
        };
        assert_eq!(connection.ssh_uri, "ssh://user@h:2222");
        assert_eq!(connection.user, "");
        assert_eq!(connection.launch.url.as_deref(), Some("https://t/@h:2222"));
    }

    #[tokio::test]
    async fn test_no_descriptor_unless_tcp_and_banner_pass() {
        for (tcp_ok, banner_ok) in [(false, false), (true, false), (false, true)] {
            let broker = ConnectionBroker::new(FixedProber::new(tcp_ok, banner_ok));
            let decision = broker
                .connect("h", 22, &alice(), &AppSettings::default(), true)
                .await;

            match decision {
                ConnectDecision::ProbeFailed { reason, probe } => {
                    assert_eq!(reason, PROBE_FAILED_REASON);
                    assert_eq!(probe.probes.tcp.ok, tcp_ok);
                }
                other => panic!("unexpected decision {:?}", other),
            }
        }
    }
}
