//! app-access - endpoint diagnostics and SSH connection authorization
//!
//! Decides whether a caller may connect to an administrator-registered SSH
//! endpoint: layered reachability probes (DNS, TCP, SSH banner), a capability
//! gate, and a request router that hands back a connection descriptor.

pub mod access;
pub mod broker;
pub mod config;
pub mod endpoint;
pub mod probe;
pub mod router;
pub mod server;

pub use access::{authorize, Principal};
pub use broker::{ConnectDecision, ConnectionBroker, ConnectionDescriptor};
pub use config::{AppSettings, ConfigStore, FileConfigStore, MemoryConfigStore};
pub use endpoint::{Endpoint, EndpointRegistry};
pub use probe::{run_probe, NetworkProber, ProbeOutcome, ProbeResult, Prober};
pub use router::{Dispatcher, DispatcherConfig, RequestEnvelope, ResponseEnvelope, RouteError};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging. Output goes to stderr so stdout stays protocol-only.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
