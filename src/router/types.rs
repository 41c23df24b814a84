//! Router types: operations, static configuration, errors and payloads

use serde::Serialize;
use serde_json::json;

use crate::access::Principal;
use crate::broker::ConnectionDescriptor;
use crate::config::StoreError;
use crate::endpoint::Endpoint;
use crate::probe::ProbeResult;

use super::response::ResponseEnvelope;

// ============================================================================
// Operations
// ============================================================================

/// Administrative operations, keyed by path suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Ping,
    Diagnostics,
    Capability,
    Endpoints,
    Probe,
    Connect,
}

impl Operation {
    /// Matching order for path suffixes
    pub const ALL: [Operation; 6] = [
        Operation::Ping,
        Operation::Diagnostics,
        Operation::Capability,
        Operation::Endpoints,
        Operation::Probe,
        Operation::Connect,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::Ping => "ping",
            Operation::Diagnostics => "diagnostics",
            Operation::Capability => "capability",
            Operation::Endpoints => "endpoints",
            Operation::Probe => "probe",
            Operation::Connect => "connect",
        }
    }

    pub fn suffix(self) -> String {
        format!("/{}", self.name())
    }

    /// First operation whose suffix ends the (normalized) path
    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| path.ends_with(&op.suffix()))
    }
}

// ============================================================================
// Static configuration
// ============================================================================

/// Default app name
pub const DEFAULT_APP: &str = "app_access";
/// Default bound on concurrent endpoint probes
pub const DEFAULT_MAX_CONCURRENT_PROBES: usize = 4;

/// Fixed configuration handed to the dispatcher at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    pub app: String,
    pub known_paths: Vec<String>,
    pub max_concurrent_probes: usize,
}

impl DispatcherConfig {
    pub fn new(app: impl Into<String>) -> Self {
        let app = app.into();
        Self {
            known_paths: known_paths_for(&app),
            app,
            max_concurrent_probes: DEFAULT_MAX_CONCURRENT_PROBES,
        }
    }

    pub fn with_max_concurrent_probes(mut self, max: usize) -> Self {
        self.max_concurrent_probes = max.max(1);
        self
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self::new(DEFAULT_APP)
    }
}

/// App-scoped paths first, then the global ones
fn known_paths_for(app: &str) -> Vec<String> {
    let scoped = Operation::ALL
        .iter()
        .map(|op| format!("/servicesNS/nobody/{}/app_api/{}", app, op.name()));
    let global = Operation::ALL
        .iter()
        .map(|op| format!("/services/app_api/{}", op.name()));
    scoped.chain(global).collect()
}

// ============================================================================
// Route Error
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("Missing session key")]
    AuthenticationRequired,

    #[error("{0}")]
    Validation(String),

    #[error("{reason}")]
    AuthorizationDenied { reason: String },

    #[error("Unknown path {0}")]
    UnknownOperation(String),

    #[error("{reason}")]
    ConnectionGateFailed {
        reason: String,
        probe: Box<ProbeResult>,
    },

    #[error("{0}")]
    Internal(String),
}

impl RouteError {
    pub fn status_code(&self) -> u16 {
        match self {
            RouteError::AuthenticationRequired => 401,
            RouteError::Validation(_) => 400,
            RouteError::AuthorizationDenied { .. } => 403,
            RouteError::UnknownOperation(_) => 404,
            RouteError::ConnectionGateFailed { .. } => 409,
            RouteError::Internal(_) => 500,
        }
    }

    pub fn into_response(self) -> ResponseEnvelope {
        let status = self.status_code();
        match self {
            RouteError::AuthorizationDenied { reason } => {
                ResponseEnvelope::from_payload(status, &ConnectBody::denied(reason, None))
            }
            RouteError::ConnectionGateFailed { reason, probe } => {
                ResponseEnvelope::from_payload(status, &ConnectBody::denied(reason, Some(*probe)))
            }
            other => ResponseEnvelope::from_value(status, json!({ "error": other.to_string() })),
        }
    }
}

impl From<StoreError> for RouteError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidSession => RouteError::AuthenticationRequired,
            other => RouteError::Internal(other.to_string()),
        }
    }
}

// ============================================================================
// Response payloads
// ============================================================================

#[derive(Debug, Serialize)]
pub struct PingBody<'a> {
    pub ok: bool,
    pub path: &'a str,
    pub method: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsBody<'a> {
    pub ok: bool,
    pub component: &'static str,
    pub app: &'a str,
    pub path: &'a str,
    pub method: &'a str,
    pub required_capability: &'a str,
    pub has_access: bool,
    pub probe_timeout_seconds: u64,
    pub launch_url_configured: bool,
    pub known_app_api_paths: &'a [String],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityBody<'a> {
    pub ok: bool,
    pub user: &'a str,
    pub required_capability: &'a str,
    pub has_access: bool,
    pub capabilities: &'a [String],
}

impl<'a> CapabilityBody<'a> {
    pub fn new(principal: &'a Principal, required_capability: &'a str, has_access: bool) -> Self {
        Self {
            ok: true,
            user: &principal.username,
            required_capability,
            has_access,
            capabilities: &principal.capabilities,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EndpointsBody {
    pub ok: bool,
    pub endpoints: Vec<Endpoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probes: Option<Vec<ProbeResult>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectBody {
    pub ok: bool,
    pub can_connect: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection: Option<ConnectionDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe: Option<ProbeResult>,
}

impl ConnectBody {
    pub fn granted(connection: ConnectionDescriptor, probe: ProbeResult) -> Self {
        Self {
            ok: true,
            can_connect: true,
            reason: None,
            connection: Some(connection),
            probe: Some(probe),
        }
    }

    pub fn denied(reason: String, probe: Option<ProbeResult>) -> Self {
        Self {
            ok: false,
            can_connect: false,
            reason: Some(reason),
            connection: None,
            probe,
        }
    }
}
