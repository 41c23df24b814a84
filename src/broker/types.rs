//! Connection descriptor types

use serde::Serialize;

use crate::probe::ProbeResult;

/// Note shown when no browser launch template is configured
pub const LAUNCH_TEMPLATE_NOTE: &str =
    "Configure app_launch_url_template in the app settings for browser launch.";

/// How the caller should start the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LaunchKind {
    /// Open the templated URL in a browser helper
    WebAppUrl,
    /// Use an external SSH client with `ssh_uri`
    ExternalSshClient,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchHint {
    pub kind: LaunchKind,
    pub url: Option<String>,
    pub note: String,
}

impl LaunchHint {
    /// Build the hint from a URL template. Substitution is literal.
    pub fn from_template(template: &str, host: &str, port: u16, user: &str) -> Self {
        let template = template.trim();
        if template.is_empty() {
            return Self {
                kind: LaunchKind::ExternalSshClient,
                url: None,
                note: LAUNCH_TEMPLATE_NOTE.to_string(),
            };
        }

        let url = template
            .replace("{host}", host)
            .replace("{port}", &port.to_string())
            .replace("{user}", user);

        Self {
            kind: LaunchKind::WebAppUrl,
            url: Some(url),
            note: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    Ssh,
}

/// What a caller needs to start an SSH session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDescriptor {
    #[serde(rename = "type")]
    pub connection_type: ConnectionType,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub ssh_uri: String,
    pub launch: LaunchHint,
}

/// Result of a connect attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectDecision {
    /// Authorized and the connection gate passed
    Granted {
        connection: ConnectionDescriptor,
        probe: ProbeResult,
    },
    /// Caller lacks the required capability; nothing was probed
    Unauthorized { reason: String },
    /// TCP or banner stage failed
    ProbeFailed { reason: String, probe: ProbeResult },
}
