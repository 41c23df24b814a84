//! Endpoint definition

use serde::{Deserialize, Serialize};

use crate::config::value::{split_list, value_to_bool, value_to_i64, value_to_trimmed};
use crate::config::RawEndpointEntry;

/// Prefix every endpoint stanza name carries
pub const ENDPOINT_PREFIX: &str = "endpoint:";

/// Default SSH port
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Administrator-registered remote host reachable over SSH
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub id: String,
    pub host: String,
    pub port: u16,
    pub description: String,
    pub enabled: bool,
    pub tags: Vec<String>,
}

/// Why a raw stanza could not become an [`Endpoint`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointParseError {
    #[error("not an endpoint stanza: {0}")]
    NotAnEndpoint(String),

    #[error("endpoint {0} has no host")]
    MissingHost(String),

    #[error("endpoint {id} has out-of-range port {port}")]
    PortOutOfRange { id: String, port: i64 },
}

impl TryFrom<&RawEndpointEntry> for Endpoint {
    type Error = EndpointParseError;

    fn try_from(entry: &RawEndpointEntry) -> Result<Self, Self::Error> {
        let id = entry
            .name
            .strip_prefix(ENDPOINT_PREFIX)
            .ok_or_else(|| EndpointParseError::NotAnEndpoint(entry.name.clone()))?
            .to_string();

        let content = &entry.content;
        let host = value_to_trimmed(content.get("host"));
        if host.is_empty() {
            return Err(EndpointParseError::MissingHost(id));
        }

        // Malformed port falls back to 22; a parseable one must be in range
        let port = value_to_i64(content.get("port")).unwrap_or(DEFAULT_SSH_PORT as i64);
        let port = u16::try_from(port)
            .ok()
            .filter(|p| *p != 0)
            .ok_or(EndpointParseError::PortOutOfRange {
                id: id.clone(),
                port,
            })?;

        Ok(Self {
            id,
            host,
            port,
            description: value_to_trimmed(content.get("description")),
            enabled: value_to_bool(content.get("enabled"), true),
            tags: split_list(&value_to_trimmed(content.get("tags"))),
        })
    }
}
