//! Endpoint Registry
//!
//! Lists the enabled endpoints configured for the app. Lookups fail soft:
//! a store error yields an empty list instead of breaking the caller.

use std::sync::Arc;

use tracing::{debug, warn};

use super::types::{Endpoint, EndpointParseError};
use crate::config::{ConfigStore, RawEndpointEntry};

pub struct EndpointRegistry {
    store: Arc<dyn ConfigStore>,
}

impl EndpointRegistry {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    /// Enabled endpoints in configuration order
    pub async fn list_endpoints(&self, session_token: &str) -> Vec<Endpoint> {
        match self.store.list_configured_endpoints(session_token).await {
            Ok(entries) => parse_enabled(&entries),
            Err(e) => {
                warn!("Endpoint lookup failed, returning no endpoints: {}", e);
                Vec::new()
            }
        }
    }
}

/// Parse raw stanzas, dropping invalid and disabled entries
pub fn parse_enabled(entries: &[RawEndpointEntry]) -> Vec<Endpoint> {
    entries
        .iter()
        .filter_map(|entry| match Endpoint::try_from(entry) {
            Ok(ep) => Some(ep),
            Err(EndpointParseError::NotAnEndpoint(name)) => {
                debug!("Skipping non-endpoint stanza {}", name);
                None
            }
            Err(e) => {
                warn!("Skipping endpoint: {}", e);
                None
            }
        })
        .filter(|ep| ep.enabled)
        .collect()
}
