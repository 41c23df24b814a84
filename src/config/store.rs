//! Configuration store client
//!
//! The store holds app settings, endpoint definitions and the session →
//! principal mapping. Every call is a fresh read; nothing is cached here.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Configuration store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Session is not valid")]
    InvalidSession,

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// One endpoint stanza as stored (`name` is `endpoint:<id>`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEndpointEntry {
    pub name: String,
    #[serde(default)]
    pub content: Map<String, Value>,
}

impl RawEndpointEntry {
    pub fn new(name: impl Into<String>, content: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }
}

/// Current-context record for a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPrincipal {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub realname: Option<String>,
    /// Either a list of names or a comma-separated string
    #[serde(default)]
    pub capabilities: Value,
}

/// Whole configuration document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(default)]
    pub settings: Map<String, Value>,
    #[serde(default)]
    pub endpoints: Vec<RawEndpointEntry>,
    #[serde(default)]
    pub sessions: HashMap<String, RawPrincipal>,
}

impl ConfigDocument {
    pub(crate) fn principal_for(&self, session_token: &str) -> Result<RawPrincipal, StoreError> {
        self.sessions
            .get(session_token)
            .cloned()
            .ok_or(StoreError::InvalidSession)
    }
}

/// Access to settings, endpoints and principals on behalf of a session
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Raw settings stanza
    async fn get_app_settings(&self, session_token: &str) -> Result<Map<String, Value>, StoreError>;

    /// All endpoint stanzas, enabled or not
    async fn list_configured_endpoints(
        &self,
        session_token: &str,
    ) -> Result<Vec<RawEndpointEntry>, StoreError>;

    /// Identity and capabilities of the session's user
    async fn get_current_principal(&self, session_token: &str) -> Result<RawPrincipal, StoreError>;
}

/// In-memory store, used by tests and embedders that already hold the config
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStore {
    document: ConfigDocument,
}

impl MemoryConfigStore {
    pub fn new(document: ConfigDocument) -> Self {
        Self { document }
    }

    pub fn with_settings(mut self, settings: Map<String, Value>) -> Self {
        self.document.settings = settings;
        self
    }

    pub fn with_endpoint(mut self, entry: RawEndpointEntry) -> Self {
        self.document.endpoints.push(entry);
        self
    }

    pub fn with_session(mut self, token: impl Into<String>, principal: RawPrincipal) -> Self {
        self.document.sessions.insert(token.into(), principal);
        self
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn get_app_settings(&self, _session_token: &str) -> Result<Map<String, Value>, StoreError> {
        Ok(self.document.settings.clone())
    }

    async fn list_configured_endpoints(
        &self,
        _session_token: &str,
    ) -> Result<Vec<RawEndpointEntry>, StoreError> {
        Ok(self.document.endpoints.clone())
    }

    async fn get_current_principal(&self, session_token: &str) -> Result<RawPrincipal, StoreError> {
        self.document.principal_for(session_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_store_unknown_session() {
        let store = MemoryConfigStore::default();
        let err = store.get_current_principal("nope").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidSession));
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let principal = RawPrincipal {
            username: Some("alice".to_string()),
            realname: None,
            capabilities: json!(["admin_connect"]),
        };
        let store = MemoryConfigStore::default()
            .with_session("tok", principal.clone())
            .with_endpoint(RawEndpointEntry::new("endpoint:web", Map::new()));

        assert_eq!(store.get_current_principal("tok").await.unwrap(), principal);
        assert_eq!(store.list_configured_endpoints("tok").await.unwrap().len(), 1);
    }
}
