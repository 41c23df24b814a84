//! File-backed configuration store
//!
//! Reads a JSON configuration document from disk on every call.
//! Default location: ~/.app-access/config.json

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::fs;

use super::store::{ConfigDocument, ConfigStore, RawEndpointEntry, RawPrincipal, StoreError};

/// Get the app-access configuration directory
pub fn config_dir() -> Result<PathBuf, StoreError> {
    dirs::home_dir()
        .map(|home| home.join(".app-access"))
        .ok_or_else(|| StoreError::Unavailable("Failed to determine home directory".to_string()))
}

/// Get the default configuration file path
pub fn config_file() -> Result<PathBuf, StoreError> {
    Ok(config_dir()?.join("config.json"))
}

/// Store that re-reads its document from a JSON file
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    /// Create a store over the default path
    pub fn new() -> Result<Self, StoreError> {
        Ok(Self {
            path: config_file()?,
        })
    }

    /// Create a store over a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document. A missing file is an empty document.
    pub async fn load(&self) -> Result<ConfigDocument, StoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Config file {:?} not found, using empty config", self.path);
                Ok(ConfigDocument::default())
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn get_app_settings(&self, _session_token: &str) -> Result<Map<String, Value>, StoreError> {
        Ok(self.load().await?.settings)
    }

    async fn list_configured_endpoints(
        &self,
        _session_token: &str,
    ) -> Result<Vec<RawEndpointEntry>, StoreError> {
        Ok(self.load().await?.endpoints)
    }

    async fn get_current_principal(&self, session_token: &str) -> Result<RawPrincipal, StoreError> {
        self.load().await?.principal_for(session_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_nonexistent() {
        let temp = tempdir().unwrap();
        let store = FileConfigStore::with_path(temp.path().join("missing.json"));

        let doc = store.load().await.unwrap();
        assert!(doc.settings.is_empty());
        assert!(doc.endpoints.is_empty());
        assert!(matches!(
            store.get_current_principal("tok").await,
            Err(StoreError::InvalidSession)
        ));
    }

    #[tokio::test]
    async fn test_reads_fresh_each_call() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.json");
        let store = FileConfigStore::with_path(path.clone());

        std::fs::write(&path, r#"{"settings": {"probe_timeout_s": "5"}}"#).unwrap();
        let first = store.get_app_settings("tok").await.unwrap();
        assert_eq!(first.get("probe_timeout_s").unwrap(), "5");

        std::fs::write(
            &path,
            r#"{
                "settings": {"probe_timeout_s": "7"},
                "endpoints": [{"name": "endpoint:db", "content": {"host": "db.internal"}}],
                "sessions": {"tok": {"username": "alice", "capabilities": "a, b"}}
            }"#,
        )
        .unwrap();
        let second = store.get_app_settings("tok").await.unwrap();
        assert_eq!(second.get("probe_timeout_s").unwrap(), "7");
        assert_eq!(store.list_configured_endpoints("tok").await.unwrap().len(), 1);

        let principal = store.get_current_principal("tok").await.unwrap();
        assert_eq!(principal.username.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_corrupted_file_is_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = FileConfigStore::with_path(path);
        assert!(matches!(store.load().await, Err(StoreError::Json(_))));
    }
}
