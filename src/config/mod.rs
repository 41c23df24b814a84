//! Configuration Management Module
//!
//! App settings, the configuration store seam and raw value coercion.

pub mod settings;
pub mod storage;
pub mod store;
pub mod value;

pub use settings::{AppSettings, DEFAULT_PROBE_TIMEOUT_SECS, MAX_PROBE_TIMEOUT_SECS, MIN_PROBE_TIMEOUT_SECS};
pub use storage::{config_dir, config_file, FileConfigStore};
pub use store::{
    ConfigDocument, ConfigStore, MemoryConfigStore, RawEndpointEntry, RawPrincipal, StoreError,
};
