//! Application settings
//!
//! Settings are read fresh from the configuration store on every request.
//! Missing or malformed values fall back to defaults so a broken settings
//! stanza never takes the operation set down.

use serde::Serialize;
use serde_json::{Map, Value};

use super::value::{value_to_i64, value_to_trimmed};

/// Default probe timeout in seconds
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 3;
/// Lower bound for the probe timeout
pub const MIN_PROBE_TIMEOUT_SECS: u64 = 1;
/// Upper bound for the probe timeout
pub const MAX_PROBE_TIMEOUT_SECS: u64 = 15;

/// Raw setting keys as stored in the settings stanza
pub const KEY_REQUIRED_CAPABILITY: &str = "required_capability";
pub const KEY_PROBE_TIMEOUT: &str = "probe_timeout_s";
pub const KEY_LAUNCH_URL_TEMPLATE: &str = "app_launch_url_template";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Capability the caller must hold to connect (empty = no gate)
    pub required_capability: String,
    /// Per-stage probe timeout, always within [1, 15]
    pub probe_timeout_seconds: u64,
    /// Browser launch URL with `{host}`, `{port}` and `{user}` placeholders
    pub launch_url_template: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            required_capability: String::new(),
            probe_timeout_seconds: DEFAULT_PROBE_TIMEOUT_SECS,
            launch_url_template: String::new(),
        }
    }
}

impl AppSettings {
    /// Build settings from the raw key/value stanza
    pub fn from_raw(raw: &Map<String, Value>) -> Self {
        let timeout = value_to_i64(raw.get(KEY_PROBE_TIMEOUT))
            .unwrap_or(DEFAULT_PROBE_TIMEOUT_SECS as i64);

        Self {
            required_capability: value_to_trimmed(raw.get(KEY_REQUIRED_CAPABILITY)),
            probe_timeout_seconds: clamp_timeout(timeout),
            launch_url_template: value_to_trimmed(raw.get(KEY_LAUNCH_URL_TEMPLATE)),
        }
    }

    /// Whether a capability gate is configured
    pub fn is_gated(&self) -> bool {
        !self.required_capability.is_empty()
    }
}

/// Clamp a configured timeout into the supported range
pub fn clamp_timeout(secs: i64) -> u64 {
    secs.clamp(MIN_PROBE_TIMEOUT_SECS as i64, MAX_PROBE_TIMEOUT_SECS as i64) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_defaults_on_empty_stanza() {
        let settings = AppSettings::from_raw(&Map::new());
        assert_eq!(settings, AppSettings::default());
        assert!(!settings.is_gated());
    }

    #[test]
    fn test_timeout_clamped() {
        let low = AppSettings::from_raw(&raw(json!({ "probe_timeout_s": "0" })));
        assert_eq!(low.probe_timeout_seconds, 1);

        let high = AppSettings::from_raw(&raw(json!({ "probe_timeout_s": 600 })));
        assert_eq!(high.probe_timeout_seconds, 15);

        let garbage = AppSettings::from_raw(&raw(json!({ "probe_timeout_s": "soon" })));
        assert_eq!(garbage.probe_timeout_seconds, DEFAULT_PROBE_TIMEOUT_SECS);
    }

    #[test]
    fn test_values_trimmed() {
        let settings = AppSettings::from_raw(&raw(json!({
            "required_capability": "  admin_connect ",
            "app_launch_url_template": " https://term.local/?h={host} ",
        })));
        assert_eq!(settings.required_capability, "admin_connect");
        assert_eq!(settings.launch_url_template, "https://term.local/?h={host}");
        assert!(settings.is_gated());
    }
}
