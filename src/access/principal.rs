//! Caller identity

use serde::Serialize;
use serde_json::Value;

use crate::config::value::{scalar_to_string, split_list};
use crate::config::RawPrincipal;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub username: String,
    /// Granted capabilities in store order, without duplicates
    pub capabilities: Vec<String>,
}

impl Principal {
    pub fn new<I, S>(username: impl Into<String>, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut granted: Vec<String> = Vec::new();
        for cap in capabilities {
            let cap: String = cap.into();
            if !granted.contains(&cap) {
                granted.push(cap);
            }
        }

        Self {
            username: username.into(),
            capabilities: granted,
        }
    }

    /// Username for display in URIs, `user` when unknown
    pub fn uri_user(&self) -> &str {
        if self.username.is_empty() {
            "user"
        } else {
            &self.username
        }
    }
}

impl From<RawPrincipal> for Principal {
    fn from(raw: RawPrincipal) -> Self {
        let username = raw
            .username
            .filter(|s| !s.is_empty())
            .or(raw.realname)
            .unwrap_or_default();

        let capabilities = match raw.capabilities {
            Value::String(s) => split_list(&s),
            Value::Array(items) => items.iter().filter_map(scalar_to_string).collect(),
            _ => Vec::new(),
        };

        Self::new(username, capabilities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_raw_list() {
        let p = Principal::from(RawPrincipal {
            username: Some("alice".to_string()),
            realname: Some("Alice A.".to_string()),
            capabilities: json!(["search", "admin_connect"]),
        });
        assert_eq!(p.username, "alice");
        assert_eq!(p.capabilities, vec!["search", "admin_connect"]);
    }

    #[test]
    fn test_from_raw_string_and_realname_fallback() {
        let p = Principal::from(RawPrincipal {
            username: Some(String::new()),
            realname: Some("svc".to_string()),
            capabilities: json!("b, a ,, b"),
        });
        assert_eq!(p.username, "svc");
        assert_eq!(p.capabilities, vec!["b", "a"]);
    }

    #[test]
    fn test_from_raw_garbage_capabilities() {
        let p = Principal::from(RawPrincipal {
            username: None,
            realname: None,
            capabilities: json!({ "nested": true }),
        });
        assert!(p.username.is_empty());
        assert!(p.capabilities.is_empty());
        assert_eq!(p.uri_user(), "user");
    }
}
