//! Request normalization
//!
//! Turns a loosely shaped transport request into a [`RequestEnvelope`]:
//! session token, method, normalized path and merged params.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::types::RouteError;
use crate::config::value::scalar_to_string;
use crate::endpoint::DEFAULT_SSH_PORT;

/// Session map keys checked for a token, in order
const SESSION_TOKEN_KEYS: [&str; 4] = ["authtoken", "sessionKey", "session_key", "splunk.sessionKey"];
/// Transport param maps, merged in order
const PARAM_SOURCES: [&str; 5] = ["form", "postargs", "body", "query", "getargs"];
/// Path fields, first present wins
const PATH_FIELDS: [&str; 4] = ["path_info", "path", "uri", "rest_path"];
const AUTH_SCHEME: &str = "Splunk ";

/// Raw request as delivered by the transport
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RawRequest(pub Map<String, Value>);

impl RawRequest {
    /// Parse one JSON request. Blank input is an empty request.
    pub fn from_json(input: &str) -> Result<Self, RouteError> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(input)
            .map_err(|e| RouteError::Validation(format!("Malformed request: {}", e)))
    }

    fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    fn non_empty_str(&self, key: &str) -> Option<String> {
        self.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// Normalized inbound request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestEnvelope {
    pub method: String,
    pub path: String,
    pub params: BTreeMap<String, String>,
    pub session_token: Option<String>,
}

impl RequestEnvelope {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into().to_uppercase(),
            path: normalize_path(&path.into()),
            params: BTreeMap::new(),
            session_token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

impl From<&RawRequest> for RequestEnvelope {
    fn from(raw: &RawRequest) -> Self {
        let method = raw
            .non_empty_str("method")
            .unwrap_or_else(|| "GET".to_string())
            .to_uppercase();

        let path = PATH_FIELDS
            .iter()
            .filter_map(|field| raw.get(field).and_then(scalar_to_string))
            .find(|p| !p.is_empty())
            .unwrap_or_default();

        Self {
            method,
            path: normalize_path(&path),
            params: parse_params(raw),
            session_token: resolve_session_token(raw),
        }
    }
}

/// Drop the query string and trailing slashes
pub fn normalize_path(path: &str) -> String {
    let path = path.split('?').next().unwrap_or_default();
    path.trim_end_matches('/').to_string()
}

/// Session token from the session map, a direct field or the auth header
pub fn resolve_session_token(raw: &RawRequest) -> Option<String> {
    if let Some(Value::Object(session)) = raw.get("session") {
        let token = SESSION_TOKEN_KEYS
            .iter()
            .filter_map(|key| session.get(*key).and_then(Value::as_str))
            .find(|s| !s.is_empty());
        if let Some(token) = token {
            return Some(token.to_string());
        }
    }

    if let Some(token) = raw
        .non_empty_str("sessionKey")
        .or_else(|| raw.non_empty_str("session_key"))
    {
        return Some(token);
    }

    let Some(Value::Object(headers)) = raw.get("headers") else {
        return None;
    };
    let auth = headers
        .get("Authorization")
        .or_else(|| headers.get("authorization"))
        .and_then(Value::as_str)?;
    let token = auth.strip_prefix(AUTH_SCHEME)?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Merge transport param maps and the payload body.
///
/// A JSON object body overrides transport params; a form-encoded body only
/// fills keys that are still missing.
pub fn parse_params(raw: &RawRequest) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();

    for source in PARAM_SOURCES {
        if let Some(Value::Object(map)) = raw.get(source) {
            merge_object(&mut params, map);
        }
    }

    match raw.get("payload") {
        Some(Value::Object(body)) => merge_object(&mut params, body),
        Some(Value::String(text)) if !text.trim().is_empty() => {
            match serde_json::from_str::<Value>(text) {
                Ok(Value::Object(body)) => merge_object(&mut params, &body),
                _ => {
                    for (key, value) in url::form_urlencoded::parse(text.trim().as_bytes()) {
                        params
                            .entry(key.into_owned())
                            .or_insert_with(|| value.into_owned());
                    }
                }
            }
        }
        _ => {}
    }

    params
}

fn merge_object(params: &mut BTreeMap<String, String>, map: &Map<String, Value>) {
    for (key, value) in map {
        if let Some(s) = scalar_to_string(value) {
            params.insert(key.clone(), s);
        }
    }
}

/// Validated `(host, port)` taken from request params
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub host: String,
    pub port: u16,
}

impl ProbeTarget {
    pub fn from_params(params: &BTreeMap<String, String>) -> Result<Self, RouteError> {
        let host = params.get("host").map(|h| h.trim()).unwrap_or_default();
        if host.is_empty() {
            return Err(RouteError::Validation("host is required".to_string()));
        }

        let raw_port = params.get("port").map(|p| p.trim()).unwrap_or_default();
        let port = if raw_port.is_empty() {
            i64::from(DEFAULT_SSH_PORT)
        } else {
            raw_port
                .parse::<i64>()
                .map_err(|_| RouteError::Validation("port must be an integer".to_string()))?
        };

        let port = u16::try_from(port)
            .ok()
            .filter(|p| *p != 0)
            .ok_or_else(|| RouteError::Validation("port must be between 1 and 65535".to_string()))?;

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}
