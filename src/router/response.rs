//! Uniform response envelope

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value};

pub const CONTENT_TYPE_JSON: &str = "application/json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    /// JSON document as text
    pub body: String,
}

impl ResponseEnvelope {
    fn with_body(status_code: u16, body: String) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), CONTENT_TYPE_JSON.to_string());
        headers.insert("Cache-Control".to_string(), "no-store".to_string());
        Self {
            status_code,
            headers,
            body,
        }
    }

    pub fn from_value(status_code: u16, value: Value) -> Self {
        Self::with_body(status_code, value.to_string())
    }

    /// Serialize `payload`; a serialization failure becomes a 500
    pub fn from_payload<T: Serialize>(status_code: u16, payload: &T) -> Self {
        match serde_json::to_string(payload) {
            Ok(body) => Self::with_body(status_code, body),
            Err(e) => Self::from_value(500, json!({ "error": e.to_string() })),
        }
    }

    pub fn ok<T: Serialize>(payload: &T) -> Self {
        Self::from_payload(200, payload)
    }

    pub fn content_type(&self) -> &str {
        self.headers
            .get("Content-Type")
            .map(String::as_str)
            .unwrap_or(CONTENT_TYPE_JSON)
    }

    /// Parsed body, `Value::Null` if it is not JSON
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}
