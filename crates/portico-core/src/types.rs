//! Shared types used across Portico crates.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An inbound request as delivered by the host platform.
///
/// Host platforms disagree on which fields they populate, so every field
/// is optional. The normalizer applies the defaulting rules; deserializing
/// a host event with any subset of these fields succeeds.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostRequest {
    pub method: Option<String>,
    pub path: Option<String>,
    pub url: Option<String>,
    /// Parsed query parameters, insertion-ordered.
    pub query: Option<serde_json::Map<String, Value>>,
    pub query_string: Option<String>,
    pub headers: Option<serde_json::Map<String, Value>>,
    pub body: Option<HostBody>,
}

/// A host request body, which may arrive as text, raw bytes, or any
/// other JSON value (stringified before use).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HostBody {
    Text(String),
    Binary(Vec<u8>),
    Other(Value),
}

impl HostBody {
    /// The body as a byte sequence, regardless of how it arrived.
    pub fn to_bytes(&self) -> Bytes {
        match self {
            HostBody::Text(s) => Bytes::from(s.clone().into_bytes()),
            HostBody::Binary(b) => Bytes::from(b.clone()),
            HostBody::Other(v) => Bytes::from(v.to_string().into_bytes()),
        }
    }
}

/// The canonical form every host request is reduced to before the
/// gateway environment is built.
#[derive(Debug, Clone)]
pub struct CanonicalRequest {
    pub method: String,
    pub path: String,
    pub query_string: String,
    pub headers: HeaderBag,
    pub body: Bytes,
}

/// Case-insensitive, insertion-ordered header mapping.
///
/// Keys are stored lowercased; lookups lowercase the probe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderBag {
    entries: Vec<(String, String)>,
}

impl HeaderBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, replacing any existing value for the same name.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    /// Look up a header by name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The response shape handed back to the host platform.
///
/// Header order and duplicates are preserved exactly as the wrapped
/// application emitted them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostResponse {
    pub status_code: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Defaults applied while building the gateway environment when the
/// request carries no host or forwarding information.
#[derive(Debug, Clone)]
pub struct GatewayDefaults {
    pub server_name: String,
    pub server_port: String,
    pub url_scheme: String,
}

impl Default for GatewayDefaults {
    fn default() -> Self {
        Self {
            server_name: "localhost".to_string(),
            server_port: "80".to_string(),
            url_scheme: "https".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_bag_is_case_insensitive() {
        let mut bag = HeaderBag::new();
        bag.insert("Content-Type", "text/html");
        assert_eq!(bag.get("content-type"), Some("text/html"));
        assert_eq!(bag.get("CONTENT-TYPE"), Some("text/html"));
    }

    #[test]
    fn header_bag_insert_replaces() {
        let mut bag = HeaderBag::new();
        bag.insert("X-Tag", "one");
        bag.insert("x-tag", "two");
        assert_eq!(bag.len(), 1);
        assert_eq!(bag.get("x-tag"), Some("two"));
    }

    #[test]
    fn header_bag_preserves_insertion_order() {
        let mut bag = HeaderBag::new();
        bag.insert("B", "2");
        bag.insert("A", "1");
        let names: Vec<&str> = bag.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn host_body_text_to_bytes() {
        let body = HostBody::Text("hello".to_string());
        assert_eq!(body.to_bytes(), Bytes::from_static(b"hello"));
    }

    #[test]
    fn host_body_other_is_stringified() {
        let body = HostBody::Other(serde_json::json!(42));
        assert_eq!(body.to_bytes(), Bytes::from_static(b"42"));
    }

    #[test]
    fn host_request_deserializes_with_missing_fields() {
        let req: HostRequest = serde_json::from_str(r#"{"method": "POST"}"#).unwrap();
        assert_eq!(req.method.as_deref(), Some("POST"));
        assert!(req.path.is_none());
        assert!(req.headers.is_none());
        assert!(req.body.is_none());
    }

    #[test]
    fn host_request_body_text_and_binary() {
        let req: HostRequest = serde_json::from_str(r#"{"body": "hi"}"#).unwrap();
        assert!(matches!(req.body, Some(HostBody::Text(_))));

        let req: HostRequest = serde_json::from_str(r#"{"body": [104, 105]}"#).unwrap();
        assert_eq!(req.body.unwrap().to_bytes(), Bytes::from_static(b"hi"));
    }
}
