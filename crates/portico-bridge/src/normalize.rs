//! Request normalization — host request objects to the canonical form.
//!
//! Host platforms populate different subsets of the request fields, so
//! every extraction here defaults rather than fails. Precedence:
//! an explicit `path` beats deriving one from `url`; an explicit
//! `query_string` beats joining the `query` map.

use serde_json::Value;

use portico_core::types::{CanonicalRequest, HeaderBag, HostRequest};

/// Reduce a host request to the canonical form.
///
/// Never fails: absent fields are defaulted (`GET`, `/`, empty query
/// string, empty headers, empty body).
pub fn normalize(req: &HostRequest) -> CanonicalRequest {
    let method = req
        .method
        .as_deref()
        .filter(|m| !m.is_empty())
        .unwrap_or("GET")
        .to_string();

    let path = match (&req.path, &req.url) {
        (Some(path), _) if !path.is_empty() => path.clone(),
        (_, Some(url)) if !url.is_empty() => path_from_url(url),
        _ => "/".to_string(),
    };

    let query_string = match (&req.query_string, &req.query) {
        (Some(qs), _) => qs.clone(),
        (None, Some(map)) => query_string_from_map(map),
        (None, None) => String::new(),
    };

    let headers = req
        .headers
        .as_ref()
        .map(header_bag_from_map)
        .unwrap_or_default();

    let body = req.body.as_ref().map(|b| b.to_bytes()).unwrap_or_default();

    CanonicalRequest {
        method,
        path,
        query_string,
        headers,
        body,
    }
}

/// Truncate a URL at the first `'?'` to recover the path.
fn path_from_url(url: &str) -> String {
    match url.find('?') {
        Some(idx) => url[..idx].to_string(),
        None => url.to_string(),
    }
}

/// Join a query map into `k=v&k=v` form, insertion order preserved,
/// skipping entries with no usable value.
fn query_string_from_map(map: &serde_json::Map<String, Value>) -> String {
    map.iter()
        .filter_map(|(k, v)| query_value(v).map(|v| format!("{k}={v}")))
        .collect::<Vec<_>>()
        .join("&")
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(false) => None,
        Value::Bool(true) => Some("true".to_string()),
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

fn header_bag_from_map(map: &serde_json::Map<String, Value>) -> HeaderBag {
    let mut bag = HeaderBag::new();
    for (name, value) in map {
        let value = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        bag.insert(name, value);
    }
    bag
}
