//! Gateway environment construction.
//!
//! Builds the CGI-style environment the wrapped application consumes:
//! fixed protocol keys derived from the canonical request, an input
//! stream over the body, and one `HTTP_*` entry per remaining inbound
//! header. A fresh environment is built per request; nothing is shared
//! across invocations.

use std::io::Cursor;

use bytes::Bytes;

use portico_core::types::{CanonicalRequest, GatewayDefaults};

/// Gateway calling-convention version marker.
pub const GATEWAY_VERSION: (u8, u8) = (1, 0);

/// Headers that map to fixed keys and are not forwarded as `HTTP_*`.
const HANDLED_HEADERS: [&str; 3] = ["content-type", "content-length", "host"];

/// The per-request environment handed to the wrapped application.
#[derive(Debug, Clone)]
pub struct Environ {
    pub request_method: String,
    pub path_info: String,
    pub query_string: String,
    pub script_name: String,
    pub content_type: String,
    pub content_length: String,
    pub server_name: String,
    pub server_port: String,
    pub url_scheme: String,
    pub version: (u8, u8),
    /// Execution-mode flags: one in-flight request per invocation, but
    /// the host may run many process instances side by side.
    pub multithread: bool,
    pub multiprocess: bool,
    pub run_once: bool,
    body: Bytes,
    /// Forwarded headers under their final `HTTP_*` keys.
    http_headers: Vec<(String, String)>,
}

impl Environ {
    /// Build the environment for one canonical request.
    pub fn build(req: &CanonicalRequest, defaults: &GatewayDefaults) -> Self {
        let (server_name, server_port) = match req.headers.get("host") {
            Some(host) => split_host(host, &defaults.server_port),
            None => (defaults.server_name.clone(), defaults.server_port.clone()),
        };

        let url_scheme = req
            .headers
            .get("x-forwarded-proto")
            .map(str::to_string)
            .unwrap_or_else(|| defaults.url_scheme.clone());

        let http_headers = req
            .headers
            .iter()
            .filter(|(name, _)| !HANDLED_HEADERS.contains(name))
            .map(|(name, value)| (forwarded_key(name), value.to_string()))
            .collect();

        Self {
            request_method: req.method.clone(),
            path_info: req.path.clone(),
            query_string: req.query_string.clone(),
            script_name: String::new(),
            content_type: req
                .headers
                .get("content-type")
                .unwrap_or_default()
                .to_string(),
            content_length: req.body.len().to_string(),
            server_name,
            server_port,
            url_scheme,
            version: GATEWAY_VERSION,
            multithread: false,
            multiprocess: true,
            run_once: false,
            body: req.body.clone(),
            http_headers,
        }
    }

    /// Readable stream over the request body.
    pub fn input(&self) -> impl std::io::Read + use<> {
        Cursor::new(self.body.clone())
    }

    /// Writable error stream for the wrapped application.
    pub fn errors(&self) -> impl std::io::Write {
        std::io::stderr()
    }

    /// The raw body bytes.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Look up a forwarded header by its original name.
    pub fn header(&self, name: &str) -> Option<&str> {
        let key = forwarded_key(name);
        self.http_headers
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The string-valued environment in CGI form: fixed keys first,
    /// then the forwarded `HTTP_*` entries.
    pub fn vars(&self) -> Vec<(String, String)> {
        let mut vars = vec![
            ("REQUEST_METHOD".to_string(), self.request_method.clone()),
            ("PATH_INFO".to_string(), self.path_info.clone()),
            ("QUERY_STRING".to_string(), self.query_string.clone()),
            ("SCRIPT_NAME".to_string(), self.script_name.clone()),
            ("CONTENT_TYPE".to_string(), self.content_type.clone()),
            ("CONTENT_LENGTH".to_string(), self.content_length.clone()),
            ("SERVER_NAME".to_string(), self.server_name.clone()),
            ("SERVER_PORT".to_string(), self.server_port.clone()),
            (
                "gateway.version".to_string(),
                format!("{}.{}", self.version.0, self.version.1),
            ),
            ("gateway.url_scheme".to_string(), self.url_scheme.clone()),
            ("gateway.multithread".to_string(), self.multithread.to_string()),
            ("gateway.multiprocess".to_string(), self.multiprocess.to_string()),
            ("gateway.run_once".to_string(), self.run_once.to_string()),
        ];
        vars.extend(self.http_headers.iter().cloned());
        vars
    }
}

/// Split a Host header into (name, port), defaulting the port when no
/// colon is present.
fn split_host(host: &str, default_port: &str) -> (String, String) {
    match host.split_once(':') {
        Some((name, port)) => (name.to_string(), port.to_string()),
        None => (host.to_string(), default_port.to_string()),
    }
}

/// `x-request-id` → `HTTP_X_REQUEST_ID`.
fn forwarded_key(name: &str) -> String {
    format!("HTTP_{}", name.to_ascii_uppercase().replace('-', "_"))
}
