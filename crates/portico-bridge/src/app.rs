//! The wrapped-application contract.
//!
//! A `GatewayApp` is a synchronous callable: it receives the per-request
//! environment and a response callback, and yields the response body as
//! a sequence of byte chunks. The callback must be invoked exactly once
//! before `call` returns; the bridge validates this and converts misuse
//! into a per-request fault.

use std::sync::Arc;

use bytes::Bytes;

use portico_core::error::{BridgeError, BridgeResult};

use crate::environ::Environ;

/// Body chunks produced by the wrapped application.
pub type BodyChunks = Box<dyn Iterator<Item = Bytes> + Send>;

/// The wrapped application's entry point.
pub trait GatewayApp: Send + Sync {
    /// Handle one request.
    ///
    /// `start.start(...)` must be called exactly once with the status
    /// line and response headers before this method returns its body
    /// chunks.
    fn call(&self, environ: &Environ, start: &mut StartResponse) -> anyhow::Result<BodyChunks>;
}

/// Captures the status line and headers supplied by the wrapped
/// application's single callback invocation.
#[derive(Debug, Default)]
pub struct StartResponse {
    captured: Option<ResponseCapture>,
    called_twice: bool,
}

impl StartResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// The response callback. First invocation wins; a second is
    /// recorded and reported as a fault when the capture is read.
    pub fn start(&mut self, status_line: &str, headers: Vec<(String, String)>) {
        if self.captured.is_some() {
            self.called_twice = true;
            return;
        }
        self.captured = Some(ResponseCapture {
            status_line: status_line.to_string(),
            headers,
        });
    }

    /// Consume the capture, validating the exactly-once contract.
    pub fn finish(self) -> BridgeResult<ResponseCapture> {
        if self.called_twice {
            return Err(BridgeError::Capture(
                "response callback invoked more than once".to_string(),
            ));
        }
        self.captured.ok_or_else(|| {
            BridgeError::Capture("response callback was never invoked".to_string())
        })
    }
}

/// The captured status line and ordered header pairs.
#[derive(Debug, Clone)]
pub struct ResponseCapture {
    pub status_line: String,
    pub headers: Vec<(String, String)>,
}

impl ResponseCapture {
    /// The numeric status code: the leading token of the status line.
    pub fn status_code(&self) -> BridgeResult<u16> {
        let token = self.status_line.split_whitespace().next().ok_or_else(|| {
            BridgeError::Capture("empty status line".to_string())
        })?;
        token.parse::<u16>().map_err(|_| {
            BridgeError::Capture(format!("non-numeric status line: {:?}", self.status_line))
        })
    }
}

/// A small demo application: answers with the request method and path.
///
/// Used by the dev host and in tests.
pub fn echo_app() -> Arc<dyn GatewayApp> {
    Arc::new(EchoApp)
}

struct EchoApp;

impl GatewayApp for EchoApp {
    fn call(&self, environ: &Environ, start: &mut StartResponse) -> anyhow::Result<BodyChunks> {
        let body = format!("{} {}", environ.request_method, environ.path_info);
        start.start(
            "200 OK",
            vec![("Content-Type".to_string(), "text/plain".to_string())],
        );
        Ok(Box::new(std::iter::once(Bytes::from(body))))
    }
}

/// Build an environment for a bare request; test helper shared across
/// the crate.
#[cfg(test)]
pub(crate) fn test_environ() -> Environ {
    use crate::normalize::normalize;
    use portico_core::types::{GatewayDefaults, HostRequest};
    Environ::build(&normalize(&HostRequest::default()), &GatewayDefaults::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_records_status_and_headers() {
        let mut start = StartResponse::new();
        start.start(
            "404 Not Found",
            vec![("Content-Type".to_string(), "text/plain".to_string())],
        );
        let capture = start.finish().unwrap();
        assert_eq!(capture.status_code().unwrap(), 404);
        assert_eq!(
            capture.headers,
            vec![("Content-Type".to_string(), "text/plain".to_string())]
        );
    }

    #[test]
    fn capture_without_invocation_is_a_fault() {
        let start = StartResponse::new();
        assert!(matches!(start.finish(), Err(BridgeError::Capture(_))));
    }

    #[test]
    fn capture_with_double_invocation_is_a_fault() {
        let mut start = StartResponse::new();
        start.start("200 OK", Vec::new());
        start.start("500 Internal Server Error", Vec::new());
        assert!(matches!(start.finish(), Err(BridgeError::Capture(_))));
    }

    #[test]
    fn non_numeric_status_line_is_a_fault() {
        let mut start = StartResponse::new();
        start.start("teapot", Vec::new());
        let capture = start.finish().unwrap();
        assert!(capture.status_code().is_err());
    }

    #[test]
    fn echo_app_answers_with_method_and_path() {
        let app = echo_app();
        let environ = test_environ();
        let mut start = StartResponse::new();
        let chunks = app.call(&environ, &mut start).unwrap();
        let body: Vec<u8> = chunks.flat_map(|c| c.to_vec()).collect();
        assert_eq!(body, b"GET /");
        assert_eq!(start.finish().unwrap().status_code().unwrap(), 200);
    }
}
