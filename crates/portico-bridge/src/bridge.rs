//! The protocol bridge — drives the wrapped application per request.
//!
//! `Bridge::handle` is the outermost boundary: whatever happens while
//! normalizing, building the environment, invoking the application, or
//! decoding its output, the host platform always receives a well-formed
//! response. Faults are downgraded to a status-500 plain-text body
//! carrying the failure message and its debug-formatted chain.

use std::sync::Arc;

use bytes::BytesMut;
use tracing::{debug, error};

use portico_core::error::BridgeError;
use portico_core::types::{GatewayDefaults, HostRequest, HostResponse};

use crate::app::{GatewayApp, StartResponse};
use crate::environ::Environ;
use crate::normalize::normalize;
use crate::slot::AppSlot;

type AppFactory = Box<dyn Fn() -> anyhow::Result<Arc<dyn GatewayApp>> + Send + Sync>;

/// Bridges host request objects to the wrapped application.
///
/// One `Bridge` per process instance; the wrapped application is
/// constructed on the first `handle` call and cached, along with any
/// construction failure, until process restart.
pub struct Bridge {
    slot: AppSlot,
    factory: AppFactory,
    defaults: GatewayDefaults,
}

impl Bridge {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> anyhow::Result<Arc<dyn GatewayApp>> + Send + Sync + 'static,
    {
        Self {
            slot: AppSlot::new(),
            factory: Box::new(factory),
            defaults: GatewayDefaults::default(),
        }
    }

    /// Override the environment defaults (scheme, server name, port).
    pub fn with_defaults(mut self, defaults: GatewayDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Handle one host request. Never fails: every fault becomes a
    /// status-500 diagnostic response.
    pub fn handle(&self, req: &HostRequest) -> HostResponse {
        let app = match self.slot.get_or_init(&self.factory) {
            Ok(app) => app,
            Err(err) => {
                error!(error = %err, "wrapped application unavailable");
                return failure_response(&anyhow::Error::from(err));
            }
        };

        match self.dispatch(app.as_ref(), req) {
            Ok(resp) => resp,
            Err(err) => {
                error!(error = %err, "request failed");
                failure_response(&err)
            }
        }
    }

    fn dispatch(&self, app: &dyn GatewayApp, req: &HostRequest) -> anyhow::Result<HostResponse> {
        let canonical = normalize(req);
        let environ = Environ::build(&canonical, &self.defaults);

        let mut start = StartResponse::new();
        let chunks = app
            .call(&environ, &mut start)
            .map_err(|e| BridgeError::App(format!("{e:#}")))?;

        let mut buf = BytesMut::new();
        for chunk in chunks {
            buf.extend_from_slice(&chunk);
        }

        let capture = start.finish()?;
        let status_code = capture.status_code()?;
        let body = String::from_utf8_lossy(&buf).into_owned();

        debug!(
            method = %canonical.method,
            path = %canonical.path,
            status = status_code,
            "request bridged"
        );

        Ok(HostResponse {
            status_code,
            headers: capture.headers,
            body,
        })
    }
}

/// The fixed 500 diagnostic response: failure message plus the
/// debug-formatted error chain.
fn failure_response(err: &anyhow::Error) -> HostResponse {
    HostResponse {
        status_code: 500,
        headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
        body: format!("Error: {err}\n{err:?}"),
    }
}
