//! Local HTTP host.
//!
//! `HttpHost` manages a hyper HTTP server that plays the serverless
//! platform's role: it hands each request to the bridge and writes the
//! bridge's response back. The bridge itself never fails; only
//! transport-level problems (unreadable body) produce a host-side 500.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{error, info};

use portico_bridge::Bridge;

use crate::convert::{host_request_from_parts, hyper_response_from};

/// HTTP host server wrapping a bridge.
pub struct HttpHost {
    bind_addr: SocketAddr,
    bridge: Arc<Bridge>,
}

impl HttpHost {
    /// Create a new host bound to the given address.
    pub fn new(bind_addr: SocketAddr, bridge: Arc<Bridge>) -> Self {
        Self { bind_addr, bridge }
    }

    /// Start the HTTP server.
    ///
    /// Runs until the shutdown signal is received. Spawns a tokio task
    /// per connection using HTTP/1.1.
    pub async fn serve(
        self,
        mut shutdown: tokio::sync::watch::Receiver<bool>,
    ) -> anyhow::Result<()> {
        let listener = TcpListener::bind(self.bind_addr)
            .await
            .context("failed to bind dev host")?;

        info!(addr = %self.bind_addr, "dev host listening");

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    let (stream, peer_addr) = accept_result.context("accept failed")?;
                    let bridge = self.bridge.clone();

                    tokio::spawn(async move {
                        let io = TokioIo::new(stream);
                        let svc = service_fn(move |req: Request<Incoming>| {
                            let bridge = bridge.clone();
                            async move {
                                Ok::<_, hyper::Error>(dispatch(&bridge, req).await)
                            }
                        });

                        if let Err(e) = http1::Builder::new()
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(%peer_addr, error = %e, "connection error");
                        }
                    });
                }
                _ = shutdown.changed() => {
                    info!("dev host shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}

/// Convert, bridge, convert back. Body collection is the only step that
/// can fail; it maps to a host-side 500.
async fn dispatch(bridge: &Bridge, req: Request<Incoming>) -> Response<Full<Bytes>> {
    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            error!(error = %e, "failed to read request body");
            return Response::builder()
                .status(500)
                .body(Full::new(Bytes::from_static(b"failed to read request body")))
                .expect("static error response");
        }
    };

    let host_req = host_request_from_parts(&parts, body);
    let host_resp = bridge.handle(&host_req);
    hyper_response_from(&host_resp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use portico_bridge::echo_app;

    fn echo_bridge() -> Arc<Bridge> {
        Arc::new(Bridge::new(|| Ok(echo_app())))
    }

    #[test]
    fn host_creation() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let host = HttpHost::new(addr, echo_bridge());
        assert_eq!(host.bind_addr, addr);
    }

    #[tokio::test]
    async fn host_serves_and_shuts_down() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let host = HttpHost::new(addr, echo_bridge());

        let (tx, rx) = tokio::sync::watch::channel(false);

        let server = tokio::spawn(async move { host.serve(rx).await });

        // Give it a moment to bind.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        tx.send(true).unwrap();

        let result = server.await.unwrap();
        assert!(result.is_ok());
    }

    #[test]
    fn converted_request_bridges_end_to_end() {
        // hyper::body::Incoming cannot be constructed in tests, so this
        // exercises the same path dispatch takes: convert, bridge,
        // convert back.
        let bridge = echo_bridge();
        let (parts, _) = Request::builder()
            .method("GET")
            .uri("/about")
            .body(())
            .unwrap()
            .into_parts();

        let host_req = host_request_from_parts(&parts, Bytes::new());
        let host_resp = bridge.handle(&host_req);
        assert_eq!(host_resp.status_code, 200);
        assert_eq!(host_resp.body, "GET /about");

        let resp = hyper_response_from(&host_resp);
        assert_eq!(resp.status(), 200);
    }
}
