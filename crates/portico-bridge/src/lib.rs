//! portico-bridge — the serverless gateway-interface bridge.
//!
//! Translates a host platform's request object into the synchronous
//! calling convention expected by a wrapped web application, invokes
//! the application, and translates its answer back into the response
//! shape the host expects.
//!
//! # Architecture
//!
//! ```text
//! host request object
//!   │
//!   ▼
//! normalize (defaulted canonical form)
//!   │
//!   ▼
//! Environ::build (fixed protocol keys + HTTP_* headers)
//!   │
//!   ├── GatewayApp::call(environ, start_response)
//!   ├── collect body chunks, lossy UTF-8 decode
//!   │
//!   ▼
//! HostResponse { status, headers, body }
//! ```
//!
//! Every failure path is contained: the bridge always returns a
//! well-formed response, downgrading faults to a 500 diagnostic body.
//! The wrapped application is constructed lazily on the first request
//! and the outcome (success or failure) is cached for the process
//! lifetime.

pub mod app;
pub mod bridge;
pub mod environ;
pub mod normalize;
pub mod slot;

pub use app::{BodyChunks, GatewayApp, ResponseCapture, StartResponse, echo_app};
pub use bridge::Bridge;
pub use environ::Environ;
pub use normalize::normalize;
pub use slot::{AppSlot, SlotState};
