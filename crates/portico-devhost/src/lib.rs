//! portico-devhost — a local stand-in for the serverless host platform.
//!
//! Runs a plain hyper HTTP/1 server that converts each inbound request
//! into the host request object shape, drives it through the bridge,
//! and writes the bridge's response triple back to the socket. Useful
//! for exercising a wrapped application without deploying it.
//!
//! ```text
//! HTTP client
//!   │
//!   ▼
//! hyper server
//!   │
//!   ├── Convert hyper::Request → HostRequest
//!   ├── Bridge::handle (never fails)
//!   ├── Convert HostResponse → hyper::Response
//!   │
//!   ▼
//! HTTP response
//! ```

pub mod convert;
pub mod host;

pub use host::HttpHost;
