//! Error types for the Portico bridge.

use thiserror::Error;

/// Result type alias for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors that can occur while bridging a host request.
///
/// None of these ever reach the host platform as an unhandled fault;
/// the bridge's outer boundary converts every one of them into a
/// status-500 plain-text response.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The wrapped application failed to construct on first use.
    /// Cached for the process lifetime.
    #[error("application failed to initialize: {0}")]
    Init(String),

    /// The wrapped application returned an error while handling the
    /// request.
    #[error("application error: {0}")]
    App(String),

    /// The response callback was misused (never invoked, invoked more
    /// than once, or handed an unparseable status line).
    #[error("invalid response capture: {0}")]
    Capture(String),
}
