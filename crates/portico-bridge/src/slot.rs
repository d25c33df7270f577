//! Process-wide application slot with at-most-once initialization.
//!
//! The wrapped application is expensive to construct, so it is built
//! lazily on the first request and reused for the process lifetime.
//! A construction failure is cached the same way: every later request
//! observes the same error until the process restarts. There is no
//! retry and no transition back to uninitialized.

use std::sync::{Arc, OnceLock};

use portico_core::error::BridgeError;

use crate::app::GatewayApp;

/// Observable state of the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Uninitialized,
    Ready,
    Failed,
}

/// Write-once holder for the wrapped application.
#[derive(Default)]
pub struct AppSlot {
    cell: OnceLock<Result<Arc<dyn GatewayApp>, String>>,
}

impl AppSlot {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Return the application, running `factory` at most once per
    /// process. Both outcomes are cached; a cached failure is returned
    /// as `BridgeError::Init` without re-running the factory.
    pub fn get_or_init<F>(&self, factory: F) -> Result<Arc<dyn GatewayApp>, BridgeError>
    where
        F: FnOnce() -> anyhow::Result<Arc<dyn GatewayApp>>,
    {
        let outcome = self
            .cell
            .get_or_init(|| factory().map_err(|e| format!("{e:?}")));
        match outcome {
            Ok(app) => Ok(app.clone()),
            Err(message) => Err(BridgeError::Init(message.clone())),
        }
    }

    pub fn state(&self) -> SlotState {
        match self.cell.get() {
            None => SlotState::Uninitialized,
            Some(Ok(_)) => SlotState::Ready,
            Some(Err(_)) => SlotState::Failed,
        }
    }
}
