pub mod config;
pub mod error;
pub mod types;

pub use config::PorticoConfig;
pub use error::{BridgeError, BridgeResult};
pub use types::*;
