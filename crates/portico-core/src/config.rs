//! portico.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::types::GatewayDefaults;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PorticoConfig {
    pub host: Option<HostConfig>,
    pub gateway: Option<GatewayConfig>,
    /// Free-form strings handed to the application factory.
    pub env: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    pub bind: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub server_name: Option<String>,
    pub server_port: Option<String>,
    pub url_scheme: Option<String>,
}

impl PorticoConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PorticoConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Gateway defaults with any configured overrides applied.
    pub fn gateway_defaults(&self) -> GatewayDefaults {
        let mut defaults = GatewayDefaults::default();
        if let Some(gateway) = &self.gateway {
            if let Some(name) = &gateway.server_name {
                defaults.server_name = name.clone();
            }
            if let Some(port) = &gateway.server_port {
                defaults.server_port = port.clone();
            }
            if let Some(scheme) = &gateway.url_scheme {
                defaults.url_scheme = scheme.clone();
            }
        }
        defaults
    }

    /// Scaffold a minimal portico.toml.
    pub fn scaffold(bind: &str) -> Self {
        PorticoConfig {
            host: Some(HostConfig {
                bind: Some(bind.to_string()),
            }),
            gateway: Some(GatewayConfig::default()),
            env: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaffold_round_trips() {
        let config = PorticoConfig::scaffold("127.0.0.1:3333");
        let toml_str = config.to_toml_string().unwrap();
        let parsed: PorticoConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(
            parsed.host.unwrap().bind.as_deref(),
            Some("127.0.0.1:3333")
        );
    }

    #[test]
    fn parse_minimal() {
        let config: PorticoConfig = toml::from_str("").unwrap();
        assert!(config.host.is_none());
        let defaults = config.gateway_defaults();
        assert_eq!(defaults.server_name, "localhost");
        assert_eq!(defaults.server_port, "80");
        assert_eq!(defaults.url_scheme, "https");
    }

    #[test]
    fn gateway_overrides_apply() {
        let toml_str = r#"
[gateway]
url_scheme = "http"
server_port = "8080"
"#;
        let config: PorticoConfig = toml::from_str(toml_str).unwrap();
        let defaults = config.gateway_defaults();
        assert_eq!(defaults.url_scheme, "http");
        assert_eq!(defaults.server_port, "8080");
        assert_eq!(defaults.server_name, "localhost");
    }
}
