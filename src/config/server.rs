//! Metrics server configuration.

use std::net::SocketAddr;

use super::parse::env_or;
use super::ConfigError;

/// Metrics/health endpoint configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address for /metrics and /healthz (default: 0.0.0.0:8000).
    pub listen_addr: SocketAddr,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = env_or("LISTEN_ADDR", "0.0.0.0:8000");
        let listen_addr: SocketAddr = raw.parse().map_err(|e| ConfigError::Parse {
            key: "LISTEN_ADDR".into(),
            value: raw.clone(),
            error: format!("{}", e),
        })?;

        Ok(Self { listen_addr })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_listen_addr() {
        std::env::remove_var("LISTEN_ADDR");
        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:8000".parse().unwrap());
    }
}
