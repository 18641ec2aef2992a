//! Monitoring loop configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::parse::{env_duration, env_or};
use super::ConfigError;

/// Scheme used for every resolved probe target.
///
/// This is a fixed policy, not inferred per-record: route objects carry no
/// reliable TLS indicator at the level this tool consumes them, so the
/// scheme is an explicit operator choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteScheme {
    /// Probe over HTTPS (default).
    #[default]
    Https,
    /// Probe over plain HTTP.
    Http,
}

impl fmt::Display for RouteScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Https => write!(f, "https"),
            Self::Http => write!(f, "http"),
        }
    }
}

impl FromStr for RouteScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "https" => Ok(Self::Https),
            "http" => Ok(Self::Http),
            other => Err(format!("expected \"https\" or \"http\", got {:?}", other)),
        }
    }
}

/// Monitoring loop configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Sleep between probing cycles (default: 1s).
    pub interval: Duration,
    /// Per-probe network timeout (default: 5s).
    pub probe_timeout: Duration,
    /// How long to wait for the initial cache sync (default: 30s).
    pub sync_timeout: Duration,
    /// Scheme for resolved probe targets (default: https).
    pub scheme: RouteScheme,
}

impl MonitorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let scheme_raw = env_or("ROUTE_SCHEME", "https");
        let scheme = scheme_raw
            .parse::<RouteScheme>()
            .map_err(|e| ConfigError::Parse {
                key: "ROUTE_SCHEME".into(),
                value: scheme_raw,
                error: e,
            })?;

        Ok(Self {
            interval: env_duration("MONITOR_INTERVAL", "1s")?,
            probe_timeout: env_duration("PROBE_TIMEOUT", "5s")?,
            sync_timeout: env_duration("SYNC_TIMEOUT", "30s")?,
            scheme,
        })
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            probe_timeout: Duration::from_secs(5),
            sync_timeout: Duration::from_secs(30),
            scheme: RouteScheme::Https,
        }
    }
}
