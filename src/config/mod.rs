//! Configuration module for routewatch.
//!
//! Centralized configuration loading from environment variables, plus the
//! one non-environment input: the ordered list of `namespace/name` route
//! keys to monitor, taken from CLI arguments.
//!
//! # Example
//!
//! ```rust,ignore
//! use routewatch::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("Listen address: {}", config.server.listen_addr);
//! println!("Probe interval: {:?}", config.monitor.interval);
//! ```

mod error;
mod logging;
mod monitor;
mod parse;
mod server;

pub use error::ConfigError;
pub use logging::LoggingConfig;
pub use monitor::{MonitorConfig, RouteScheme};
pub use server::ServerConfig;

use crate::route::RouteKey;

/// Complete application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Monitoring loop configuration.
    pub monitor: MonitorConfig,
    /// Metrics server configuration.
    pub server: ServerConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            monitor: MonitorConfig::from_env()?,
            server: ServerConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self, routes: &[RouteKey]) {
        use tracing::info;

        info!("Configuration loaded:");
        info!("  Listen: {}", self.server.listen_addr);
        info!("  Monitor interval: {:?}", self.monitor.interval);
        info!("  Probe timeout: {:?}", self.monitor.probe_timeout);
        info!("  Sync timeout: {:?}", self.monitor.sync_timeout);
        info!("  Route scheme: {}", self.monitor.scheme);
        info!("  Monitored routes: {}", routes.len());
        for route in routes {
            info!("    {}", route);
        }
    }
}

/// Parse the monitored route list from CLI arguments.
///
/// Order is preserved; it determines metric-emission order within a cycle.
pub fn routes_from_args<I>(args: I) -> Result<Vec<RouteKey>, ConfigError>
where
    I: IntoIterator<Item = String>,
{
    let routes = args
        .into_iter()
        .map(|arg| {
            arg.parse::<RouteKey>().map_err(|_| ConfigError::Invalid {
                key: "route argument".into(),
                message: format!("{:?} is not a namespace/name key", arg),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if routes.is_empty() {
        return Err(ConfigError::Missing {
            key: "route arguments (namespace/name ...)".into(),
        });
    }

    Ok(routes)
}
