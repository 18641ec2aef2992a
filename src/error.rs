//! Crate error types.

use std::fmt;

/// Errors surfaced outside a single monitoring cycle.
///
/// Per-route failures (lookup misses, probe failures) never appear here:
/// the monitor absorbs them into a reachability state. Only startup-time
/// failures are fatal.
#[derive(Debug)]
pub enum Error {
    /// Initial cache population did not complete in time.
    SyncTimeout { waited: std::time::Duration },

    /// A route record lacks the information needed to build a target URL.
    UnresolvableRoute { route: String, reason: String },

    /// Malformed `namespace/name` route key.
    InvalidRouteKey(String),

    /// Kubernetes client error.
    Kube(kube::Error),

    /// I/O error.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SyncTimeout { waited } => {
                write!(f, "cache sync timed out after {:?}", waited)
            }
            Error::UnresolvableRoute { route, reason } => {
                write!(f, "route {} is not resolvable: {}", route, reason)
            }
            Error::InvalidRouteKey(key) => {
                write!(f, "invalid route key {:?}, expected namespace/name", key)
            }
            Error::Kube(e) => write!(f, "kubernetes client error: {}", e),
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Kube(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<kube::Error> for Error {
    fn from(e: kube::Error) -> Self {
        Error::Kube(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

/// Result type alias for crate operations.
pub type Result<T> = std::result::Result<T, Error>;
