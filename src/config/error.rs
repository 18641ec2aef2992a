//! Configuration error types.

use std::fmt;

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse environment variable.
    Parse {
        key: String,
        value: String,
        error: String,
    },
    /// Missing required input.
    Missing { key: String },
    /// Invalid value for environment variable.
    Invalid { key: String, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse { key, value, error } => {
                write!(f, "failed to parse {}={:?}: {}", key, value, error)
            }
            ConfigError::Missing { key } => {
                write!(f, "missing required input: {}", key)
            }
            ConfigError::Invalid { key, message } => {
                write!(f, "invalid value for {}: {}", key, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ConfigError::Parse {
            key: "MONITOR_INTERVAL".into(),
            value: "soon".into(),
            error: "invalid duration".into(),
        };
        assert!(err.to_string().contains("MONITOR_INTERVAL"));
        assert!(err.to_string().contains("soon"));

        let err = ConfigError::Missing {
            key: "route arguments".into(),
        };
        assert!(err.to_string().contains("route arguments"));
    }
}
