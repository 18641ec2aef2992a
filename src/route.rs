//! Route identity and record types.
//!
//! A route is identified by its `namespace/name` key everywhere: cache
//! lookups, CLI input, metric labels.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Identity of a route: `namespace/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    /// Namespace the route lives in.
    pub namespace: String,
    /// Route name, unique within its namespace.
    pub name: String,
}

impl RouteKey {
    /// Create a key from namespace and name.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

impl FromStr for RouteKey {
    type Err = Error;

    /// Parse a `namespace/name` key. Both parts must be non-empty and the
    /// separator must appear exactly once.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((namespace, name))
                if !namespace.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(namespace, name))
            }
            _ => Err(Error::InvalidRouteKey(s.to_string())),
        }
    }
}

/// A cluster route at a point in time.
///
/// Records are created, updated and removed solely by the watch event
/// stream; every other component only reads them. A record whose `host` is
/// empty has not been admitted by the cluster yet and cannot be resolved
/// into a probe target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    /// Namespace the route lives in.
    pub namespace: String,
    /// Route name.
    pub name: String,
    /// DNS host the route exposes; may be empty.
    pub host: String,
}

impl RouteRecord {
    /// Create a record.
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            host: host.into(),
        }
    }

    /// Identity key of this record.
    pub fn key(&self) -> RouteKey {
        RouteKey::new(self.namespace.clone(), self.name.clone())
    }
}

impl fmt::Display for RouteRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_parse() {
        let key: RouteKey = "openshift-console/console".parse().unwrap();
        assert_eq!(key.namespace, "openshift-console");
        assert_eq!(key.name, "console");
        assert_eq!(key.to_string(), "openshift-console/console");
    }

    #[test]
    fn test_key_parse_rejects_malformed() {
        for bad in ["", "no-slash", "/name", "ns/", "a/b/c"] {
            assert!(bad.parse::<RouteKey>().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_record_key() {
        let record = RouteRecord::new("ns1", "r1", "r1.example.com");
        assert_eq!(record.key(), RouteKey::new("ns1", "r1"));
        assert_eq!(record.to_string(), "ns1/r1");
    }
}
