//! Route resolution: cache record to probe target URL.
//!
//! The scheme is a declared policy ([`RouteScheme`], https unless
//! configured otherwise), never inferred from the record. Resolution is
//! deterministic and stateless.

use url::Url;

use crate::config::RouteScheme;
use crate::error::Error;
use crate::route::RouteRecord;

/// Build the probe target URL for a route record.
///
/// Fails with [`Error::UnresolvableRoute`] when the record has no host
/// (the cluster has not admitted the route yet) or when the host does not
/// form a valid URL.
pub fn resolve(record: &RouteRecord, scheme: RouteScheme) -> Result<Url, Error> {
    if record.host.is_empty() {
        return Err(Error::UnresolvableRoute {
            route: record.to_string(),
            reason: "empty host".to_string(),
        });
    }

    let raw = format!("{}://{}", scheme, record.host);
    Url::parse(&raw).map_err(|e| Error::UnresolvableRoute {
        route: record.to_string(),
        reason: format!("invalid host {:?}: {}", record.host, e),
    })
}
