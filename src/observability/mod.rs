//! Observability: prometheus metrics for route reachability.

mod metrics;

pub use metrics::Metrics;
