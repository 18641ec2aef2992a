//! routewatch - live reachability monitoring for cluster routes.
//!
//! Watches a set of Kubernetes `Route` objects (identified by
//! `namespace/name`), keeps a local informer-style mirror of their state,
//! periodically probes each route's host over HTTP(S), and publishes the
//! resulting tri-state classification (Reachable / Unreachable / Unknown)
//! as prometheus metrics.
//!
//! # Architecture
//!
//! ```text
//! cluster watch ──▶ RouteCache (local mirror, sync barrier)
//!                        │ get / list
//!                        ▼
//!                  Monitor loop ──▶ resolve ──▶ probe ──▶ classify
//!                        │
//!                        ▼
//!                  Metrics (prometheus) ◀── /metrics, /healthz
//! ```
//!
//! The cache is fed asynchronously by the watch subscription; the monitor
//! loop only reads from it. Per-route failures (missing route, hostless
//! route, failed probe) are absorbed into the published state and never
//! abort the loop.
//!
//! # Security caveat
//!
//! Probing deliberately skips TLS certificate validation: "Reachable"
//! certifies only that a TCP/TLS handshake and HTTP exchange completed,
//! not that the certificate or origin identity is trustworthy.

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod observability;
pub mod prober;
pub mod resolver;
pub mod route;
pub mod server;

// Re-exports for convenience
pub use cache::{RouteCache, RouteEvent};
pub use config::Config;
pub use error::Error;
pub use monitor::{classify, Monitor, ReachabilitySink, ReachabilityState};
pub use observability::Metrics;
pub use prober::{HttpProber, ProbeOutcome, ProbeReport, Prober};
pub use route::{RouteKey, RouteRecord};
