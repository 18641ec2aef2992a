//! The monitoring loop: cache lookup, resolution, probing, classification,
//! metric emission.
//!
//! Per-route failures never escape a cycle. A lookup miss, an unresolvable
//! record or a failed probe each collapse into a [`ReachabilityState`] and
//! are published through the injected [`ReachabilitySink`]; the loop itself
//! only ends on the process-wide shutdown signal.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::cache::RouteCache;
use crate::config::MonitorConfig;
use crate::prober::{ProbeOutcome, Prober};
use crate::resolver;
use crate::route::RouteKey;

/// Per-route last-known classification, published as a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReachabilityState {
    /// The route answered a probe.
    Reachable,
    /// A probe was attempted and did not succeed.
    Unreachable,
    /// Reachability could not be determined: the route is missing from
    /// the cache, has no host, or the probe target was malformed.
    Unknown,
}

impl fmt::Display for ReachabilityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reachable => write!(f, "reachable"),
            Self::Unreachable => write!(f, "unreachable"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Map a cache lookup outcome and a probe outcome to a reachability state.
///
/// This table is the entire classification policy:
///
/// | found | probe    | state       |
/// |-------|----------|-------------|
/// | false | any      | Unknown     |
/// | true  | Success  | Reachable   |
/// | true  | Failure  | Unreachable |
/// | true  | Unknown  | Unknown     |
pub fn classify(found: bool, outcome: ProbeOutcome) -> ReachabilityState {
    if !found {
        return ReachabilityState::Unknown;
    }
    match outcome {
        ProbeOutcome::Success => ReachabilityState::Reachable,
        ProbeOutcome::Failure => ReachabilityState::Unreachable,
        ProbeOutcome::Unknown => ReachabilityState::Unknown,
    }
}

/// Where per-route reachability states are published.
///
/// Each `set_*` call idempotently overwrites the previous state for that
/// route name. Injected into the monitor so tests can substitute a
/// recording double for the prometheus-backed implementation.
pub trait ReachabilitySink: Send + Sync {
    /// Publish Reachable for `name`.
    fn set_reachable(&self, name: &str);
    /// Publish Unreachable for `name`.
    fn set_unreachable(&self, name: &str);
    /// Publish Unknown for `name`.
    fn set_unknown(&self, name: &str);
    /// Record probe latency for `name`. Optional; defaults to a no-op.
    fn observe_probe(&self, name: &str, seconds: f64) {
        let _ = (name, seconds);
    }
}

/// Drives the periodic probing cycle over a fixed, ordered route list.
pub struct Monitor<P, S> {
    cache: RouteCache,
    routes: Vec<RouteKey>,
    prober: P,
    sink: Arc<S>,
    config: MonitorConfig,
}

impl<P, S> Monitor<P, S>
where
    P: Prober,
    S: ReachabilitySink,
{
    /// Build a monitor over `routes`, in the order supplied.
    pub fn new(
        cache: RouteCache,
        routes: Vec<RouteKey>,
        prober: P,
        sink: Arc<S>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            cache,
            routes,
            prober,
            sink,
            config,
        }
    }

    /// Cycle until the shutdown signal flips.
    ///
    /// Cycles never overlap: the interval sleep starts after a cycle
    /// completes. On shutdown the loop exits without draining in-flight
    /// probes; every probe is independently timeout-bounded.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(routes = self.routes.len(), "starting monitor loop");

        loop {
            self.run_cycle().await;

            tokio::select! {
                _ = tokio::time::sleep(self.config.interval) => {}
                _ = shutdown.changed() => {
                    info!("shutdown observed, stopping monitor loop");
                    break;
                }
            }
        }
    }

    /// Run one probing cycle over every configured route, in order.
    pub async fn run_cycle(&self) {
        for (i, key) in self.routes.iter().enumerate() {
            debug!(
                route = %key,
                progress = %format!("{}/{}", i + 1, self.routes.len()),
                "verifying route connectivity"
            );
            let state = self.check_route(key).await;
            self.emit(key, state);
        }
    }

    /// Determine the current state of one route. All errors are absorbed
    /// here; this never fails.
    async fn check_route(&self, key: &RouteKey) -> ReachabilityState {
        let Some(record) = self.cache.get(key) else {
            debug!(route = %key, "route not in cache");
            return classify(false, ProbeOutcome::Unknown);
        };

        let url = match resolver::resolve(&record, self.config.scheme) {
            Ok(url) => url,
            Err(e) => {
                // Not probed: an unresolvable record is Unknown, never
                // Unreachable.
                debug!(route = %key, error = %e, "route not resolvable");
                return classify(true, ProbeOutcome::Unknown);
            }
        };

        let report = self
            .prober
            .probe(url.as_str(), self.config.probe_timeout)
            .await;

        if let Some(detail) = &report.detail {
            warn!(route = %key, url = %url, detail, "probe did not succeed");
        }
        self.sink
            .observe_probe(&key.to_string(), report.latency.as_secs_f64());

        classify(true, report.outcome)
    }

    fn emit(&self, key: &RouteKey, state: ReachabilityState) {
        let name = key.to_string();
        match state {
            ReachabilityState::Reachable => {
                info!(route = %name, "route is reachable");
                self.sink.set_reachable(&name);
            }
            ReachabilityState::Unreachable => {
                info!(route = %name, "route is unreachable");
                self.sink.set_unreachable(&name);
            }
            ReachabilityState::Unknown => {
                info!(route = %name, "route reachability is unknown");
                self.sink.set_unknown(&name);
            }
        }
    }
}
