//! Prometheus metrics for routewatch.
//!
//! The [`Metrics`] struct owns its own [`Registry`] and is constructed
//! explicitly at startup, then injected wherever state is published.
//! There is no module-level registration, so tests can build isolated
//! instances without label collisions.

use prometheus::{
    CounterVec, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};

use crate::monitor::ReachabilitySink;

/// Prometheus metrics registry with all application metrics.
pub struct Metrics {
    registry: Registry,

    /// Per-route reachability: 1 reachable, 0 otherwise.
    pub route_reachable: GaugeVec,

    /// Per-route unknown flag: 1 when reachability could not be
    /// determined, 0 otherwise.
    pub route_unknown: GaugeVec,

    /// Per-route check tally by resulting state.
    pub route_checks_total: CounterVec,

    /// Probe latency in seconds.
    pub probe_duration_seconds: HistogramVec,
}

impl Metrics {
    /// Create a new metrics registry with all metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // Probe latency buckets (in seconds); probes are capped by the
        // probe timeout, so the top bucket sits just above the default 5s.
        let probe_buckets = vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 7.5];

        let route_reachable = GaugeVec::new(
            Opts::new(
                "routewatch_route_reachable",
                "Whether the route answered its last probe (1 reachable, 0 otherwise)",
            ),
            &["name"],
        )?;
        registry.register(Box::new(route_reachable.clone()))?;

        let route_unknown = GaugeVec::new(
            Opts::new(
                "routewatch_route_unknown",
                "Whether the route's reachability could not be determined (1 unknown, 0 otherwise)",
            ),
            &["name"],
        )?;
        registry.register(Box::new(route_unknown.clone()))?;

        let route_checks_total = CounterVec::new(
            Opts::new(
                "routewatch_route_checks_total",
                "Reachability checks by route and resulting state",
            ),
            &["name", "state"],
        )?;
        registry.register(Box::new(route_checks_total.clone()))?;

        let probe_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "routewatch_probe_duration_seconds",
                "Probe latency in seconds",
            )
            .buckets(probe_buckets),
            &["name"],
        )?;
        registry.register(Box::new(probe_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            route_reachable,
            route_unknown,
            route_checks_total,
            probe_duration_seconds,
        })
    }

    /// Export metrics in Prometheus text format.
    pub fn export(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    /// Get the Prometheus registry (for custom metrics).
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl ReachabilitySink for Metrics {
    fn set_reachable(&self, name: &str) {
        self.route_reachable.with_label_values(&[name]).set(1.0);
        self.route_unknown.with_label_values(&[name]).set(0.0);
        self.route_checks_total
            .with_label_values(&[name, "reachable"])
            .inc();
    }

    fn set_unreachable(&self, name: &str) {
        self.route_reachable.with_label_values(&[name]).set(0.0);
        self.route_unknown.with_label_values(&[name]).set(0.0);
        self.route_checks_total
            .with_label_values(&[name, "unreachable"])
            .inc();
    }

    fn set_unknown(&self, name: &str) {
        self.route_reachable.with_label_values(&[name]).set(0.0);
        self.route_unknown.with_label_values(&[name]).set(1.0);
        self.route_checks_total
            .with_label_values(&[name, "unknown"])
            .inc();
    }

    fn observe_probe(&self, name: &str, seconds: f64) {
        self.probe_duration_seconds
            .with_label_values(&[name])
            .observe(seconds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().expect("Should create metrics");
        metrics.set_unknown("ns/r");
        assert!(metrics.export().contains("# HELP"));
    }

    #[test]
    fn test_set_reachable_overwrites_unknown() {
        let metrics = Metrics::new().expect("Should create metrics");

        metrics.set_unknown("ns/console");
        metrics.set_reachable("ns/console");

        let output = metrics.export();
        assert!(output.contains("routewatch_route_reachable{name=\"ns/console\"} 1"));
        assert!(output.contains("routewatch_route_unknown{name=\"ns/console\"} 0"));
    }

    #[test]
    fn test_set_unreachable_is_zero_not_unknown() {
        let metrics = Metrics::new().expect("Should create metrics");
        metrics.set_unreachable("ns/console");

        let output = metrics.export();
        assert!(output.contains("routewatch_route_reachable{name=\"ns/console\"} 0"));
        assert!(output.contains("routewatch_route_unknown{name=\"ns/console\"} 0"));
        assert!(output.contains("state=\"unreachable\""));
    }

    #[test]
    fn test_probe_duration_observed() {
        let metrics = Metrics::new().expect("Should create metrics");
        metrics.observe_probe("ns/console", 0.042);

        let output = metrics.export();
        assert!(output.contains("routewatch_probe_duration_seconds"));
    }

    #[test]
    fn test_instances_are_isolated() {
        let a = Metrics::new().expect("Should create metrics");
        let b = Metrics::new().expect("Should create metrics");

        a.set_reachable("ns/only-in-a");
        assert!(!b.export().contains("only-in-a"));
    }
}
