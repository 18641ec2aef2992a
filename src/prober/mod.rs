//! Bounded-time connectivity probing.
//!
//! A probe is one outbound HTTP exchange against a target URL, classified
//! into a tri-state [`ProbeOutcome`]. The prober sits behind a trait so
//! the monitor loop can be exercised with fakes.
//!
//! # Security caveat
//!
//! [`HttpProber`] deliberately disables TLS certificate validation. The
//! question being answered is "is this endpoint reachable", not "is this
//! endpoint trustworthy": a Success outcome certifies only that a TCP/TLS
//! handshake and HTTP exchange completed, nothing about origin identity.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::debug;

/// Tri-state result of one reachability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// A connection was established and the remote end responded.
    Success,
    /// A connection attempt was made and did not succeed (refused,
    /// unreachable, or timed out).
    Failure,
    /// No meaningful attempt could be made (e.g. malformed target URL).
    Unknown,
}

/// Result of one probe: outcome plus latency and failure detail.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    /// Tri-state outcome.
    pub outcome: ProbeOutcome,
    /// Wall time the attempt took; bounded by the probe timeout.
    pub latency: Duration,
    /// Human-readable failure detail, if any.
    pub detail: Option<String>,
}

impl ProbeReport {
    fn success(latency: Duration) -> Self {
        Self {
            outcome: ProbeOutcome::Success,
            latency,
            detail: None,
        }
    }

    fn failure(latency: Duration, detail: impl Into<String>) -> Self {
        Self {
            outcome: ProbeOutcome::Failure,
            latency,
            detail: Some(detail.into()),
        }
    }

    fn unknown(latency: Duration, detail: impl Into<String>) -> Self {
        Self {
            outcome: ProbeOutcome::Unknown,
            latency,
            detail: Some(detail.into()),
        }
    }
}

/// A single bounded-time connectivity check.
///
/// Implementations must never panic on malformed input and must return
/// within `timeout` plus scheduling slack.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe `target` once. No retries.
    async fn probe(&self, target: &str, timeout: Duration) -> ProbeReport;
}

/// HTTP prober backed by a shared reqwest client.
///
/// Certificate validation is disabled by design (see module docs). Any
/// completed HTTP exchange counts as Success regardless of status code.
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    /// Build the prober. `timeout` caps every request issued through the
    /// underlying client; the same bound is enforced again per-probe with
    /// an outer timer, so neither mechanism is load-bearing alone.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    async fn exchange(&self, url: reqwest::Url) -> Result<(), reqwest::Error> {
        let response = self.client.get(url).send().await?;
        // Drain the body to confirm the remote end is actually serving,
        // not just accepting connections.
        let _ = response.bytes().await?;
        Ok(())
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, target: &str, timeout: Duration) -> ProbeReport {
        let start = Instant::now();

        let url = match reqwest::Url::parse(target) {
            Ok(url) => url,
            Err(e) => {
                return ProbeReport::unknown(start.elapsed(), format!("invalid target URL: {}", e))
            }
        };

        // The client carries its own timeout; the outer timer enforces the
        // same bound independently in case the inner one fails to trigger.
        let report = match tokio::time::timeout(timeout, self.exchange(url)).await {
            Ok(Ok(())) => ProbeReport::success(start.elapsed()),
            Ok(Err(e)) if e.is_timeout() => {
                ProbeReport::failure(start.elapsed(), format!("probe timed out: {}", e))
            }
            Ok(Err(e)) => ProbeReport::failure(start.elapsed(), format!("connect failed: {}", e)),
            Err(_) => ProbeReport::failure(
                start.elapsed(),
                format!("probe exceeded deadline of {:?}", timeout),
            ),
        };

        debug!(
            target,
            outcome = ?report.outcome,
            latency_ms = report.latency.as_millis() as u64,
            "probe finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    const PROBE_TIMEOUT: Duration = Duration::from_millis(500);

    fn prober() -> HttpProber {
        HttpProber::new(PROBE_TIMEOUT).expect("client should build")
    }

    /// Local HTTP server answering one request with a fixed response.
    async fn serve_once(listener: TcpListener) {
        if let Ok((mut stream, _)) = listener.accept().await {
            let body = "ok";
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    }

    #[tokio::test]
    async fn test_probe_success_against_local_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve_once(listener));

        let report = prober()
            .probe(&format!("http://{}/", addr), PROBE_TIMEOUT)
            .await;

        assert_eq!(report.outcome, ProbeOutcome::Success);
        assert!(report.detail.is_none());
    }

    #[tokio::test]
    async fn test_probe_connection_refused_is_failure() {
        // Bind and immediately drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let report = prober()
            .probe(&format!("http://{}/", addr), PROBE_TIMEOUT)
            .await;

        assert_eq!(report.outcome, ProbeOutcome::Failure);
        assert!(report.detail.is_some());
    }

    #[tokio::test]
    async fn test_probe_timeout_is_bounded_failure() {
        // Accepts connections but never responds.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _held = listener.accept().await;
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let start = Instant::now();
        let report = prober()
            .probe(&format!("http://{}/", addr), PROBE_TIMEOUT)
            .await;

        assert_eq!(report.outcome, ProbeOutcome::Failure);
        // timeout plus scheduling slack, never a hang
        assert!(start.elapsed() < PROBE_TIMEOUT + Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_malformed_target_is_unknown_not_failure() {
        let report = prober().probe("not a url", PROBE_TIMEOUT).await;
        assert_eq!(report.outcome, ProbeOutcome::Unknown);
        assert!(report.detail.unwrap().contains("invalid target URL"));
    }
}
