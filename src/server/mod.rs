//! Internal HTTP server for the metrics and health endpoints.
//!
//! Serves `GET /metrics` (prometheus text format) and `GET /healthz`
//! (JSON; 503 until the route cache has passed its initial sync barrier).

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming as IncomingBody;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::cache::RouteCache;
use crate::observability::Metrics;

/// Health endpoint response body.
#[derive(Serialize)]
struct HealthBody {
    /// "ok" once the cache is synced, "syncing" before.
    status: &'static str,
    /// Whether the initial route listing has been applied.
    synced: bool,
    /// Routes currently mirrored from the cluster.
    routes_cached: usize,
    /// Routes in the monitored set.
    routes_monitored: usize,
    /// Seconds since the server started.
    uptime_seconds: u64,
}

/// Shared state for the internal server.
struct ServerState {
    metrics: Arc<Metrics>,
    cache: RouteCache,
    routes_monitored: usize,
    start_time: Instant,
}

/// Run the internal HTTP server until the shutdown signal flips.
pub async fn run_metrics_server(
    addr: SocketAddr,
    metrics: Arc<Metrics>,
    cache: RouteCache,
    routes_monitored: usize,
    shutdown: watch::Receiver<bool>,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "metrics server listening");
    serve(listener, metrics, cache, routes_monitored, shutdown).await;
    Ok(())
}

/// Accept loop over an already-bound listener.
async fn serve(
    listener: TcpListener,
    metrics: Arc<Metrics>,
    cache: RouteCache,
    routes_monitored: usize,
    mut shutdown: watch::Receiver<bool>,
) {
    let state = Arc::new(ServerState {
        metrics,
        cache,
        routes_monitored,
        start_time: Instant::now(),
    });

    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(error = %e, "metrics server accept failed");
                    continue;
                }
            },
            _ = shutdown.changed() => {
                info!("shutdown observed, stopping metrics server");
                return;
            }
        };

        debug!(%peer, "metrics connection accepted");
        let state = Arc::clone(&state);

        tokio::spawn(async move {
            let service = service_fn(move |req| {
                let state = Arc::clone(&state);
                async move { handle_request(req, state).await }
            });

            let io = TokioIo::new(stream);
            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                debug!(error = %e, "metrics connection error");
            }
        });
    }
}

async fn handle_request(
    req: Request<IncomingBody>,
    state: Arc<ServerState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let response = match req.uri().path() {
        "/metrics" => text_response(StatusCode::OK, state.metrics.export()),
        "/healthz" => {
            let synced = state.cache.is_synced();
            let body = HealthBody {
                status: if synced { "ok" } else { "syncing" },
                synced,
                routes_cached: state.cache.len(),
                routes_monitored: state.routes_monitored,
                uptime_seconds: state.start_time.elapsed().as_secs(),
            };
            let status = if synced {
                StatusCode::OK
            } else {
                StatusCode::SERVICE_UNAVAILABLE
            };
            json_response(status, &body)
        }
        _ => text_response(StatusCode::NOT_FOUND, "Not Found".to_string()),
    };

    Ok(response)
}

fn text_response(status: StatusCode, body: String) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; version=0.0.4")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let body = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::mpsc;
    use tokio_stream::wrappers::ReceiverStream;

    use crate::cache::RouteEvent;
    use crate::monitor::ReachabilitySink;
    use crate::route::RouteRecord;

    async fn request(addr: SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let req = format!("GET {} HTTP/1.1\r\nHost: test\r\nConnection: close\r\n\r\n", path);
        stream.write_all(req.as_bytes()).await.unwrap();
        let mut buf = String::new();
        stream.read_to_string(&mut buf).await.unwrap();
        buf
    }

    async fn start_server(
        synced: bool,
    ) -> (SocketAddr, Arc<Metrics>, watch::Sender<bool>, mpsc::Sender<RouteEvent>) {
        let (ev_tx, ev_rx) = mpsc::channel(4);
        let (stop_tx, stop_rx) = watch::channel(false);
        let (cache, _handle) = RouteCache::spawn(ReceiverStream::new(ev_rx), stop_rx.clone());

        if synced {
            ev_tx
                .send(RouteEvent::Resynced(vec![RouteRecord::new(
                    "ns",
                    "r",
                    "r.example.com",
                )]))
                .await
                .unwrap();
            cache.wait_synced(Duration::from_secs(1)).await.unwrap();
        }

        let metrics = Arc::new(Metrics::new().unwrap());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(serve(listener, Arc::clone(&metrics), cache, 2, stop_rx));

        (addr, metrics, stop_tx, ev_tx)
    }

    #[tokio::test]
    async fn test_metrics_endpoint_serves_prometheus_text() {
        let (addr, metrics, _stop, _ev) = start_server(true).await;
        metrics.set_reachable("ns/r");

        let body = request(addr, "/metrics").await;
        assert!(body.contains("200 OK"));
        assert!(body.contains("routewatch_route_reachable{name=\"ns/r\"} 1"));
    }

    #[tokio::test]
    async fn test_healthz_ok_when_synced() {
        let (addr, _metrics, _stop, _ev) = start_server(true).await;

        let body = request(addr, "/healthz").await;
        assert!(body.contains("200 OK"));
        assert!(body.contains("\"status\":\"ok\""));
        assert!(body.contains("\"routes_cached\":1"));
        assert!(body.contains("\"routes_monitored\":2"));
    }

    #[tokio::test]
    async fn test_healthz_unavailable_before_sync() {
        let (addr, _metrics, _stop, _ev) = start_server(false).await;

        let body = request(addr, "/healthz").await;
        assert!(body.contains("503"));
        assert!(body.contains("\"synced\":false"));
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let (addr, _metrics, _stop, _ev) = start_server(true).await;

        let body = request(addr, "/nope").await;
        assert!(body.contains("404"));
    }
}
