//! routewatch binary: bootstrap and task wiring.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};

use routewatch::cache::kube::KubeRouteSource;
use routewatch::cache::RouteCache;
use routewatch::config::{routes_from_args, Config};
use routewatch::monitor::Monitor;
use routewatch::observability::Metrics;
use routewatch::prober::HttpProber;
use routewatch::server::run_metrics_server;

fn main() -> std::process::ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {}", e);
            return std::process::ExitCode::FAILURE;
        }
    };

    routewatch::logging::init(&config.logging);

    let routes = match routes_from_args(std::env::args().skip(1)) {
        Ok(routes) => routes,
        Err(e) => {
            error!("usage: routewatch <namespace/name> [namespace/name ...]");
            error!("{}", e);
            return std::process::ExitCode::FAILURE;
        }
    };

    info!("starting routewatch {}", routewatch::PKG_VERSION);
    config.log_summary(&routes);

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("failed to build runtime: {}", e);
            return std::process::ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(config, routes)) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!("fatal: {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run(
    config: Config,
    routes: Vec<routewatch::route::RouteKey>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Cluster watch feeds the cache; sync barrier gates everything else.
    let client = kube::Client::try_default().await?;
    let source = KubeRouteSource::new(client);
    let (cache, cache_task) = RouteCache::spawn(source.events(), shutdown_rx.clone());

    info!("waiting for initial route listing");
    cache.wait_synced(config.monitor.sync_timeout).await?;
    info!(routes = cache.len(), "route cache synced");

    let metrics = Arc::new(Metrics::new()?);
    let prober = HttpProber::new(config.monitor.probe_timeout)?;

    let monitor = Monitor::new(
        cache.clone(),
        routes.clone(),
        prober,
        Arc::clone(&metrics),
        config.monitor.clone(),
    );
    let monitor_task = tokio::spawn(monitor.run(shutdown_rx.clone()));

    let mut server_task = tokio::spawn(run_metrics_server(
        config.server.listen_addr,
        Arc::clone(&metrics),
        cache,
        routes.len(),
        shutdown_rx,
    ));

    tokio::select! {
        result = &mut server_task => {
            let _ = shutdown_tx.send(true);
            let _ = monitor_task.await;
            let _ = cache_task.await;
            return match result {
                Ok(Err(e)) => Err(e.into()),
                _ => Err("metrics server stopped unexpectedly".into()),
            };
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    let _ = shutdown_tx.send(true);

    // Each task observes shutdown within one tick or one network timeout;
    // in-flight probes are not drained.
    let _ = monitor_task.await;
    let _ = cache_task.await;
    let _ = server_task.await;
    Ok(())
}
