//! Informer-style local mirror of cluster route state.
//!
//! The [`RouteCache`] consumes a stream of [`RouteEvent`]s produced by a
//! watch subscription (see [`kube::KubeRouteSource`]) and keeps a local map
//! of [`RouteRecord`]s. Lookups never touch the network: they answer from
//! the mirror, which may be stale by up to one resync interval. Callers
//! always receive clones, so concurrent reads can never observe a
//! half-applied event.
//!
//! Watch reconnects are invisible to lookup callers. Each full relist
//! arrives as a single [`RouteEvent::Resynced`] snapshot that replaces the
//! mirror wholesale, which both bounds staleness and discards deletions a
//! dropped watch may have missed.

pub mod kube;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::route::{RouteKey, RouteRecord};

/// One change to the mirrored route set.
#[derive(Debug, Clone)]
pub enum RouteEvent {
    /// A route was added or updated.
    Applied(RouteRecord),
    /// A route was deleted.
    Deleted(RouteKey),
    /// A full relist snapshot; replaces the entire mirror.
    Resynced(Vec<RouteRecord>),
}

type Store = Arc<RwLock<HashMap<RouteKey, RouteRecord>>>;

/// Locally held, eventually-consistent mirror of cluster routes.
///
/// Cheap to clone; all clones share the same underlying store.
#[derive(Clone)]
pub struct RouteCache {
    store: Store,
    synced: watch::Receiver<bool>,
}

impl RouteCache {
    /// Start the cache over an event stream.
    ///
    /// Spawns the apply task and returns the cache handle plus the task's
    /// join handle. The cache reports unsynced until the first
    /// [`RouteEvent::Resynced`] has been applied; use [`wait_synced`] as
    /// the startup barrier.
    ///
    /// The apply task exits when the event stream ends or the shutdown
    /// signal flips.
    ///
    /// [`wait_synced`]: RouteCache::wait_synced
    pub fn spawn<S>(events: S, shutdown: watch::Receiver<bool>) -> (Self, JoinHandle<()>)
    where
        S: Stream<Item = RouteEvent> + Send + 'static,
    {
        let store: Store = Arc::new(RwLock::new(HashMap::new()));
        let (synced_tx, synced_rx) = watch::channel(false);

        let handle = tokio::spawn(apply_loop(Arc::clone(&store), synced_tx, events, shutdown));

        (
            Self {
                store,
                synced: synced_rx,
            },
            handle,
        )
    }

    /// Block until the initial full listing has been applied.
    ///
    /// Fails with [`Error::SyncTimeout`] if the barrier is not reached in
    /// time, or if the event stream ends first.
    pub async fn wait_synced(&self, timeout: Duration) -> Result<(), Error> {
        let mut synced = self.synced.clone();
        let result = match tokio::time::timeout(timeout, synced.wait_for(|s| *s)).await {
            Ok(Ok(_)) => Ok(()),
            // Err(RecvError): the apply task is gone without ever syncing.
            Ok(Err(_)) | Err(_) => Err(Error::SyncTimeout { waited: timeout }),
        };
        result
    }

    /// Whether the initial sync barrier has been passed.
    pub fn is_synced(&self) -> bool {
        *self.synced.borrow()
    }

    /// Point lookup by key. Never performs I/O; answers from the local
    /// mirror even if momentarily stale. Returns a defensive copy.
    pub fn get(&self, key: &RouteKey) -> Option<RouteRecord> {
        self.store
            .read()
            .expect("route store poisoned")
            .get(key)
            .cloned()
    }

    /// Snapshot of all currently known records, unordered.
    pub fn list(&self) -> Vec<RouteRecord> {
        self.store
            .read()
            .expect("route store poisoned")
            .values()
            .cloned()
            .collect()
    }

    /// Number of currently known records.
    pub fn len(&self) -> usize {
        self.store.read().expect("route store poisoned").len()
    }

    /// Whether the mirror holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Apply events to the store serially until the stream ends or shutdown.
///
/// Lock guards are scoped so no guard is ever held across an await.
async fn apply_loop<S>(
    store: Store,
    synced: watch::Sender<bool>,
    events: S,
    mut shutdown: watch::Receiver<bool>,
) where
    S: Stream<Item = RouteEvent> + Send + 'static,
{
    futures_util::pin_mut!(events);

    loop {
        let event = tokio::select! {
            event = events.next() => match event {
                Some(event) => event,
                None => {
                    info!("route event stream ended, stopping cache");
                    break;
                }
            },
            _ = shutdown.changed() => {
                debug!("shutdown observed, stopping cache");
                break;
            }
        };

        match event {
            RouteEvent::Applied(record) => {
                debug!(route = %record, host = %record.host, "route applied");
                store
                    .write()
                    .expect("route store poisoned")
                    .insert(record.key(), record);
            }
            RouteEvent::Deleted(key) => {
                debug!(route = %key, "route deleted");
                store.write().expect("route store poisoned").remove(&key);
            }
            RouteEvent::Resynced(records) => {
                let fresh: HashMap<RouteKey, RouteRecord> =
                    records.into_iter().map(|r| (r.key(), r)).collect();
                let count = fresh.len();
                *store.write().expect("route store poisoned") = fresh;
                if !*synced.borrow() {
                    info!(routes = count, "initial route listing applied");
                } else {
                    debug!(routes = count, "route mirror resynced");
                }
                synced.send_replace(true);
            }
        }
    }

    // Late wait_synced callers must fail instead of hanging; dropping the
    // sender wakes them with a recv error.
    if !*synced.borrow() {
        warn!("cache stopped before initial sync completed");
    }
}
