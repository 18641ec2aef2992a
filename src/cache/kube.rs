//! Cluster watch subscription for route objects.
//!
//! Routes (`route.openshift.io/v1 Route`) are a CRD, so they are consumed
//! as [`DynamicObject`]s rather than typed resources; the host lives at
//! `spec.host` in the unstructured payload. The kube watcher handles
//! reconnects with backoff and replays a full relist after a desync; those
//! relist pages are folded into a single [`RouteEvent::Resynced`] snapshot.

use futures_util::{future, Stream, StreamExt};
use kube::api::{Api, ApiResource, DynamicObject, GroupVersionKind};
use kube::runtime::{watcher, WatchStreamExt};
use kube::Client;
use tracing::{debug, warn};

use super::RouteEvent;
use crate::route::{RouteKey, RouteRecord};

/// Group/version/kind of the watched route resource.
const ROUTE_GROUP: &str = "route.openshift.io";
const ROUTE_VERSION: &str = "v1";
const ROUTE_KIND: &str = "Route";

/// Watch-capable source of route objects across all namespaces.
pub struct KubeRouteSource {
    api: Api<DynamicObject>,
}

impl KubeRouteSource {
    /// Create a source watching routes in all namespaces.
    pub fn new(client: Client) -> Self {
        let gvk = GroupVersionKind::gvk(ROUTE_GROUP, ROUTE_VERSION, ROUTE_KIND);
        let resource = ApiResource::from_gvk(&gvk);
        Self {
            api: Api::all_with(client, &resource),
        }
    }

    /// Turn the subscription into a [`RouteEvent`] stream.
    ///
    /// Watch errors are logged and swallowed; the watcher retries with
    /// backoff and the next successful relist restores consistency, so
    /// cache readers only ever see staleness, never failure.
    pub fn events(self) -> impl Stream<Item = RouteEvent> + Send {
        watcher(self.api, watcher::Config::default())
            .default_backoff()
            .scan(Vec::new(), |pending, item| {
                let event = match item {
                    Ok(watcher::Event::Apply(obj)) => {
                        record_from_object(&obj).map(RouteEvent::Applied)
                    }
                    Ok(watcher::Event::Delete(obj)) => {
                        key_from_object(&obj).map(RouteEvent::Deleted)
                    }
                    Ok(watcher::Event::Init) => {
                        pending.clear();
                        None
                    }
                    Ok(watcher::Event::InitApply(obj)) => {
                        if let Some(record) = record_from_object(&obj) {
                            pending.push(record);
                        }
                        None
                    }
                    Ok(watcher::Event::InitDone) => {
                        Some(RouteEvent::Resynced(std::mem::take(pending)))
                    }
                    Err(e) => {
                        warn!(error = %e, "route watch error, will retry");
                        None
                    }
                };
                future::ready(Some(event))
            })
            .filter_map(future::ready)
    }
}

/// Build a record from an unstructured route object.
///
/// Objects without namespace or name are skipped (cluster-scoped or
/// malformed payloads). A missing `spec.host` yields an empty host: the
/// record is still mirrored, but the resolver will refuse it.
fn record_from_object(obj: &DynamicObject) -> Option<RouteRecord> {
    let namespace = obj.metadata.namespace.clone()?;
    let name = obj.metadata.name.clone()?;
    let host = obj
        .data
        .pointer("/spec/host")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    if host.is_empty() {
        debug!(route = %format!("{}/{}", namespace, name), "route has no host yet");
    }

    Some(RouteRecord::new(namespace, name, host))
}

fn key_from_object(obj: &DynamicObject) -> Option<RouteKey> {
    let namespace = obj.metadata.namespace.clone()?;
    let name = obj.metadata.name.clone()?;
    Some(RouteKey::new(namespace, name))
}
