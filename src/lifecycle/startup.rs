//! Startup orchestration.
//!
//! # Responsibilities
//! - Compile the policy store and routing table from a validated config
//! - Publish them together as one immutable snapshot
//! - Swap in a rebuilt snapshot when a reloaded config arrives
//!
//! # Design Decisions
//! - A snapshot is never edited; reload builds a new one and swaps it
//! - Routing is derived from the same policy store it is published with

use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::{broadcast, mpsc};

use crate::config::ProxyConfig;
use crate::observability::metrics;
use crate::policy::PolicyStore;
use crate::routing::RoutingTable;

/// Policies and routes served together.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub policies: PolicyStore,
    pub routes: RoutingTable,
}

/// Handle shared by every request task.
pub type SharedSnapshot = Arc<ArcSwap<Snapshot>>;

impl Snapshot {
    pub fn build(config: &ProxyConfig) -> Self {
        let policies = PolicyStore::from_config(config);
        let routes = RoutingTable::from_policies(&policies);

        tracing::info!(routes = routes.len(), "Snapshot built");
        Self { policies, routes }
    }

    pub fn from_parts(policies: PolicyStore, routes: RoutingTable) -> Self {
        Self { policies, routes }
    }

    pub fn shared(self) -> SharedSnapshot {
        Arc::new(ArcSwap::from_pointee(self))
    }
}

/// Apply reloaded configurations until the channel closes or shutdown fires.
pub async fn apply_config_updates(
    snapshot: SharedSnapshot,
    mut config_updates: mpsc::UnboundedReceiver<ProxyConfig>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            update = config_updates.recv() => match update {
                Some(config) => {
                    snapshot.store(Arc::new(Snapshot::build(&config)));
                    metrics::record_reload(true);
                    tracing::info!(backends = config.backends.len(), "Configuration reloaded");
                }
                None => break,
            },
            _ = shutdown.recv() => break,
        }
    }
}
