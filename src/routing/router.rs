//! Host to backend target lookup.
//!
//! # Responsibilities
//! - Build the host → target URL table from the policy store
//! - Look up the target for a request host
//! - Return an explicit RouteNotFound rather than a silent default
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) host lookup via HashMap
//! - Host matching is case-insensitive and ignores the port

use std::collections::HashMap;

use url::Url;

use crate::error::ProxyError;
use crate::policy::PolicyStore;

/// Lowercase a host and drop any `:port` suffix (IPv6 literals keep their brackets).
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let without_port = if host.starts_with('[') {
        match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        }
    } else {
        match host.rsplit_once(':') {
            Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
            _ => host,
        }
    };
    without_port.to_ascii_lowercase()
}

/// Mapping from request host to backend base URL.
#[derive(Debug, Default, Clone)]
pub struct RoutingTable {
    targets: HashMap<String, Url>,
}

impl RoutingTable {
    /// Build the table from every policy that has a usable target.
    pub fn from_policies(store: &PolicyStore) -> Self {
        let mut table = Self::default();

        for policy in store.policies() {
            let raw = format!("http://{}:{}", policy.address, policy.port);
            match Url::parse(&raw) {
                Ok(url) if url.host().is_some() => table.add_backend(&policy.host, url),
                Ok(_) | Err(_) => {
                    tracing::warn!(
                        backend = %policy.name,
                        target = %raw,
                        "Backend target is not a valid URL, host will not be routable"
                    );
                }
            }
        }

        table
    }

    pub fn add_backend(&mut self, host: &str, target: Url) {
        self.targets.insert(normalize_host(host), target);
    }

    /// Target URL for a request host.
    pub fn route(&self, host: &str) -> Result<&Url, ProxyError> {
        self.targets
            .get(&normalize_host(host))
            .ok_or_else(|| ProxyError::RouteNotFound {
                host: host.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
