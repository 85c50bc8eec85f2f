//! Policy store.
//!
//! # Responsibilities
//! - Compile backend whitelists/blacklists and browser profiles once
//! - Resolve profile names to shared profiles at build time
//! - Look up a backend policy by request host
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) host lookup via HashMap
//! - Missing policy is an error, never an implicit allow
//! - Hash lists are normalized to trimmed lowercase hex

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::config::{BackendConfig, BrowserConfig, ProxyConfig, RuleListConfig};
use crate::error::ProxyError;
use crate::policy::patterns::PatternSet;
use crate::routing::normalize_host;

/// A named browser definition, shared by every policy that references it.
#[derive(Debug, Clone)]
pub struct BrowserProfile {
    pub name: String,
    pub user_agents: PatternSet,
    pub ja3_hashes: HashSet<String>,
    pub ja3n_hashes: HashSet<String>,
    pub http2_fingerprint_hashes: HashSet<String>,
}

impl BrowserProfile {
    pub fn from_config(config: &BrowserConfig) -> Self {
        if config.http2_fingerprints.is_empty() {
            tracing::warn!(
                browser = %config.name,
                "Browser profile has no http2_fingerprints and can never match"
            );
        }

        Self {
            name: config.name.clone(),
            user_agents: PatternSet::compile(&config.user_agents),
            ja3_hashes: hash_set(&config.tls_fingerprints_ja3),
            ja3n_hashes: hash_set(&config.tls_fingerprints_ja3_no_extension),
            http2_fingerprint_hashes: hash_set(&config.http2_fingerprints),
        }
    }
}

/// A profile name as written in a rule list, with its resolved profile.
#[derive(Debug, Clone)]
pub struct ProfileRef {
    pub name: String,
    /// `None` when no browser of that name is defined.
    pub profile: Option<Arc<BrowserProfile>>,
}

/// One whitelist or blacklist, compiled.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub user_agents: PatternSet,
    pub ja3_hashes: HashSet<String>,
    pub ja3n_hashes: HashSet<String>,
    pub http2_fingerprint_hashes: HashSet<String>,
    pub profiles: Vec<ProfileRef>,
}

impl RuleSet {
    fn compile(
        config: &RuleListConfig,
        profiles: &HashMap<String, Arc<BrowserProfile>>,
        backend: &str,
    ) -> Self {
        let profiles = config
            .browser_settings
            .iter()
            .map(|name| {
                let profile = profiles.get(name).cloned();
                if profile.is_none() {
                    tracing::warn!(
                        backend = %backend,
                        browser = %name,
                        "Policy references an undefined browser profile"
                    );
                }
                ProfileRef {
                    name: name.clone(),
                    profile,
                }
            })
            .collect();

        Self {
            user_agents: PatternSet::compile(&config.user_agents),
            ja3_hashes: hash_set(&config.tls_fingerprints_ja3),
            ja3n_hashes: hash_set(&config.tls_fingerprints_ja3_no_extension),
            http2_fingerprint_hashes: hash_set(&config.http2_fingerprints),
            profiles,
        }
    }

    /// True when none of the five lists has an entry.
    pub fn is_empty(&self) -> bool {
        self.user_agents.is_empty()
            && self.ja3_hashes.is_empty()
            && self.ja3n_hashes.is_empty()
            && self.http2_fingerprint_hashes.is_empty()
            && self.profiles.is_empty()
    }
}

/// Access policy for one backend.
#[derive(Debug, Clone)]
pub struct BackendPolicy {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub address: String,
    pub whitelist: RuleSet,
    pub blacklist: RuleSet,
}

impl BackendPolicy {
    fn compile(config: &BackendConfig, profiles: &HashMap<String, Arc<BrowserProfile>>) -> Self {
        Self {
            name: config.name.clone(),
            host: normalize_host(&config.host),
            port: config.port,
            address: config.address.clone(),
            whitelist: RuleSet::compile(&config.whitelist, profiles, &config.name),
            blacklist: RuleSet::compile(&config.blacklist, profiles, &config.name),
        }
    }
}

/// Read-only mapping from host to policy, plus the browser catalog.
#[derive(Debug, Default)]
pub struct PolicyStore {
    policies: HashMap<String, BackendPolicy>,
    profiles: HashMap<String, Arc<BrowserProfile>>,
}

impl PolicyStore {
    /// Compile every backend and browser from a validated configuration.
    pub fn from_config(config: &ProxyConfig) -> Self {
        let profiles: HashMap<String, Arc<BrowserProfile>> = config
            .browsers
            .iter()
            .map(|b| (b.name.clone(), Arc::new(BrowserProfile::from_config(b))))
            .collect();

        let mut policies = HashMap::new();
        for backend in &config.backends {
            let policy = BackendPolicy::compile(backend, &profiles);
            if let Some(previous) = policies.insert(policy.host.clone(), policy) {
                tracing::warn!(
                    host = %previous.host,
                    replaced = %previous.name,
                    "Duplicate backend host, keeping the last definition"
                );
            }
        }

        tracing::info!(
            backends = policies.len(),
            browsers = profiles.len(),
            "Policy store built"
        );

        Self { policies, profiles }
    }

    /// Policy for a request host. A host without a policy is a hard failure.
    pub fn policy_for(&self, host: &str) -> Result<&BackendPolicy, ProxyError> {
        self.policies
            .get(&normalize_host(host))
            .ok_or_else(|| ProxyError::PolicyNotFound {
                host: host.to_string(),
            })
    }

    /// Browser profile by name.
    pub fn profile_for(&self, name: &str) -> Option<&BrowserProfile> {
        self.profiles.get(name).map(Arc::as_ref)
    }

    /// All configured backend policies, in no particular order.
    pub fn policies(&self) -> impl Iterator<Item = &BackendPolicy> {
        self.policies.values()
    }
}

fn hash_set(values: &[String]) -> HashSet<String> {
    values.iter().map(|v| v.trim().to_ascii_lowercase()).collect()
}
