//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the fingerprint proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Backends, each identified by the host it serves.
    pub backends: Vec<BackendConfig>,

    /// Named browser profiles referenced from whitelists and blacklists.
    pub browsers: Vec<BrowserConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8443").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8443".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Backend server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Backend identifier for logging/metrics.
    pub name: String,

    /// Request host this backend serves (exact, case-insensitive).
    pub host: String,

    /// Port the backend listens on.
    pub port: u16,

    /// Address the backend listens on.
    #[serde(default = "default_address")]
    pub address: String,

    #[serde(default)]
    pub whitelist: RuleListConfig,

    #[serde(default)]
    pub blacklist: RuleListConfig,
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

/// The five criteria lists shared by whitelists and blacklists.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RuleListConfig {
    /// User-Agent regex patterns.
    pub user_agents: Vec<String>,

    /// JA3 hashes.
    pub tls_fingerprints_ja3: Vec<String>,

    /// JA3N hashes.
    pub tls_fingerprints_ja3_no_extension: Vec<String>,

    /// HTTP/2 fingerprint hashes.
    pub http2_fingerprints: Vec<String>,

    /// Names of browser profiles.
    pub browser_settings: Vec<String>,
}

/// A named browser definition.
///
/// Every list takes part in a conjunction, so a profile with no
/// `http2_fingerprints` can never match.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BrowserConfig {
    pub name: String,
    pub user_agents: Vec<String>,
    pub tls_fingerprints_ja3: Vec<String>,
    pub tls_fingerprints_ja3_no_extension: Vec<String>,
    pub http2_fingerprints: Vec<String>,
}

/// Standalone browser catalog file.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BrowserCatalog {
    pub browsers: Vec<BrowserConfig>,
}

/// Timeout configuration for the upstream transport.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Deadline for the backend's response head, in seconds.
    pub request_secs: u64,

    /// Idle pooled connection timeout in seconds.
    pub idle_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
            idle_secs: 60,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
