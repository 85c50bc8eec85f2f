//! Per-request error taxonomy.
//!
//! Every variant is handled inside the request task and converted into a
//! fixed response (see `http::response`). Nothing here is retried.

/// Errors raised while inspecting, authorizing or forwarding a request.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The connection carries no captured TLS handshake.
    #[error("unable to fingerprint TLS handshake")]
    FingerprintUnavailable,

    /// No backend policy is configured for the request host.
    #[error("no backend configuration found for host: {host}")]
    PolicyNotFound { host: String },

    /// A policy exists but there is no routable target for it.
    #[error("backend service not found for host: {host}")]
    RouteNotFound { host: String },

    /// A configured user-agent pattern failed to compile.
    #[error("invalid regex pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The backend did not answer within the request deadline.
    #[error("upstream did not respond within {secs}s")]
    UpstreamTimeout { secs: u64 },

    /// The transport failed to complete the proxied exchange.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),
}

impl ProxyError {
    /// Stable label used in logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            ProxyError::FingerprintUnavailable => "fingerprint_unavailable",
            ProxyError::PolicyNotFound { .. } => "policy_not_found",
            ProxyError::RouteNotFound { .. } => "route_not_found",
            ProxyError::InvalidPattern { .. } => "invalid_pattern",
            ProxyError::UpstreamTimeout { .. } => "upstream_timeout",
            ProxyError::Upstream(_) => "upstream_error",
        }
    }
}
