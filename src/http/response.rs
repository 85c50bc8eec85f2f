//! Rejection responses.
//!
//! # Responsibilities
//! - Map every per-request failure to a fixed status and body
//! - Keep a stable reason label for logs and metrics
//!
//! # Design Decisions
//! - A policy denial and a missing policy share 403 but differ in body
//!   and reason, so operators can tell them apart
//! - Bodies never echo fingerprints or configuration back to the client

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::ProxyError;

pub const DENIED_BODY: &str = "Your request does not meet our security policies.";
pub const POLICY_NOT_FOUND_BODY: &str = "No security policy is configured for this host.";
pub const ROUTE_NOT_FOUND_BODY: &str = "No backend is configured for this host.";
pub const INSPECTION_FAILED_BODY: &str = "Connection inspection failed.";
pub const UPSTREAM_FAILED_BODY: &str = "Upstream request failed";
pub const UPSTREAM_TIMEOUT_BODY: &str = "Upstream request timed out";

/// Why a request was not forwarded (or failed while forwarding).
#[derive(Debug)]
pub enum Rejection {
    /// The access decision engine denied the request.
    Denied { backend: String },
    /// Inspection, lookup or transport failed.
    Failed(ProxyError),
}

impl From<ProxyError> for Rejection {
    fn from(err: ProxyError) -> Self {
        Rejection::Failed(err)
    }
}

impl Rejection {
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::Denied { .. } => "denied",
            Rejection::Failed(e) => e.reason(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Rejection::Denied { .. } => StatusCode::FORBIDDEN,
            Rejection::Failed(ProxyError::PolicyNotFound { .. }) => StatusCode::FORBIDDEN,
            Rejection::Failed(ProxyError::RouteNotFound { .. }) => StatusCode::NOT_FOUND,
            Rejection::Failed(ProxyError::FingerprintUnavailable) => StatusCode::INTERNAL_SERVER_ERROR,
            Rejection::Failed(ProxyError::UpstreamTimeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            Rejection::Failed(ProxyError::Upstream(_)) => StatusCode::BAD_GATEWAY,
            Rejection::Failed(ProxyError::InvalidPattern { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> &'static str {
        match self {
            Rejection::Denied { .. } => DENIED_BODY,
            Rejection::Failed(ProxyError::PolicyNotFound { .. }) => POLICY_NOT_FOUND_BODY,
            Rejection::Failed(ProxyError::RouteNotFound { .. }) => ROUTE_NOT_FOUND_BODY,
            Rejection::Failed(ProxyError::FingerprintUnavailable) => INSPECTION_FAILED_BODY,
            Rejection::Failed(ProxyError::UpstreamTimeout { .. }) => UPSTREAM_TIMEOUT_BODY,
            Rejection::Failed(ProxyError::Upstream(_)) => UPSTREAM_FAILED_BODY,
            Rejection::Failed(ProxyError::InvalidPattern { .. }) => "Internal Server Error",
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (self.status(), self.body()).into_response()
    }
}
