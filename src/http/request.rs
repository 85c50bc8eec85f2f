//! Request identification and inspection helpers.
//!
//! # Responsibilities
//! - Generate a UUID v4 request ID when the client sent none
//! - Extract the request host used for policy and route lookup
//! - Extract the raw User-Agent

use std::borrow::Cow;

use axum::body::Body;
use axum::http::{header, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates `x-request-id` values.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Request ID set by the request-ID layer, or "unknown".
pub fn request_id(req: &Request<Body>) -> String {
    req.headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Host as sent by the client: `Host` header (HTTP/1.1) or URI authority (HTTP/2).
pub fn request_host(req: &Request<Body>) -> String {
    req.headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| req.uri().authority().map(|a| a.as_str().to_string()))
        .unwrap_or_default()
}

/// Raw User-Agent, empty only when absent.
///
/// Bytes outside visible ASCII are kept; invalid UTF-8 becomes U+FFFD so the
/// rest of the value still reaches the patterns.
pub fn user_agent(req: &Request<Body>) -> Cow<'_, str> {
    req.headers()
        .get(header::USER_AGENT)
        .map(|v| String::from_utf8_lossy(v.as_bytes()))
        .unwrap_or_default()
}
