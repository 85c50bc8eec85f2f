//! Raw connection observations and the seams that supply them.
//!
//! # Responsibilities
//! - Carry what the TLS introspector saw (protocol, version, JA3/JA3N)
//! - Carry the client's initial HTTP/2 SETTINGS and pseudo-header order
//! - Hand both to the canonicalizer without interpreting them

use axum::body::Body;
use axum::http::Request;

/// TLS handshake data for the current connection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TlsObservation {
    /// ALPN protocol negotiated on the connection (e.g. "h2").
    pub negotiated_protocol: String,
    /// Negotiated TLS version (e.g. 0x0304).
    pub tls_version: u16,
    /// JA3 string as derived by the introspector.
    pub ja3: String,
    /// JA3 string with extension ordering normalized.
    pub ja3n: String,
}

/// One entry of the client's initial SETTINGS frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Setting {
    pub id: u16,
    pub value: u32,
}

impl Setting {
    pub fn new(id: u16, value: u32) -> Self {
        Self { id, value }
    }
}

/// HTTP/2 observations for the current request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Http2Observation {
    /// SETTINGS pairs in receipt order.
    pub settings: Vec<Setting>,
    /// Pseudo-header names in the order they appeared.
    pub pseudo_header_order: Vec<String>,
}

/// Source of TLS handshake observations.
pub trait TlsIntrospector: Send + Sync + std::fmt::Debug {
    /// Returns `None` when the connection has no captured handshake.
    fn tls(&self, req: &Request<Body>) -> Option<TlsObservation>;
}

/// Source of HTTP/2 SETTINGS observations.
pub trait Http2Observer: Send + Sync + std::fmt::Debug {
    /// Returns `None` for requests that did not arrive over HTTP/2.
    fn http2(&self, req: &Request<Body>) -> Option<Http2Observation>;
}

/// Reads observations that the connection acceptor stored in request extensions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionIntrospector;

impl TlsIntrospector for ExtensionIntrospector {
    fn tls(&self, req: &Request<Body>) -> Option<TlsObservation> {
        req.extensions().get::<TlsObservation>().cloned()
    }
}

impl Http2Observer for ExtensionIntrospector {
    fn http2(&self, req: &Request<Body>) -> Option<Http2Observation> {
        req.extensions().get::<Http2Observation>().cloned()
    }
}
