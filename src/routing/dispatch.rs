//! Forwarding allowed requests to their backend.
//!
//! # Responsibilities
//! - Stamp the six fingerprint headers onto the outbound request
//! - Point the request at the backend, keeping path and query
//! - Stream the request and response bodies through the hyper client
//!
//! # Design Decisions
//! - Method, body and end-to-end headers pass through untouched
//! - Fingerprint headers replace any client-supplied copies
//! - Hop-by-hop headers are stripped in both directions
//! - Upstream connections are always HTTP/1.1

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::{Request, Response, Uri, Version};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use url::Url;

use crate::config::schema::TimeoutConfig;
use crate::error::ProxyError;
use crate::fingerprint::ParsedFingerprint;

pub const X_JA3_FINGERPRINT: &str = "x-ja3-fingerprint";
pub const X_JA3_FINGERPRINT_HASH: &str = "x-ja3-fingerprint-hash";
pub const X_JA3N_FINGERPRINT: &str = "x-ja3n-fingerprint";
pub const X_JA3N_FINGERPRINT_HASH: &str = "x-ja3n-fingerprint-hash";
pub const X_HTTP2_FINGERPRINT: &str = "x-http2-fingerprint";
pub const X_HTTP2_FINGERPRINT_HASH: &str = "x-http2-fingerprint-hash";

const X_FORWARDED_FOR: &str = "x-forwarded-for";

const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-connection"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
];

/// Set the six fingerprint headers from a parsed fingerprint.
///
/// Fails without touching `headers` when any value cannot be sent as a
/// header, so a request is never forwarded with a partial set.
pub fn inject_fingerprint_headers(
    headers: &mut HeaderMap,
    fp: &ParsedFingerprint,
) -> Result<(), ProxyError> {
    let values = [
        (X_JA3_FINGERPRINT, &fp.ja3),
        (X_JA3_FINGERPRINT_HASH, &fp.ja3_hash),
        (X_JA3N_FINGERPRINT, &fp.ja3n),
        (X_JA3N_FINGERPRINT_HASH, &fp.ja3n_hash),
        (X_HTTP2_FINGERPRINT, &fp.http2_fingerprint),
        (X_HTTP2_FINGERPRINT_HASH, &fp.http2_fingerprint_hash),
    ];

    let mut encoded = Vec::with_capacity(values.len());
    for (name, value) in values {
        match HeaderValue::from_str(value) {
            Ok(v) => encoded.push((HeaderName::from_static(name), v)),
            Err(_) => {
                tracing::warn!(header = name, value = %value, "Fingerprint is not a valid header value");
                return Err(ProxyError::FingerprintUnavailable);
            }
        }
    }

    for (name, value) in encoded {
        headers.insert(name, value);
    }
    Ok(())
}

/// Outbound URI: the target's scheme and authority with the original path and query.
pub fn target_uri(target: &Url, original: &Uri) -> Result<Uri, axum::http::Error> {
    let host = target.host_str().unwrap_or_default();
    let authority = match target.port_or_known_default() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    let path_and_query = original
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    Uri::builder()
        .scheme(target.scheme())
        .authority(authority.as_str())
        .path_and_query(path_and_query)
        .build()
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
    // Upgrade tunnels are not proxied.
    headers.remove(header::UPGRADE);
}

fn append_forwarded_for(headers: &mut HeaderMap, peer: SocketAddr) {
    let ip = peer.ip().to_string();
    let value = match headers.get(X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
        Some(existing) => format!("{existing}, {ip}"),
        None => ip,
    };
    if let Ok(v) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR, v);
    }
}

/// HTTP client that carries allowed requests to backends.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    client: Client<HttpConnector, Body>,
    request_timeout: Duration,
}

impl Dispatcher {
    pub fn new(timeouts: &TimeoutConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));

        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(timeouts.idle_secs))
            .build(connector);

        Self {
            client,
            request_timeout: Duration::from_secs(timeouts.request_secs),
        }
    }

    /// Forward `request` to `target` for `host`, annotated with `fp`.
    ///
    /// The request deadline covers connecting and waiting for the response
    /// head; the response body streams without one.
    pub async fn dispatch(
        &self,
        request: Request<Body>,
        host: &str,
        target: &Url,
        fp: &ParsedFingerprint,
        peer: Option<SocketAddr>,
    ) -> Result<Response<Body>, ProxyError> {
        let (mut parts, body) = request.into_parts();

        parts.uri = target_uri(target, &parts.uri).map_err(|e| {
            tracing::error!(host = %host, target = %target, error = %e, "Cannot build backend URI");
            ProxyError::RouteNotFound {
                host: host.to_string(),
            }
        })?;
        parts.version = Version::HTTP_11;

        strip_hop_by_hop(&mut parts.headers);
        if !parts.headers.contains_key(header::HOST) {
            if let Ok(v) = HeaderValue::from_str(host) {
                parts.headers.insert(header::HOST, v);
            }
        }
        if let Some(peer) = peer {
            append_forwarded_for(&mut parts.headers, peer);
        }
        inject_fingerprint_headers(&mut parts.headers, fp)?;

        let exchange = self.client.request(Request::from_parts(parts, body));
        let response = tokio::time::timeout(self.request_timeout, exchange)
            .await
            .map_err(|_| ProxyError::UpstreamTimeout {
                secs: self.request_timeout.as_secs(),
            })??;

        let (mut parts, body) = response.into_parts();
        strip_hop_by_hop(&mut parts.headers);
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}
