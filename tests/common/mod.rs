//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::routing::any;
use axum::{Json, Router};
use fingerprint_proxy::fingerprint::{
    Http2Observation, Http2Observer, Setting, TlsIntrospector, TlsObservation,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const CHROME_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
pub const CURL_UA: &str = "curl/8.4.0";

pub const JA3: &str = "771,4865-4866-4867,0-23-65281-10-11-35-16-5-13-18-51-45-43-27-21,29-23-24,0";
pub const JA3N: &str = "771,4865-4866-4867,0-5-10-11-13-16-18-21-23-27-35-43-45-51-65281,29-23-24,0";

/// A running echo backend and the number of requests it has served.
pub struct MockBackend {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl MockBackend {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Start a backend that answers every request with a JSON echo of what it received.
pub async fn start_echo_backend() -> MockBackend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));

    let app = Router::new()
        .route("/", any(echo))
        .route("/{*path}", any(echo))
        .with_state(hits.clone());

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockBackend { addr, hits }
}

async fn echo(State(hits): State<Arc<AtomicUsize>>, req: Request<Body>) -> Json<Value> {
    hits.fetch_add(1, Ordering::SeqCst);

    let headers: HashMap<String, String> = req
        .headers()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
        .collect();

    Json(json!({
        "method": req.method().as_str(),
        "path": req.uri().path(),
        "query": req.uri().query(),
        "headers": headers,
    }))
}

/// Start a backend that waits `delay` before answering.
pub async fn start_slow_backend(delay: Duration) -> MockBackend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));

    let counter = hits.clone();
    let app = Router::new().route(
        "/{*path}",
        any(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(delay).await;
                "late"
            }
        }),
    );

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockBackend { addr, hits }
}

/// A port nothing is listening on.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

pub fn tls_observation() -> TlsObservation {
    TlsObservation {
        negotiated_protocol: "h2".into(),
        tls_version: 0x0304,
        ja3: JA3.into(),
        ja3n: JA3N.into(),
    }
}

pub fn chrome_http2() -> Http2Observation {
    Http2Observation {
        settings: vec![
            Setting::new(1, 65536),
            Setting::new(2, 0),
            Setting::new(4, 6291456),
            Setting::new(6, 262144),
        ],
        pseudo_header_order: vec![
            ":method".into(),
            ":authority".into(),
            ":scheme".into(),
            ":path".into(),
        ],
    }
}

pub const CHROME_HTTP2: &str = "1:65536,2:0,4:6291456,6:262144|0|m,a,s,p";

/// Reports the same observations for every connection.
#[derive(Debug, Clone)]
pub struct FixedIntrospector {
    pub tls: TlsObservation,
    pub http2: Http2Observation,
}

impl TlsIntrospector for FixedIntrospector {
    fn tls(&self, _req: &Request<Body>) -> Option<TlsObservation> {
        Some(self.tls.clone())
    }
}

impl Http2Observer for FixedIntrospector {
    fn http2(&self, _req: &Request<Body>) -> Option<Http2Observation> {
        Some(self.http2.clone())
    }
}
