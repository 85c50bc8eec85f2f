//! End-to-end tests: fingerprint, decide, route and forward through the full router.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderValue, Request, StatusCode};
use axum::Router;
use common::*;
use fingerprint_proxy::config::loader::parse_config;
use fingerprint_proxy::fingerprint::{digest, Http2Observation, TlsObservation};
use fingerprint_proxy::http::response::{
    DENIED_BODY, INSPECTION_FAILED_BODY, POLICY_NOT_FOUND_BODY, ROUTE_NOT_FOUND_BODY,
    UPSTREAM_FAILED_BODY, UPSTREAM_TIMEOUT_BODY,
};
use fingerprint_proxy::lifecycle::Snapshot;
use fingerprint_proxy::routing::RoutingTable;
use fingerprint_proxy::{HttpServer, PolicyStore, ProxyConfig, Shutdown};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower::ServiceExt;

fn config(backend_port: u16) -> ProxyConfig {
    parse_config(&format!(
        r#"
        [observability]
        metrics_enabled = false

        [[backends]]
        name = "shop"
        host = "shop.example"
        port = {backend_port}

        [backends.blacklist]
        user_agents = ["^curl/"]
        tls_fingerprints_ja3 = ["{blocked}"]

        [[backends]]
        name = "members"
        host = "members.example"
        port = {backend_port}

        [backends.whitelist]
        browser_settings = ["chrome"]

        [[browsers]]
        name = "chrome"
        user_agents = ["Chrome/"]
        tls_fingerprints_ja3 = ["{ja3}"]
        http2_fingerprints = ["{http2}"]
        "#,
        blocked = digest("771,49195,0,29,0"),
        ja3 = digest(JA3),
        http2 = digest(CHROME_HTTP2),
    ))
    .unwrap()
}

fn request(host: &str, uri: &str, user_agent: &str) -> Request<Body> {
    let mut req = Request::builder()
        .uri(uri)
        .header("host", host)
        .header("user-agent", user_agent)
        .body(Body::empty())
        .unwrap();
    req.extensions_mut().insert(tls_observation());
    req.extensions_mut().insert(chrome_http2());
    req
}

async fn send(router: Router, req: Request<Body>) -> (StatusCode, String) {
    let response = router.oneshot(req).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8_lossy(&body).into_owned())
}

#[tokio::test]
async fn allowed_request_is_forwarded_with_fingerprint_headers() {
    let backend = start_echo_backend().await;
    let router = HttpServer::new(&config(backend.addr.port())).router();

    let mut req = request("shop.example", "/cart/items?page=2&sort=asc", CHROME_UA);
    req.headers_mut()
        .insert("x-ja3-fingerprint-hash", "spoofed".parse().unwrap());

    let (status, body) = send(router, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(backend.hits(), 1);

    let echo: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(echo["path"], "/cart/items");
    assert_eq!(echo["query"], "page=2&sort=asc");

    let headers = &echo["headers"];
    assert_eq!(headers["host"], "shop.example");
    assert_eq!(headers["x-ja3-fingerprint"], JA3);
    assert_eq!(headers["x-ja3-fingerprint-hash"], digest(JA3));
    assert_eq!(headers["x-ja3n-fingerprint"], JA3N);
    assert_eq!(headers["x-ja3n-fingerprint-hash"], digest(JA3N));
    assert_eq!(headers["x-http2-fingerprint"], CHROME_HTTP2);
    assert_eq!(headers["x-http2-fingerprint-hash"], digest(CHROME_HTTP2));
}

#[tokio::test]
async fn blacklisted_user_agent_is_denied_without_reaching_backend() {
    let backend = start_echo_backend().await;
    let router = HttpServer::new(&config(backend.addr.port())).router();

    let (status, body) = send(router, request("shop.example", "/", CURL_UA)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, DENIED_BODY);
    assert_eq!(backend.hits(), 0);
}

#[tokio::test]
async fn blacklisted_user_agent_with_non_ascii_byte_is_still_denied() {
    let backend = start_echo_backend().await;
    let router = HttpServer::new(&config(backend.addr.port())).router();

    let (status, _) = send(router.clone(), request("shop.example", "/", "curl/8.0")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let mut req = request("shop.example", "/", "curl/8.0");
    req.headers_mut().insert(
        "user-agent",
        HeaderValue::from_bytes(b"curl/8.0 \x80").unwrap(),
    );
    let (status, body) = send(router, req).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, DENIED_BODY);
    assert_eq!(backend.hits(), 0);
}

#[tokio::test]
async fn whitelisted_browser_profile_requires_every_conjunct() {
    let backend = start_echo_backend().await;
    let router = HttpServer::new(&config(backend.addr.port())).router();

    let (status, _) = send(router.clone(), request("members.example", "/", CHROME_UA)).await;
    assert_eq!(status, StatusCode::OK);

    // Right TLS and HTTP/2, wrong User-Agent.
    let (status, body) = send(router.clone(), request("members.example", "/", CURL_UA)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, DENIED_BODY);

    // HTTP/1.1 over TLS has the empty HTTP/2 fingerprint.
    let mut req = request("members.example", "/", CHROME_UA);
    req.extensions_mut().remove::<Http2Observation>();
    let (status, _) = send(router, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    assert_eq!(backend.hits(), 1);
}

#[tokio::test]
async fn host_without_policy_fails_closed() {
    let backend = start_echo_backend().await;
    let router = HttpServer::new(&config(backend.addr.port())).router();

    let (status, body) = send(router, request("unknown.example", "/", CHROME_UA)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, POLICY_NOT_FOUND_BODY);
    assert_ne!(body, DENIED_BODY);
    assert_eq!(backend.hits(), 0);
}

#[tokio::test]
async fn allowed_host_without_route_is_not_found() {
    let backend = start_echo_backend().await;
    let config = config(backend.addr.port());
    let snapshot =
        Snapshot::from_parts(PolicyStore::from_config(&config), RoutingTable::default()).shared();
    let introspector = Arc::new(common::FixedIntrospector {
        tls: tls_observation(),
        http2: chrome_http2(),
    });
    let router = HttpServer::with_parts(&config.timeouts, snapshot, introspector.clone(), introspector)
        .router();

    let (status, body) = send(router, request("shop.example", "/", CHROME_UA)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, ROUTE_NOT_FOUND_BODY);
    assert_eq!(backend.hits(), 0);
}

#[tokio::test]
async fn missing_tls_observation_is_inspection_failure() {
    let backend = start_echo_backend().await;
    let router = HttpServer::new(&config(backend.addr.port())).router();

    let mut req = request("shop.example", "/", CHROME_UA);
    req.extensions_mut().remove::<TlsObservation>();
    let (status, body) = send(router, req).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, INSPECTION_FAILED_BODY);
    assert_eq!(backend.hits(), 0);
}

#[tokio::test]
async fn unreachable_backend_is_bad_gateway() {
    let router = HttpServer::new(&config(closed_port().await)).router();

    let (status, body) = send(router, request("shop.example", "/", CHROME_UA)).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, UPSTREAM_FAILED_BODY);
}

#[tokio::test]
async fn slow_backend_is_gateway_timeout() {
    let backend = start_slow_backend(Duration::from_secs(5)).await;
    let mut config = config(backend.addr.port());
    config.timeouts.request_secs = 1;
    let router = HttpServer::new(&config).router();

    let started = std::time::Instant::now();
    let (status, body) = send(router, request("shop.example", "/slow", CHROME_UA)).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body, UPSTREAM_TIMEOUT_BODY);
    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(backend.hits(), 1);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let backend = start_echo_backend().await;
    let router = HttpServer::new(&config(backend.addr.port())).router();

    let response = router
        .oneshot(request("unknown.example", "/", CHROME_UA))
        .await
        .unwrap();

    let id = response.headers().get("x-request-id").unwrap();
    assert!(uuid::Uuid::parse_str(id.to_str().unwrap()).is_ok());
}

#[tokio::test]
async fn swapped_snapshot_applies_to_new_requests() {
    let backend = start_echo_backend().await;
    let server = HttpServer::new(&config(backend.addr.port()));
    let router = server.router();

    let (status, _) = send(router.clone(), request("new.example", "/", CHROME_UA)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let reloaded = parse_config(&format!(
        "[[backends]]\nname = \"new\"\nhost = \"new.example\"\nport = {}\n",
        backend.addr.port()
    ))
    .unwrap();
    server.snapshot().store(Arc::new(Snapshot::build(&reloaded)));

    let (status, _) = send(router.clone(), request("new.example", "/", CHROME_UA)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(router, request("shop.example", "/", CHROME_UA)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, POLICY_NOT_FOUND_BODY);
}

#[tokio::test]
async fn serves_real_connections_until_shutdown() {
    let backend = start_echo_backend().await;
    let config = parse_config(&format!(
        "[[backends]]\nname = \"local\"\nhost = \"127.0.0.1\"\nport = {}\n",
        backend.addr.port()
    ))
    .unwrap();

    let introspector = Arc::new(common::FixedIntrospector {
        tls: tls_observation(),
        http2: chrome_http2(),
    });
    let snapshot = Snapshot::build(&config).shared();
    let server = HttpServer::with_parts(&config.timeouts, snapshot, introspector.clone(), introspector);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let (_updates_tx, updates_rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(server.run(listener, updates_rx, shutdown.subscribe()));

    let client = reqwest::Client::new();
    let echo: Value = client
        .get(format!("http://{addr}/status?full=1"))
        .header("user-agent", CHROME_UA)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(echo["path"], "/status");
    assert_eq!(echo["query"], "full=1");
    assert_eq!(echo["headers"]["x-http2-fingerprint"], CHROME_HTTP2);
    assert_eq!(echo["headers"]["x-forwarded-for"], "127.0.0.1");
    assert_eq!(backend.hits(), 1);

    drop(client);
    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
}
