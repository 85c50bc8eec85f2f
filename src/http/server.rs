//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the proxy handler
//! - Wire up middleware (request ID, tracing)
//! - Bind server to a plain or TLS listener
//! - Fingerprint, authorize, route and forward each request
//! - Swap in reloaded snapshots while serving

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::schema::TimeoutConfig;
use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::fingerprint::{canonicalize, ExtensionIntrospector, Http2Observer, TlsIntrospector};
use crate::http::request::{request_host, request_id, user_agent, UuidRequestId};
use crate::http::response::Rejection;
use crate::lifecycle::startup::{apply_config_updates, SharedSnapshot, Snapshot};
use crate::observability::metrics;
use crate::policy::{evaluate, Decision};
use crate::routing::Dispatcher;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub snapshot: SharedSnapshot,
    pub dispatcher: Dispatcher,
    pub tls: Arc<dyn TlsIntrospector>,
    pub http2: Arc<dyn Http2Observer>,
}

/// HTTP server for the fingerprint proxy.
pub struct HttpServer {
    router: Router,
    snapshot: SharedSnapshot,
}

impl HttpServer {
    /// Create a server that reads observations from request extensions.
    pub fn new(config: &ProxyConfig) -> Self {
        let snapshot = Snapshot::build(config).shared();
        Self::with_parts(
            &config.timeouts,
            snapshot,
            Arc::new(ExtensionIntrospector),
            Arc::new(ExtensionIntrospector),
        )
    }

    /// Create a server from an existing snapshot and observation sources.
    pub fn with_parts(
        timeouts: &TimeoutConfig,
        snapshot: SharedSnapshot,
        tls: Arc<dyn TlsIntrospector>,
        http2: Arc<dyn Http2Observer>,
    ) -> Self {
        let state = AppState {
            snapshot: snapshot.clone(),
            dispatcher: Dispatcher::new(timeouts),
            tls,
            http2,
        };

        Self {
            router: Self::build_router(state),
            snapshot,
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The request deadline lives in the dispatcher so that a timed-out
    /// request still flows through rejection logging and metrics.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The fully layered router, e.g. for driving with `tower::ServiceExt`.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Handle to the live snapshot.
    pub fn snapshot(&self) -> SharedSnapshot {
        self.snapshot.clone()
    }

    /// Serve plain HTTP on `listener` until `shutdown` fires, then drain.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<ProxyConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        tokio::spawn(apply_config_updates(
            self.snapshot.clone(),
            config_updates,
            shutdown.resubscribe(),
        ));

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS (HTTP/1.1 and HTTP/2 via ALPN) on `addr` until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        config_updates: mpsc::UnboundedReceiver<ProxyConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %addr, "HTTPS server starting");

        tokio::spawn(apply_config_updates(
            self.snapshot.clone(),
            config_updates,
            shutdown.resubscribe(),
        ));

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            drain.graceful_shutdown(None);
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(app)
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

/// Main proxy handler.
/// Fingerprints the request, applies the backend's policy, and forwards it.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&request);
    let host = request_host(&request);

    match handle(&state, request, &host, &request_id).await {
        Ok(response) => {
            metrics::record_request("forwarded", response.status().as_u16(), start_time);
            response
        }
        Err(rejection) => {
            log_rejection(&rejection, &request_id, &host);
            metrics::record_request(rejection.reason(), rejection.status().as_u16(), start_time);
            rejection.into_response()
        }
    }
}

async fn handle(
    state: &AppState,
    request: Request<Body>,
    host: &str,
    request_id: &str,
) -> Result<Response, Rejection> {
    // Pin one snapshot for the whole request.
    let snapshot = state.snapshot.load_full();

    let tls = state.tls.tls(&request);
    let http2 = state.http2.http2(&request);
    let fingerprint = canonicalize(tls.as_ref(), http2.as_ref(), &user_agent(&request))?;

    tracing::debug!(
        request_id = %request_id,
        ja3 = %fingerprint.ja3,
        ja3_hash = %fingerprint.ja3_hash,
        http2 = %fingerprint.http2_fingerprint,
        protocol = %fingerprint.negotiated_protocol,
        "Parsed client fingerprint"
    );

    let policy = snapshot.policies.policy_for(host)?;
    let verdict = evaluate(&fingerprint, policy);

    tracing::info!(
        request_id = %request_id,
        backend = %policy.name,
        mode = verdict.mode.as_str(),
        matched = verdict.matched.map(|c| c.as_str()).unwrap_or("none"),
        allowed = verdict.decision == Decision::Allow,
        "Access decision"
    );

    if verdict.decision == Decision::Deny {
        return Err(Rejection::Denied {
            backend: policy.name.clone(),
        });
    }

    let target = snapshot.routes.route(host)?;
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    tracing::debug!(request_id = %request_id, target = %target, "Proxying request");

    let response = state
        .dispatcher
        .dispatch(request, host, target, &fingerprint, peer)
        .await?;
    Ok(response)
}

fn log_rejection(rejection: &Rejection, request_id: &str, host: &str) {
    match rejection {
        Rejection::Denied { backend } => {
            tracing::info!(request_id = %request_id, host = %host, backend = %backend, "Request denied by policy");
        }
        Rejection::Failed(e @ ProxyError::PolicyNotFound { .. }) => {
            tracing::warn!(request_id = %request_id, error = %e, "No policy for host, failing closed");
        }
        Rejection::Failed(e @ ProxyError::FingerprintUnavailable) => {
            tracing::warn!(request_id = %request_id, host = %host, error = %e, "Failed to parse client hello");
        }
        Rejection::Failed(e) => {
            tracing::error!(request_id = %request_id, host = %host, reason = e.reason(), error = %e, "Request failed");
        }
    }
}
