//! Fingerprint-gated reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌────────────────────────────────────────────────────────┐
//!                      │                   FINGERPRINT PROXY                    │
//!                      │                                                        │
//!   Client Request     │  ┌─────────┐   ┌─────────────┐   ┌──────────┐          │
//!   ───────────────────┼─▶│  http   │──▶│ fingerprint │──▶│  policy  │          │
//!                      │  │ server  │   │ canonical   │   │ decision │          │
//!                      │  └─────────┘   └─────────────┘   └────┬─────┘          │
//!                      │       ▲                                │ allow         │
//!                      │       │ 403/404/500/502                ▼               │
//!                      │       │                         ┌──────────┐           │
//!   Client Response    │       └─────────────────────────│ routing  │───────────┼──▶ Backend
//!   ◀──────────────────┼─────────────────────────────────│ dispatch │◀──────────┼───
//!                      │                                 └──────────┘           │
//!                      │  ┌──────────────────────────────────────────────────┐  │
//!                      │  │ config + watcher │ lifecycle │ observability     │  │
//!                      │  └──────────────────────────────────────────────────┘  │
//!                      └────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use fingerprint_proxy::config::loader::load_all;
use fingerprint_proxy::config::watcher::ConfigWatcher;
use fingerprint_proxy::net::tls::load_tls_config;
use fingerprint_proxy::observability::{logging, metrics};
use fingerprint_proxy::{HttpServer, Shutdown};

/// Reverse proxy that admits clients by TLS and HTTP/2 fingerprint.
#[derive(Parser, Debug)]
#[command(name = "fingerprint-proxy", version, about)]
struct Args {
    /// Server configuration file.
    #[arg(short, long, default_value = "config/server.toml")]
    config: PathBuf,

    /// Optional browser profile catalog merged into the server configuration.
    #[arg(short, long)]
    browsers: Option<PathBuf>,

    /// Reload configuration when either file changes.
    #[arg(short, long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_all(&args.config, args.browsers.as_deref())?;
    logging::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %args.config.display(),
        backends = config.backends.len(),
        browsers = config.browsers.len(),
        "fingerprint-proxy starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    // The notify watcher stops delivering events once dropped.
    let (_watcher, config_updates) = if args.watch {
        let (watcher, rx) = ConfigWatcher::new(&args.config, args.browsers.as_deref());
        (Some(watcher.run()?), rx)
    } else {
        let (_tx, rx) = mpsc::unbounded_channel();
        (None, rx)
    };

    shutdown.trigger_on_signal();

    // Observations are read from request extensions, which only a
    // handshake-capturing acceptor fills in.
    tracing::warn!(
        "No TLS introspector is wired into this listener; \
         requests without a captured handshake are rejected as uninspectable"
    );
    let server = HttpServer::new(&config);
    let bind_address = &config.listener.bind_address;

    match &config.listener.tls {
        Some(tls) => {
            let rustls = load_tls_config(tls).await?;
            let addr: SocketAddr = bind_address.parse()?;
            server.run_tls(addr, rustls, config_updates, server_shutdown).await?;
        }
        None => {
            let listener = TcpListener::bind(bind_address.as_str()).await?;
            tracing::info!(address = %listener.local_addr()?, "Listening for connections");
            server.run(listener, config_updates, server_shutdown).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
