//! TLS and HTTP/2 fingerprint-gated reverse proxy library.

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod policy;
pub mod routing;

pub use config::schema::ProxyConfig;
pub use error::ProxyError;
pub use fingerprint::ParsedFingerprint;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use policy::{Decision, PolicyStore};
