//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → request.rs (host, User-Agent, request ID)
//!     → fingerprint::canonicalize
//!     → policy::evaluate (Allow / Deny)
//!     → routing (route lookup, dispatch with fingerprint headers)
//!     → response.rs (fixed rejection responses)
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::Rejection;
pub use server::{AppState, HttpServer};
