//! Routing and dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Snapshot build (startup or reload):
//!     PolicyStore backends
//!     → router.rs (host → http://address:port)
//!     → Freeze as immutable RoutingTable
//!
//! Allowed request:
//!     router.rs (route lookup, RouteNotFound on miss)
//!     → dispatch.rs (fingerprint headers, URI rewrite, hyper client)
//!     → Backend response streamed back
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - A missing route is an operational error, distinct from a policy denial
//! - Deterministic: same host always maps to the same target

pub mod dispatch;
pub mod router;

pub use dispatch::Dispatcher;
pub use router::{normalize_host, RoutingTable};
