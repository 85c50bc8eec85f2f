//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → tls.rs (optional rustls termination)
//!     → connection acceptor attaches TLS / HTTP/2 observations
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - TLS is optional; a plain listener serves requests that carry no
//!   handshake and are therefore rejected as uninspectable
//! - Certificate problems are fatal at startup

pub mod tls;
