//! Fingerprint canonicalization subsystem.
//!
//! # Data Flow
//! ```text
//! Connection acceptor (TLS capture, HTTP/2 SETTINGS observer)
//!     → observation.rs (TlsObservation / Http2Observation in request extensions)
//!     → canonical.rs (settings string, pseudo-header abbreviation)
//!     → digest.rs (MD5 hex of each fingerprint string)
//!     → ParsedFingerprint (owned by the request, dropped after the response)
//! ```
//!
//! # Design Decisions
//! - Handshake capture and JA3 derivation live outside this crate; only
//!   their results are consumed
//! - Observation order is preserved verbatim, never sorted or deduplicated
//! - Hashes are pure functions of their strings so policies compare digests

pub mod canonical;
pub mod digest;
pub mod observation;

pub use canonical::{canonicalize, ParsedFingerprint};
pub use digest::digest;
pub use observation::{
    ExtensionIntrospector, Http2Observation, Http2Observer, Setting, TlsIntrospector,
    TlsObservation,
};
