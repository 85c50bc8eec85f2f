//! Access policy subsystem.
//!
//! # Data Flow
//! ```text
//! ProxyConfig.backends + ProxyConfig.browsers   (at snapshot build)
//!     → patterns.rs (compile User-Agent regexes once)
//!     → store.rs (PolicyStore: host → BackendPolicy, name → BrowserProfile)
//!
//! Per request:
//!     ParsedFingerprint + BackendPolicy
//!     → decision.rs (mode selection, criteria, browser profiles)
//!     → Allow / Deny
//! ```
//!
//! # Design Decisions
//! - Nothing is compiled or mutated on the request path
//! - Whitelist mode wins whenever the whitelist has any entry
//! - Empty lists never match in either direction

pub mod decision;
pub mod patterns;
pub mod store;

pub use decision::{decide, evaluate, profile_matches, Decision, Mode, Verdict};
pub use store::{BackendPolicy, BrowserProfile, PolicyStore, RuleSet};
