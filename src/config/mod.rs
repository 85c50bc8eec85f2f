//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! server.toml (+ optional browsers.toml)
//!     → loader.rs (parse, deserialize, merge browser catalog)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → lifecycle::Snapshot (compiled policies + routing table)
//!
//! On file change (--watch):
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → a fresh Snapshot replaces the old one wholesale
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use schema::BackendConfig;
pub use schema::BrowserConfig;
pub use schema::ListenerConfig;
pub use schema::ProxyConfig;
pub use schema::RuleListConfig;
