//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Build Snapshot → Start listener
//!
//! Reload (startup.rs, --watch only):
//!     Validated config → Build fresh Snapshot → Swap whole snapshot
//!
//! Shutdown (signals.rs):
//!     SIGTERM/SIGINT → Stop accepting → Drain in-flight requests → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then snapshot, then listeners
//! - Requests pin one snapshot; nothing mutates it while serving
//! - In-flight requests drain on shutdown, no forced deadline

pub mod signals;
pub mod startup;

pub use signals::Shutdown;
pub use startup::{SharedSnapshot, Snapshot};
