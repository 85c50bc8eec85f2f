//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Detect conflicting backends and browser profiles
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - Regex patterns are compiled later; a bad pattern is a diagnostic, not a rejection

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::config::schema::ProxyConfig;
use crate::routing::normalize_host;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid bind address {0:?}")]
    InvalidBindAddress(String),

    #[error("timeout {0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("backend #{0} has an empty name")]
    EmptyBackendName(usize),

    #[error("backend {0:?} has an empty host")]
    EmptyHost(String),

    #[error("backend {0:?} has port 0")]
    InvalidPort(String),

    #[error("host {0:?} is configured by more than one backend")]
    DuplicateHost(String),

    #[error("browser #{0} has an empty name")]
    EmptyBrowserName(usize),

    #[error("browser {0:?} is defined more than once")]
    DuplicateBrowser(String),
}

/// Check a loaded configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }

    let mut hosts = HashSet::new();
    for (i, backend) in config.backends.iter().enumerate() {
        if backend.name.trim().is_empty() {
            errors.push(ValidationError::EmptyBackendName(i));
        }
        if backend.host.trim().is_empty() {
            errors.push(ValidationError::EmptyHost(backend.name.clone()));
        } else if !hosts.insert(normalize_host(&backend.host)) {
            errors.push(ValidationError::DuplicateHost(backend.host.clone()));
        }
        if backend.port == 0 {
            errors.push(ValidationError::InvalidPort(backend.name.clone()));
        }
    }

    let mut browsers = HashSet::new();
    for (i, browser) in config.browsers.iter().enumerate() {
        if browser.name.trim().is_empty() {
            errors.push(ValidationError::EmptyBrowserName(i));
        } else if !browsers.insert(browser.name.as_str()) {
            errors.push(ValidationError::DuplicateBrowser(browser.name.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
