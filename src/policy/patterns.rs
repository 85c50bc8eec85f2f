//! Precompiled User-Agent pattern sets.

use regex::Regex;

use crate::error::ProxyError;
use crate::observability::metrics;

/// User-Agent patterns compiled once when a snapshot is built.
///
/// Patterns that fail to compile are reported once and kept aside; they
/// never match but still count as configured.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    compiled: Vec<Regex>,
    skipped: Vec<String>,
}

impl PatternSet {
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Self {
        let mut set = Self::default();

        for pattern in patterns {
            let pattern = pattern.as_ref();
            match Regex::new(pattern) {
                Ok(re) => set.compiled.push(re),
                Err(source) => {
                    let err = ProxyError::InvalidPattern {
                        pattern: pattern.to_string(),
                        source,
                    };
                    tracing::warn!(error = %err, "Skipping user-agent pattern");
                    metrics::record_invalid_pattern();
                    set.skipped.push(pattern.to_string());
                }
            }
        }

        set
    }

    /// True when no pattern was configured at all.
    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty() && self.skipped.is_empty()
    }

    /// Unanchored search: any pattern found anywhere in `value` matches.
    pub fn matches(&self, value: &str) -> bool {
        self.compiled.iter().any(|re| re.is_match(value))
    }

    /// Patterns that failed to compile.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }
}
