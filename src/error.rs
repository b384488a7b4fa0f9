//! Error types for store maintenance and configuration.
//!
//! The store contract is deliberately asymmetric: `get`, `put`, `delete`,
//! `put_batch`, and `key_count` are total operations and carry no error
//! channel, while [`compact`](crate::KeyValueStore::compact) may fail.
//! Compaction failure is always recoverable — dedup state stays valid, only
//! space reclamation is deferred — so callers may retry later or ignore it.
//!
//! # Example
//!
//! ```
//! use dedup_store::error::{CompactError, CompactResult};
//!
//! fn reclaim() -> CompactResult<()> {
//!     Err(CompactError::io("log segment rewrite failed"))
//! }
//! ```

use std::sync::Arc;

use thiserror::Error;

/// A boxed error type for source chain tracking.
pub type BoxError = Arc<dyn std::error::Error + Send + Sync>;

/// Result type alias for compaction.
pub type CompactResult<T> = Result<T, CompactError>;

/// Errors that can occur while compacting a backing store.
///
/// Backend implementations map their internal failures to these variants.
/// Every variant is recoverable: a failed compaction leaves the tracked
/// key-value state intact and only defers space reclamation.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]` — new variants may be added in
/// future minor releases without a semver-breaking change. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompactError {
    /// An I/O fault prevented space reclamation.
    ///
    /// Typical for log-structured or copy-on-write backing stores whose
    /// compaction rewrites on-disk segments.
    #[error("I/O error during compaction: {message}")]
    Io {
        /// Description of the I/O fault.
        message: String,
        /// The underlying error that caused the fault.
        #[source]
        source: Option<BoxError>,
    },

    /// Backend-specific internal compaction failure.
    ///
    /// This is a catch-all for failures that don't fit other categories.
    #[error("internal compaction error: {message}")]
    Internal {
        /// Description of the internal failure.
        message: String,
        /// The underlying error that caused this failure.
        #[source]
        source: Option<BoxError>,
    },
}

impl CompactError {
    /// Creates a new `Io` error with the given message.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io { message: message.into(), source: None }
    }

    /// Creates a new `Io` error with a message and source error.
    #[must_use]
    pub fn io_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Io { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a new `Internal` error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into(), source: None }
    }

    /// Creates a new `Internal` error with a message and source error.
    #[must_use]
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Internal { message: message.into(), source: Some(Arc::new(source)) }
    }
}

/// Configuration validation errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A field was set below its allowed minimum.
    #[error("{field} must be at least {min}, got {value}")]
    BelowMinimum {
        /// Name of the offending field.
        field: &'static str,
        /// Minimum allowed value.
        min: String,
        /// The rejected value.
        value: String,
    },
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn io_error_display() {
        let err = CompactError::io("segment rewrite failed");
        assert_eq!(err.to_string(), "I/O error during compaction: segment rewrite failed");
        assert!(err.source().is_none());
    }

    #[test]
    fn io_error_preserves_source() {
        let inner = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = CompactError::io_with_source("segment rewrite failed", inner);
        let source = err.source().expect("source should be preserved");
        assert!(source.to_string().contains("disk full"));
    }

    #[test]
    fn internal_error_display() {
        let err = CompactError::internal("merge cursor invalidated");
        assert_eq!(err.to_string(), "internal compaction error: merge cursor invalidated");
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::BelowMinimum {
            field: "max_batch_size",
            min: "1".into(),
            value: "0".into(),
        };
        assert_eq!(err.to_string(), "max_batch_size must be at least 1, got 0");
    }
}
