//! Engine error taxonomy.
//!
//! Errors never reach the host: the [`Editor`](crate::Editor) entry points
//! absorb them and log. Internally every fallible step returns
//! [`EngineResult`] so the recovery policy lives in one place.

use thiserror::Error;

/// Errors raised inside the engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The embedded document (or its window/body) is not available yet.
    #[error("Embedded document is not ready")]
    EnvironmentNotReady,
    /// The manipulation library has not been loaded into the document.
    #[error("Manipulation library unavailable")]
    LibraryUnavailable,
    /// Wrapping a text range failed because it crosses element boundaries unevenly.
    #[error("Range cannot be wrapped: {0}")]
    RangeWrap(String),
    /// Viewport or content has no measurable size.
    #[error("Zero-extent geometry: {0}")]
    ZeroExtent(&'static str),
    /// A color value could not be parsed.
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    /// A style declaration set could not be decoded.
    #[error("Invalid style: {0}")]
    InvalidStyle(String),
    /// A DOM operation failed.
    #[error("DOM error: {0}")]
    Dom(String),
}

impl EngineError {
    /// Whether this error is an expected transient state rather than a fault.
    ///
    /// Transient errors are logged at debug level only.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::EnvironmentNotReady | Self::LibraryUnavailable | Self::ZeroExtent(_)
        )
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(EngineError::EnvironmentNotReady.is_transient());
        assert!(EngineError::ZeroExtent("viewport").is_transient());
        assert!(!EngineError::RangeWrap("partial".into()).is_transient());
        assert!(!EngineError::Dom("boom".into()).is_transient());
    }

    #[test]
    fn test_display() {
        let err = EngineError::InvalidColor("not-a-color".into());
        assert_eq!(err.to_string(), "Invalid color: not-a-color");
    }
}
