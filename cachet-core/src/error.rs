//! Error types for option resolution.

use thiserror::Error;

use crate::duration::ParseError;

/// Error returned when a set of cache options cannot be resolved.
///
/// Resolution is fail-fast: the first invalid field aborts the whole
/// resolution and no partially resolved options are ever produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptionsError {
    /// A human readable duration could not be converted to milliseconds.
    #[error("invalid `{field}`: {source}")]
    Parse {
        /// Name of the offending option.
        field: &'static str,
        /// Error reported by the duration parser.
        #[source]
        source: ParseError,
    },

    /// A value is outside of its allowed range.
    ///
    /// Raised for negative durations and for an early expiration ratio
    /// outside of the open interval `(0, 1)`.
    #[error("`{field}` is out of range: {reason}")]
    Range {
        /// Name of the offending option.
        field: &'static str,
        /// Human readable description of the violated bound.
        reason: String,
    },

    /// Options are individually valid but inconsistent with each other.
    #[error("inconsistent cache options: {0}")]
    Configuration(String),
}

impl OptionsError {
    pub(crate) fn range(field: &'static str, reason: impl Into<String>) -> Self {
        OptionsError::Range {
            field,
            reason: reason.into(),
        }
    }
}
