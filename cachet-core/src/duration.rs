//! Duration inputs and the parser used to read human readable durations.
//!
//! Durations can be given either as text understood by a [`DurationParser`]
//! (`"10m"`, `"1h 30m"`, `"250ms"`) or as a raw number of milliseconds.
//! Resolved durations are kept at millisecond precision.

use std::fmt;
use std::time::Duration;

use serde::de::{self, Deserialize, Deserializer, Visitor};
use thiserror::Error;

/// A duration as written by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DurationSpec {
    /// Human readable duration, converted by a [`DurationParser`].
    Text(String),
    /// Raw signed number of milliseconds. Negative values are rejected at
    /// resolution.
    Millis(i64),
    /// A duration known exactly, such as a non-negative millisecond count or
    /// a value that was already resolved. Kept at millisecond precision.
    Exact(Duration),
}

impl DurationSpec {
    /// Converts the spec into a millisecond precision [`Duration`].
    pub fn to_duration(
        &self,
        parser: &dyn DurationParser,
        field: &'static str,
    ) -> Result<Duration, crate::OptionsError> {
        match self {
            DurationSpec::Text(text) => parser
                .parse(text)
                .map(truncate_to_millis)
                .map_err(|source| crate::OptionsError::Parse { field, source }),
            DurationSpec::Millis(millis) => u64::try_from(*millis)
                .map(Duration::from_millis)
                .map_err(|_| {
                    crate::OptionsError::range(field, format!("negative duration {millis}ms"))
                }),
            DurationSpec::Exact(duration) => Ok(truncate_to_millis(*duration)),
        }
    }
}

impl From<&str> for DurationSpec {
    fn from(value: &str) -> Self {
        DurationSpec::Text(value.to_owned())
    }
}

impl From<String> for DurationSpec {
    fn from(value: String) -> Self {
        DurationSpec::Text(value)
    }
}

impl From<i64> for DurationSpec {
    fn from(value: i64) -> Self {
        DurationSpec::Millis(value)
    }
}

impl From<u64> for DurationSpec {
    fn from(value: u64) -> Self {
        DurationSpec::Exact(Duration::from_millis(value))
    }
}

impl From<Duration> for DurationSpec {
    fn from(value: Duration) -> Self {
        DurationSpec::Exact(value)
    }
}

impl<'de> Deserialize<'de> for DurationSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DurationSpecVisitor;

        impl Visitor<'_> for DurationSpecVisitor {
            type Value = DurationSpec;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a duration string such as \"10m\" or a number of milliseconds")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                Ok(DurationSpec::Text(value.to_owned()))
            }

            fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
                Ok(DurationSpec::Text(value))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
                Ok(DurationSpec::Millis(value))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
                Ok(DurationSpec::from(value))
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
                if !value.is_finite() || value.fract() != 0.0 || value >= u64::MAX as f64 {
                    Err(E::invalid_value(de::Unexpected::Float(value), &self))
                } else if value < 0.0 {
                    Ok(DurationSpec::Millis(value as i64))
                } else {
                    Ok(DurationSpec::from(value as u64))
                }
            }
        }

        deserializer.deserialize_any(DurationSpecVisitor)
    }
}

/// Error produced when a duration string cannot be understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse duration {input:?}: {reason}")]
pub struct ParseError {
    input: String,
    reason: String,
}

impl ParseError {
    /// Creates a new parse error for `input`.
    pub fn new(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// The text that failed to parse.
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// Converts human readable duration strings into [`Duration`]s.
///
/// Implementations must be pure: the same input always yields the same
/// output and parsing has no side effects.
pub trait DurationParser: Send + Sync {
    /// Parses `text` into a duration.
    fn parse(&self, text: &str) -> Result<Duration, ParseError>;
}

impl<F> DurationParser for F
where
    F: Fn(&str) -> Result<Duration, ParseError> + Send + Sync,
{
    fn parse(&self, text: &str) -> Result<Duration, ParseError> {
        self(text)
    }
}

/// Default parser backed by [`humantime`].
///
/// Accepts inputs like `"10m"`, `"1h 30m"`, `"2days"` or `"500ms"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HumantimeParser;

impl DurationParser for HumantimeParser {
    fn parse(&self, text: &str) -> Result<Duration, ParseError> {
        humantime::parse_duration(text.trim()).map_err(|err| ParseError::new(text, err.to_string()))
    }
}

pub(crate) fn truncate_to_millis(duration: Duration) -> Duration {
    Duration::new(duration.as_secs(), duration.subsec_millis() * 1_000_000)
}
