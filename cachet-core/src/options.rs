//! Partial, layerable cache options.
//!
//! [`PartialOptions`] is what callers write: every field may be left out,
//! cleared or set. Two layers are combined field by field with
//! [`PartialOptions::layer_over`]; nested groups (graceful retain, timeouts)
//! are merged per member so overriding one member keeps its siblings.

use serde::{Deserialize, Deserializer};

use crate::duration::DurationSpec;
use crate::setting::Setting;

/// Graceful retain settings of one layer.
///
/// When enabled, an item stays in storage after its logical expiry so a stale
/// value can be served while a refresh is in flight.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GracefulRetainSpec {
    /// Whether graceful retain is enabled. `None` inherits.
    pub enabled: Option<bool>,
    /// How long the item is physically kept in storage.
    pub duration: Setting<DurationSpec>,
}

impl GracefulRetainSpec {
    fn layer_over(&self, under: &GracefulRetainSpec) -> GracefulRetainSpec {
        GracefulRetainSpec {
            enabled: self.enabled.or(under.enabled),
            duration: Setting::merge(&self.duration, &under.duration),
        }
    }
}

/// Refresh timeouts of one layer.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeoutsSpec {
    /// Time after which the caller falls back to a stale value while the
    /// refresh keeps running.
    pub soft: Setting<DurationSpec>,
    /// Time after which the refresh is abandoned.
    pub hard: Setting<DurationSpec>,
}

impl TimeoutsSpec {
    /// Both timeouts explicitly cleared.
    pub fn cleared() -> Self {
        Self {
            soft: Setting::Cleared,
            hard: Setting::Cleared,
        }
    }

    fn layer_over(&self, under: &TimeoutsSpec) -> TimeoutsSpec {
        TimeoutsSpec {
            soft: Setting::merge(&self.soft, &under.soft),
            hard: Setting::merge(&self.hard, &under.hard),
        }
    }
}

/// One layer of cache item options.
///
/// # Example
///
/// ```
/// use cachet_core::PartialOptions;
///
/// let options = PartialOptions::new()
///     .ttl("10m")
///     .early_expiration(0.1)
///     .graceful_retain(true, "30m")
///     .soft_timeout("1s");
/// # let _ = options;
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialOptions {
    /// Logical time-to-live. Clearing it means the item never expires.
    pub ttl: Setting<DurationSpec>,
    /// Fraction of the ttl, in `(0, 1)`, used as the early refresh lead time.
    pub early_expiration: Setting<f64>,
    /// Graceful retain policy.
    #[serde(alias = "grace")]
    pub graceful_retain: GracefulRetainSpec,
    /// Refresh timeouts. `null` clears both members.
    #[serde(deserialize_with = "timeouts_or_null")]
    pub timeouts: TimeoutsSpec,
    /// How long to wait for a refresh lock held by someone else.
    pub lock_timeout: Setting<DurationSpec>,
}

impl PartialOptions {
    /// Creates an empty layer where every option is absent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Combines two layers: whatever `self` mentions wins over `under`.
    pub fn layer_over(&self, under: &PartialOptions) -> PartialOptions {
        PartialOptions {
            ttl: Setting::merge(&self.ttl, &under.ttl),
            early_expiration: Setting::merge(&self.early_expiration, &under.early_expiration),
            graceful_retain: self.graceful_retain.layer_over(&under.graceful_retain),
            timeouts: self.timeouts.layer_over(&under.timeouts),
            lock_timeout: Setting::merge(&self.lock_timeout, &under.lock_timeout),
        }
    }

    /// Sets the logical ttl.
    pub fn ttl(self, ttl: impl Into<DurationSpec>) -> Self {
        Self {
            ttl: Setting::Value(ttl.into()),
            ..self
        }
    }

    /// Marks the item as never expiring, overriding any inherited ttl.
    pub fn no_ttl(self) -> Self {
        Self {
            ttl: Setting::Cleared,
            ..self
        }
    }

    /// Sets the early expiration ratio.
    pub fn early_expiration(self, ratio: f64) -> Self {
        Self {
            early_expiration: Setting::Value(ratio),
            ..self
        }
    }

    /// Disables early expiration, overriding any inherited ratio.
    pub fn no_early_expiration(self) -> Self {
        Self {
            early_expiration: Setting::Cleared,
            ..self
        }
    }

    /// Sets both members of the graceful retain policy.
    pub fn graceful_retain(self, enabled: bool, duration: impl Into<DurationSpec>) -> Self {
        Self {
            graceful_retain: GracefulRetainSpec {
                enabled: Some(enabled),
                duration: Setting::Value(duration.into()),
            },
            ..self
        }
    }

    /// Toggles graceful retain, keeping whatever duration is inherited.
    pub fn graceful_retain_enabled(self, enabled: bool) -> Self {
        Self {
            graceful_retain: GracefulRetainSpec {
                enabled: Some(enabled),
                ..self.graceful_retain
            },
            ..self
        }
    }

    /// Sets the soft timeout.
    pub fn soft_timeout(self, timeout: impl Into<DurationSpec>) -> Self {
        Self {
            timeouts: TimeoutsSpec {
                soft: Setting::Value(timeout.into()),
                ..self.timeouts
            },
            ..self
        }
    }

    /// Sets the hard timeout.
    pub fn hard_timeout(self, timeout: impl Into<DurationSpec>) -> Self {
        Self {
            timeouts: TimeoutsSpec {
                hard: Setting::Value(timeout.into()),
                ..self.timeouts
            },
            ..self
        }
    }

    /// Clears both timeouts, overriding any inherited value.
    pub fn clear_timeouts(self) -> Self {
        Self {
            timeouts: TimeoutsSpec::cleared(),
            ..self
        }
    }

    /// Sets the lock timeout.
    pub fn lock_timeout(self, timeout: impl Into<DurationSpec>) -> Self {
        Self {
            lock_timeout: Setting::Value(timeout.into()),
            ..self
        }
    }
}

fn timeouts_or_null<'de, D>(deserializer: D) -> Result<TimeoutsSpec, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<TimeoutsSpec>::deserialize(deserializer)?.unwrap_or_else(TimeoutsSpec::cleared))
}
