//! The merge and derivation algorithm.
//!
//! Resolution always takes two layers. At construction the layers are the
//! caller's override and the defaults; when cloning, the receiver's own
//! normalized layer takes the place of the defaults.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::duration::{DurationParser, DurationSpec, HumantimeParser};
use crate::error::OptionsError;
use crate::options::{GracefulRetainSpec, PartialOptions, TimeoutsSpec};
use crate::resolved::{ResolvedOptions, Timeouts};
use crate::setting::Setting;

/// Resolves [`PartialOptions`] layers into [`ResolvedOptions`].
///
/// The resolver owns the [`DurationParser`] used for human readable
/// durations. Resolved options keep a handle to it, so
/// [`ResolvedOptions::clone_with`] parses new overrides the same way.
#[derive(Clone)]
pub struct OptionsResolver {
    parser: Arc<dyn DurationParser>,
}

impl std::fmt::Debug for OptionsResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionsResolver")
            .field("parser", &"...")
            .finish()
    }
}

impl Default for OptionsResolver {
    fn default() -> Self {
        Self::new(HumantimeParser)
    }
}

impl OptionsResolver {
    /// Creates a resolver using a custom duration parser.
    pub fn new<P>(parser: P) -> Self
    where
        P: DurationParser + 'static,
    {
        Self {
            parser: Arc::new(parser),
        }
    }

    pub(crate) fn from_shared(parser: Arc<dyn DurationParser>) -> Self {
        Self { parser }
    }

    /// Resolves `overrides` layered on top of `defaults`.
    pub fn resolve(
        &self,
        overrides: &PartialOptions,
        defaults: &PartialOptions,
    ) -> Result<ResolvedOptions, OptionsError> {
        let merged = overrides.layer_over(defaults);
        let parser = self.parser.as_ref();

        let ttl = duration_setting(&merged.ttl, parser, "ttl")?;
        let logical_ttl = ttl.into_option();

        let graceful_enabled = merged.graceful_retain.enabled.unwrap_or(false);
        let graceful_duration = duration_setting(
            &merged.graceful_retain.duration,
            parser,
            "graceful_retain.duration",
        )?;
        let physical_ttl = derive_physical_ttl(logical_ttl, graceful_enabled, &graceful_duration);

        let early_expire_ttl = derive_early_expire_ttl(logical_ttl, merged.early_expiration)?;

        let soft = duration_setting(&merged.timeouts.soft, parser, "timeouts.soft")?;
        let hard = duration_setting(&merged.timeouts.hard, parser, "timeouts.hard")?;
        let timeouts = resolve_timeouts(soft.into_option(), hard.into_option());

        let lock_timeout = duration_setting(&merged.lock_timeout, parser, "lock_timeout")?;

        if let (true, Some(logical), Some(physical)) = (graceful_enabled, logical_ttl, physical_ttl)
            && physical < logical
        {
            warn!(
                logical_ttl_ms = logical.as_millis() as u64,
                physical_ttl_ms = physical.as_millis() as u64,
                "graceful retain duration is shorter than the ttl"
            );
        }

        debug!(
            logical_ttl = ?logical_ttl,
            physical_ttl = ?physical_ttl,
            early_expire_ttl = ?early_expire_ttl,
            graceful_retain = graceful_enabled,
            timeouts = ?timeouts,
            "cache options resolved"
        );

        // Clones inherit parsed durations, never the original text.
        let layer = PartialOptions {
            ttl: to_spec(ttl),
            early_expiration: merged.early_expiration,
            graceful_retain: GracefulRetainSpec {
                enabled: merged.graceful_retain.enabled,
                duration: to_spec(graceful_duration),
            },
            timeouts: TimeoutsSpec {
                soft: to_spec(soft),
                hard: to_spec(hard),
            },
            lock_timeout: to_spec(lock_timeout),
        };

        Ok(ResolvedOptions {
            logical_ttl,
            physical_ttl,
            early_expire_ttl,
            graceful_retain: graceful_enabled,
            timeouts,
            lock_timeout: lock_timeout.into_option(),
            layer,
            parser: Arc::clone(&self.parser),
        })
    }
}

fn duration_setting(
    setting: &Setting<DurationSpec>,
    parser: &dyn DurationParser,
    field: &'static str,
) -> Result<Setting<Duration>, OptionsError> {
    setting
        .as_ref()
        .try_map(|spec| spec.to_duration(parser, field))
}

fn to_spec(setting: Setting<Duration>) -> Setting<DurationSpec> {
    setting.map(DurationSpec::from)
}

fn derive_physical_ttl(
    logical_ttl: Option<Duration>,
    graceful_enabled: bool,
    graceful_duration: &Setting<Duration>,
) -> Option<Duration> {
    if !graceful_enabled {
        return logical_ttl;
    }
    match graceful_duration {
        Setting::Value(duration) => Some(*duration),
        // Retained until evicted by other means.
        Setting::Cleared => None,
        Setting::Absent => logical_ttl,
    }
}

fn derive_early_expire_ttl(
    logical_ttl: Option<Duration>,
    ratio: Setting<f64>,
) -> Result<Option<Duration>, OptionsError> {
    let Setting::Value(ratio) = ratio else {
        return Ok(None);
    };
    if !(ratio > 0.0 && ratio < 1.0) {
        return Err(OptionsError::range(
            "early_expiration",
            format!("{ratio} is not within (0, 1)"),
        ));
    }
    Ok(logical_ttl.map(|ttl| {
        let lead = (ttl.as_millis() as f64 * ratio).round();
        Duration::from_millis(lead as u64)
    }))
}

fn resolve_timeouts(soft: Option<Duration>, hard: Option<Duration>) -> Option<Timeouts> {
    if soft.is_none() && hard.is_none() {
        return None;
    }
    Some(Timeouts { soft, hard })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_early_expire_ttl_rounds_to_millis() {
        let lead = derive_early_expire_ttl(Some(Duration::from_millis(1001)), Setting::Value(0.5))
            .unwrap()
            .unwrap();
        assert_eq!(lead, Duration::from_millis(501));
    }

    #[test]
    fn test_early_expiration_bounds_are_exclusive() {
        for ratio in [0.0, 1.0, -0.2, 1.5, f64::NAN, f64::INFINITY] {
            let result = derive_early_expire_ttl(Some(Duration::from_secs(60)), Setting::Value(ratio));
            assert!(
                matches!(
                    result,
                    Err(OptionsError::Range {
                        field: "early_expiration",
                        ..
                    })
                ),
                "ratio {ratio} should be rejected"
            );
        }
    }

    #[test]
    fn test_physical_ttl_without_graceful_duration_uses_logical() {
        let logical = Some(Duration::from_secs(10));
        assert_eq!(derive_physical_ttl(logical, true, &Setting::Absent), logical);
        assert_eq!(derive_physical_ttl(logical, true, &Setting::Cleared), None);
        assert_eq!(
            derive_physical_ttl(logical, false, &Setting::Value(Duration::from_secs(99))),
            logical
        );
    }

    #[test]
    fn test_timeouts_absent_everywhere_is_none() {
        assert_eq!(resolve_timeouts(None, None), None);
    }

    #[test]
    fn test_soft_timeout_may_exceed_hard_timeout() {
        let soft = Some(Duration::from_secs(180));
        let hard = Some(Duration::from_secs(120));
        assert_eq!(resolve_timeouts(soft, hard), Some(Timeouts { soft, hard }));
    }
}
