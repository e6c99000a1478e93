//! Fully resolved, immutable cache item options.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::duration::DurationParser;
use crate::error::OptionsError;
use crate::options::PartialOptions;
use crate::resolver::OptionsResolver;

/// Resolved refresh timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Fall back to a stale value once the refresh runs this long.
    pub soft: Option<Duration>,
    /// Abandon the refresh once it runs this long.
    pub hard: Option<Duration>,
}

/// Timing options of a single cached item, fully resolved.
///
/// Instances are immutable. Use [`ResolvedOptions::clone_with`] to derive a
/// refined set of options; unspecified fields are inherited from the
/// receiver's resolved values, never from the original defaults.
///
/// # Example
///
/// ```
/// use cachet_core::{PartialOptions, ResolvedOptions};
/// use std::time::Duration;
///
/// let defaults = PartialOptions::new().ttl("1h").graceful_retain(false, "1h");
/// let item = PartialOptions::new().ttl("10m").graceful_retain(true, "30m");
///
/// let options = ResolvedOptions::resolve(&item, &defaults)?;
/// assert_eq!(options.logical_ttl(), Some(Duration::from_secs(600)));
/// assert_eq!(options.physical_ttl(), Some(Duration::from_secs(1800)));
///
/// let forever = options.clone_with(&PartialOptions::new().no_ttl())?;
/// assert_eq!(forever.logical_ttl(), None);
/// # Ok::<(), cachet_core::OptionsError>(())
/// ```
#[derive(Clone)]
pub struct ResolvedOptions {
    pub(crate) logical_ttl: Option<Duration>,
    pub(crate) physical_ttl: Option<Duration>,
    pub(crate) early_expire_ttl: Option<Duration>,
    pub(crate) graceful_retain: bool,
    pub(crate) timeouts: Option<Timeouts>,
    pub(crate) lock_timeout: Option<Duration>,
    /// Merged layer with every duration already parsed. Acts as the defaults
    /// layer for [`ResolvedOptions::clone_with`].
    pub(crate) layer: PartialOptions,
    pub(crate) parser: Arc<dyn DurationParser>,
}

impl ResolvedOptions {
    /// Resolves `overrides` on top of `defaults` with the default parser.
    pub fn resolve(
        overrides: &PartialOptions,
        defaults: &PartialOptions,
    ) -> Result<Self, OptionsError> {
        OptionsResolver::default().resolve(overrides, defaults)
    }

    /// Resolves a single layer with no defaults.
    pub fn new(options: &PartialOptions) -> Result<Self, OptionsError> {
        Self::resolve(options, &PartialOptions::default())
    }

    /// Derives new options with `overrides` layered on top of this instance.
    ///
    /// The receiver is left untouched.
    pub fn clone_with(&self, overrides: &PartialOptions) -> Result<Self, OptionsError> {
        debug!(?overrides, "cloning cache options");
        OptionsResolver::from_shared(Arc::clone(&self.parser)).resolve(overrides, &self.layer)
    }

    /// How long the value is considered fresh. `None` means it never expires.
    pub fn logical_ttl(&self) -> Option<Duration> {
        self.logical_ttl
    }

    /// How long the value stays in storage.
    pub fn physical_ttl(&self) -> Option<Duration> {
        self.physical_ttl
    }

    /// Lead time before logical expiry at which a background refresh starts.
    pub fn early_expire_ttl(&self) -> Option<Duration> {
        self.early_expire_ttl
    }

    /// Whether stale values may be served while a refresh is in flight.
    pub fn is_graceful_retain_enabled(&self) -> bool {
        self.graceful_retain
    }

    /// Refresh timeouts, `None` when neither is configured.
    pub fn timeouts(&self) -> Option<Timeouts> {
        self.timeouts
    }

    /// How long to wait for a refresh lock held by another caller.
    pub fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout
    }

    /// The normalized layer these options were resolved to.
    pub fn as_partial(&self) -> &PartialOptions {
        &self.layer
    }

    /// Instant at which a value created at `created_at` becomes stale.
    pub fn logical_expiration(&self, created_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.logical_ttl.and_then(|ttl| add(created_at, ttl))
    }

    /// Instant at which a value created at `created_at` leaves storage.
    pub fn physical_expiration(&self, created_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.physical_ttl.and_then(|ttl| add(created_at, ttl))
    }

    /// Instant at which a value created at `created_at` should be refreshed
    /// in the background.
    pub fn early_expiration(&self, created_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let expiration = self.logical_expiration(created_at)?;
        let lead = chrono::Duration::from_std(self.early_expire_ttl?).ok()?;
        expiration.checked_sub_signed(lead)
    }

    /// Whether a value created at `created_at` is stale at `now`.
    pub fn is_logically_expired(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.logical_expiration(created_at)
            .is_some_and(|expiration| now >= expiration)
    }

    /// Whether a value created at `created_at` is due for an early refresh at `now`.
    pub fn should_refresh_early(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.early_expiration(created_at)
            .is_some_and(|refresh_at| now >= refresh_at)
    }
}

// Overflowing instants are treated as "never".
fn add(at: DateTime<Utc>, ttl: Duration) -> Option<DateTime<Utc>> {
    at.checked_add_signed(chrono::Duration::from_std(ttl).ok()?)
}

impl PartialEq for ResolvedOptions {
    fn eq(&self, other: &Self) -> bool {
        self.logical_ttl == other.logical_ttl
            && self.physical_ttl == other.physical_ttl
            && self.early_expire_ttl == other.early_expire_ttl
            && self.graceful_retain == other.graceful_retain
            && self.timeouts == other.timeouts
            && self.lock_timeout == other.lock_timeout
            && self.layer == other.layer
    }
}

impl std::fmt::Debug for ResolvedOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedOptions")
            .field("logical_ttl", &self.logical_ttl)
            .field("physical_ttl", &self.physical_ttl)
            .field("early_expire_ttl", &self.early_expire_ttl)
            .field("graceful_retain", &self.graceful_retain)
            .field("timeouts", &self.timeouts)
            .field("lock_timeout", &self.lock_timeout)
            .field("parser", &"...")
            .finish()
    }
}
