//! Three-state option values.
//!
//! A cache option can be left unspecified, explicitly switched off, or set to
//! a concrete value. Plain [`Option`] conflates the first two, which breaks
//! layering: an explicit "no ttl" must win over a default ttl and must keep
//! winning after the options are cloned with further overrides.

use serde::{Deserialize, Deserializer};

/// A single option value inside one configuration layer.
///
/// When deserialized, a missing key (with `#[serde(default)]`) becomes
/// [`Setting::Absent`] and an explicit `null` becomes [`Setting::Cleared`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting<T> {
    /// Not mentioned in this layer; inherit from the layer below.
    Absent,
    /// Explicitly switched off in this layer.
    Cleared,
    /// Explicitly set in this layer.
    Value(T),
}

impl<T> Default for Setting<T> {
    fn default() -> Self {
        Setting::Absent
    }
}

impl<T> Setting<T> {
    /// Returns `true` if this layer does not mention the option.
    pub fn is_absent(&self) -> bool {
        matches!(self, Setting::Absent)
    }

    /// Returns `true` if this layer explicitly cleared the option.
    pub fn is_cleared(&self) -> bool {
        matches!(self, Setting::Cleared)
    }

    /// Converts from `&Setting<T>` to `Setting<&T>`.
    pub fn as_ref(&self) -> Setting<&T> {
        match self {
            Setting::Absent => Setting::Absent,
            Setting::Cleared => Setting::Cleared,
            Setting::Value(value) => Setting::Value(value),
        }
    }

    /// Maps the contained value, keeping `Absent` and `Cleared` as they are.
    pub fn map<U, F>(self, f: F) -> Setting<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Setting::Absent => Setting::Absent,
            Setting::Cleared => Setting::Cleared,
            Setting::Value(value) => Setting::Value(f(value)),
        }
    }

    /// Fallible version of [`Setting::map`].
    pub fn try_map<U, E, F>(self, f: F) -> Result<Setting<U>, E>
    where
        F: FnOnce(T) -> Result<U, E>,
    {
        Ok(match self {
            Setting::Absent => Setting::Absent,
            Setting::Cleared => Setting::Cleared,
            Setting::Value(value) => Setting::Value(f(value)?),
        })
    }

    /// Collapses the setting at the read boundary.
    ///
    /// Both `Absent` and `Cleared` become `None`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Setting::Value(value) => Some(value),
            Setting::Absent | Setting::Cleared => None,
        }
    }
}

impl<T: Clone> Setting<T> {
    /// Layers `over` on top of `under`.
    ///
    /// Anything but `Absent` in `over` wins, including `Cleared`.
    pub fn merge(over: &Setting<T>, under: &Setting<T>) -> Setting<T> {
        match over {
            Setting::Absent => under.clone(),
            explicit => explicit.clone(),
        }
    }
}

impl<T> From<Option<T>> for Setting<T> {
    /// `None` is treated as an explicit clear, never as absence.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Setting::Value(value),
            None => Setting::Cleared,
        }
    }
}

impl<'de, T> Deserialize<'de> for Setting<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Setting::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_explicit_layer() {
        let under = Setting::Value(1);

        assert_eq!(Setting::merge(&Setting::Absent, &under), Setting::Value(1));
        assert_eq!(Setting::merge(&Setting::Cleared, &under), Setting::Cleared);
        assert_eq!(Setting::merge(&Setting::Value(2), &under), Setting::Value(2));
        assert_eq!(
            Setting::<i32>::merge(&Setting::Absent, &Setting::Absent),
            Setting::Absent
        );
    }

    #[test]
    fn test_into_option_collapses_absent_and_cleared() {
        assert_eq!(Setting::<u8>::Absent.into_option(), None);
        assert_eq!(Setting::<u8>::Cleared.into_option(), None);
        assert_eq!(Setting::Value(3u8).into_option(), Some(3));
    }
}
