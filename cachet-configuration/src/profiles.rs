use cachet_core::{OptionsResolver, PartialOptions, ResolvedOptions};
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

/// Named cache option profiles layered over shared defaults.
///
/// ```yaml
/// defaults:
///   ttl: 1h
///   timeouts: { soft: 1s, hard: 10s }
/// profiles:
///   users:
///     ttl: 10m
///     graceful_retain: { enabled: true, duration: 6h }
///   sessions:
///     ttl: ~
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheProfiles {
    /// Layer shared by every profile.
    pub defaults: PartialOptions,
    /// Named layers resolved on top of the defaults.
    pub profiles: IndexMap<String, PartialOptions>,
}

impl CacheProfiles {
    /// Parses profiles from a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_saphyr::from_str(yaml).map_err(|err| ConfigError::Yaml(err.to_string()))
    }

    /// Parses profiles from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Profile names in document order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Resolves the defaults layer on its own.
    pub fn resolve_defaults(&self) -> Result<ResolvedOptions, ConfigError> {
        self.resolve_defaults_with(&OptionsResolver::default())
    }

    /// Resolves the defaults layer with a custom resolver.
    pub fn resolve_defaults_with(
        &self,
        resolver: &OptionsResolver,
    ) -> Result<ResolvedOptions, ConfigError> {
        Ok(resolver.resolve(&self.defaults, &PartialOptions::default())?)
    }

    /// Resolves the defaults and layers the named profile on top.
    pub fn resolve(&self, profile: &str) -> Result<ResolvedOptions, ConfigError> {
        self.resolve_with(&OptionsResolver::default(), profile)
    }

    /// Like [`CacheProfiles::resolve`], with a custom resolver.
    pub fn resolve_with(
        &self,
        resolver: &OptionsResolver,
        profile: &str,
    ) -> Result<ResolvedOptions, ConfigError> {
        let overrides = self
            .profiles
            .get(profile)
            .ok_or_else(|| ConfigError::UnknownProfile(profile.to_owned()))?;
        let defaults = self.resolve_defaults_with(resolver)?;
        debug!(profile, "resolving cache profile");
        defaults
            .clone_with(overrides)
            .map_err(|source| ConfigError::Profile {
                profile: profile.to_owned(),
                source,
            })
    }

    /// Resolves every profile, stopping at the first invalid one.
    pub fn resolve_all(&self) -> Result<IndexMap<String, ResolvedOptions>, ConfigError> {
        let defaults = self.resolve_defaults()?;
        self.profiles
            .iter()
            .map(|(name, overrides)| {
                defaults
                    .clone_with(overrides)
                    .map(|options| (name.clone(), options))
                    .map_err(|source| ConfigError::Profile {
                        profile: name.clone(),
                        source,
                    })
            })
            .collect()
    }
}
