use std::time::Duration;

use cachet_configuration::{CacheProfiles, ConfigError};
use cachet_core::{OptionsError, Setting};
use pretty_assertions::assert_eq;

const PROFILES: &str = r#"
defaults:
  ttl: 1h
  early_expiration: 0.1
  timeouts:
    soft: 1s
    hard: 10s
profiles:
  users:
    ttl: 10m
    grace:
      enabled: true
      duration: 30m
  sessions:
    ttl: ~
    timeouts:
      soft: 500
  reports:
    graceful_retain:
      enabled: true
"#;

fn minutes(n: u64) -> Duration {
    Duration::from_secs(n * 60)
}

#[test]
fn test_profiles_deserialize() {
    let profiles = CacheProfiles::from_yaml(PROFILES).expect("failed to deserialize");

    assert_eq!(
        profiles.names().collect::<Vec<_>>(),
        vec!["users", "sessions", "reports"]
    );
    assert_eq!(profiles.profiles["sessions"].ttl, Setting::Cleared);
    assert_eq!(profiles.profiles["reports"].ttl, Setting::Absent);
}

#[test]
fn test_defaults_resolve() {
    let profiles = CacheProfiles::from_yaml(PROFILES).unwrap();

    let defaults = profiles.resolve_defaults().unwrap();

    assert_eq!(defaults.logical_ttl(), Some(minutes(60)));
    assert_eq!(defaults.early_expire_ttl(), Some(minutes(6)));
    assert!(!defaults.is_graceful_retain_enabled());
}

#[test]
fn test_profile_overrides_defaults() {
    let profiles = CacheProfiles::from_yaml(PROFILES).unwrap();

    let users = profiles.resolve("users").unwrap();

    assert_eq!(users.logical_ttl(), Some(minutes(10)));
    assert_eq!(users.physical_ttl(), Some(minutes(30)));
    assert_eq!(users.early_expire_ttl(), Some(minutes(1)));
    let timeouts = users.timeouts().unwrap();
    assert_eq!(timeouts.soft, Some(Duration::from_secs(1)));
    assert_eq!(timeouts.hard, Some(Duration::from_secs(10)));
}

#[test]
fn test_profile_clears_ttl_and_keeps_sibling_timeout() {
    let profiles = CacheProfiles::from_yaml(PROFILES).unwrap();

    let sessions = profiles.resolve("sessions").unwrap();

    assert_eq!(sessions.logical_ttl(), None);
    assert_eq!(sessions.physical_ttl(), None);
    assert_eq!(sessions.early_expire_ttl(), None);
    let timeouts = sessions.timeouts().unwrap();
    assert_eq!(timeouts.soft, Some(Duration::from_millis(500)));
    assert_eq!(timeouts.hard, Some(Duration::from_secs(10)));
}

#[test]
fn test_graceful_retain_without_duration_uses_ttl() {
    let profiles = CacheProfiles::from_yaml(PROFILES).unwrap();

    let reports = profiles.resolve("reports").unwrap();

    assert!(reports.is_graceful_retain_enabled());
    assert_eq!(reports.physical_ttl(), Some(minutes(60)));
}

#[test]
fn test_resolve_all_keeps_order() {
    let profiles = CacheProfiles::from_yaml(PROFILES).unwrap();

    let resolved = profiles.resolve_all().unwrap();

    assert_eq!(
        resolved.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["users", "sessions", "reports"]
    );
    assert_eq!(resolved["users"], profiles.resolve("users").unwrap());
}

#[test]
fn test_unknown_profile() {
    let profiles = CacheProfiles::from_yaml(PROFILES).unwrap();

    let err = profiles.resolve("orders").unwrap_err();

    assert!(matches!(err, ConfigError::UnknownProfile(name) if name == "orders"));
}

#[test]
fn test_invalid_profile_is_reported_by_name() {
    let yaml = r#"
defaults:
  ttl: 1h
profiles:
  broken:
    early_expiration: 1.5
"#;
    let profiles = CacheProfiles::from_yaml(yaml).unwrap();

    let err = profiles.resolve("broken").unwrap_err();

    match err {
        ConfigError::Profile { profile, source } => {
            assert_eq!(profile, "broken");
            assert!(matches!(source, OptionsError::Range { .. }));
        }
        other => panic!("expected profile error, got {other:?}"),
    }
    assert!(profiles.resolve_all().is_err());
}

#[test]
fn test_invalid_defaults_fail_every_profile() {
    let yaml = r#"
defaults:
  ttl: forever
profiles:
  users:
    ttl: 10m
"#;
    let profiles = CacheProfiles::from_yaml(yaml).unwrap();

    let err = profiles.resolve("users").unwrap_err();

    assert!(matches!(
        err,
        ConfigError::Options(OptionsError::Parse { field: "ttl", .. })
    ));
}

#[test]
fn test_unknown_key_is_rejected() {
    let yaml = r#"
defaults:
  tll: 1h
"#;
    assert!(matches!(
        CacheProfiles::from_yaml(yaml),
        Err(ConfigError::Yaml(_))
    ));
}

#[test]
fn test_profiles_from_json() {
    let json = r#"{
        "defaults": { "ttl": "1h" },
        "profiles": { "users": { "ttl": 600000, "lock_timeout": "2s" } }
    }"#;

    let profiles = CacheProfiles::from_json(json).unwrap();
    let users = profiles.resolve("users").unwrap();

    assert_eq!(users.logical_ttl(), Some(minutes(10)));
    assert_eq!(users.lock_timeout(), Some(Duration::from_secs(2)));
}
