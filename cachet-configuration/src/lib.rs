#![doc = include_str!("../README.md")]

pub mod error;
pub mod profiles;

pub use error::ConfigError;
pub use profiles::CacheProfiles;
