#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod duration;
pub mod error;
pub mod options;
pub mod resolved;
pub mod resolver;
pub mod setting;

pub use duration::{DurationParser, DurationSpec, HumantimeParser, ParseError};
pub use error::OptionsError;
pub use options::{GracefulRetainSpec, PartialOptions, TimeoutsSpec};
pub use resolved::{ResolvedOptions, Timeouts};
pub use resolver::OptionsResolver;
pub use setting::Setting;
