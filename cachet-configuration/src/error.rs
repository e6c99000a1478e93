use cachet_core::OptionsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid YAML profiles: {0}")]
    Yaml(String),

    #[error("invalid JSON profiles: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown cache profile `{0}`")]
    UnknownProfile(String),

    #[error("profile `{profile}`: {source}")]
    Profile {
        profile: String,
        #[source]
        source: OptionsError,
    },

    #[error(transparent)]
    Options(#[from] OptionsError),
}
