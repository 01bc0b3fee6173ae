use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Reasons a deploy options record cannot be handed to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionsError {
    #[error("missing required option `{0}`")]
    MissingField(&'static str),

    #[error(
        "invalid registry URI '{uri}', expected <ACCOUNT_ID>.dkr.ecr.<REGION>.amazonaws.com/<NAME>"
    )]
    InvalidRegistryUri { uri: String },

    #[error("platform deploy requires at least one region")]
    NoRegions,
}
