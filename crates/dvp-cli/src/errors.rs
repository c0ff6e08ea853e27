use dvp_build::BuildFailedError;
use dvp_config::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Build(#[from] BuildFailedError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Unknown config key: {key}. Supported keys: {supported}")]
    UnknownSetting { key: String, supported: String },
}
