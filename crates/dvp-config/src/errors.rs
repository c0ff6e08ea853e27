use crate::venv_paths::VenvPathError;
use dvp_schema::{describe_io_error, SchemaError, SchemaValidationError};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading plugin configuration or tool settings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to read plugin config file '{}'\n{}", .path.display(), describe_io_error(.source))]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Plugin config file '{}' is not UTF-8 encoded", .path.display())]
    Encoding { path: PathBuf },

    #[error("Plugin config file '{}' is not valid YAML: {message}", .path.display())]
    InvalidYaml { path: PathBuf, message: String },

    #[error("Plugin config file '{}' must contain a mapping of settings", .path.display())]
    NotAMapping { path: PathBuf },

    #[error("Plugin config file '{}' has an invalid value: {message}", .path.display())]
    InvalidField { path: PathBuf, message: String },

    #[error("Invalid entry point '{0}'. Expected the form 'module.path:symbol'")]
    InvalidEntryPoint(String),

    #[error(transparent)]
    Validation(#[from] SchemaValidationError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Settings file '{}' could not be used: {message}", .path.display())]
    Settings { path: PathBuf, message: String },

    #[error("Could not determine home directory")]
    HomeDirNotFound,

    #[error("Python interpreter not found: {0}")]
    InterpreterNotFound(String),

    #[error(transparent)]
    Venv(#[from] VenvPathError),
}
