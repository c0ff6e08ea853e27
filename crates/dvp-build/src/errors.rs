use dvp_config::ConfigError;
use dvp_schema::{describe_io_error, SchemaError};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Loading the plugin entry point and reading its capabilities
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to start Python interpreter '{}'\n{}", .interpreter.display(), describe_io_error(.source))]
    Spawn {
        interpreter: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    Import(String),

    #[error("Plugin entry point could not be inspected: {message}")]
    NoReply { message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Rewriting repository and source-config definitions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("'{definition}' is missing the required key '{key}'")]
    MissingKey {
        definition: &'static str,
        key: &'static str,
    },
}

/// Compiling, archiving and encoding the source tree
#[derive(Error, Debug)]
pub enum BundleError {
    #[error("Failed to read source code directory {}. {}", .path.display(), describe_io_error(.source))]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to compile source code in the directory {}.\n{output}", .path.display())]
    Compile { path: PathBuf, output: String },

    #[error("Failed to start Python interpreter '{}'\n{}", .interpreter.display(), describe_io_error(.source))]
    Spawn {
        interpreter: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to archive source code in the directory {}: {message}", .path.display())]
    Archive { path: PathBuf, message: String },
}

/// Serializing and storing the upload artifact
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Failed to write upload_artifact file to {}. {}", .path.display(), describe_io_error(.source))]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize upload artifact: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Code generation for '{plugin}' failed: {message}")]
    Failed { plugin: String, message: String },
}

/// Any failure the user can act on
#[derive(Error, Debug)]
pub enum UserError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Bundle(#[from] BundleError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Codegen(#[from] CodegenError),
}

/// Top-level failure of a build
#[derive(Error, Debug)]
#[error("{source}\n\nBUILD FAILED.")]
pub struct BuildFailedError {
    #[from]
    pub source: UserError,
}
