//! Plugin build pipeline
//!
//! Turns a plugin project (config, schemas, source tree) into the upload
//! artifact consumed by the engine. Plugin code never runs in this process:
//! compilation and entry point inspection happen in child interpreters
//! behind the [`SourceCompiler`] and [`CapabilityResolver`] traits.

pub mod artifact;
pub mod bundler;
pub mod codegen;
pub mod discovery;
pub mod errors;
pub mod manifest;
pub mod pipeline;
pub mod python;
pub mod writer;

pub use artifact::{ArtifactAssembler, UploadArtifact};
pub use bundler::{PythonCompiler, SourceBundler, SourceCompiler};
pub use codegen::{CodeGenerator, ExternalCodeGenerator};
pub use errors::{
    ArtifactError, BuildFailedError, BundleError, CodegenError, DiscoveryError, ManifestError,
    UserError,
};
pub use manifest::{CapabilityResolver, ManifestResolver, PythonCapabilityResolver};
pub use pipeline::{build, BuildOptions, BuildOutcome, Builder, DEFAULT_UPLOAD_ARTIFACT};
pub use python::PythonRunner;
pub use writer::write_artifact;
