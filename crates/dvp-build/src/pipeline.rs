//! The build command
//!
//! Config validation, schema validation, code generation, manifest
//! resolution, assembly and writing, in that order. Any stage failing stops
//! the build with a [`BuildFailedError`].

use crate::artifact::ArtifactAssembler;
use crate::bundler::{PythonCompiler, SourceBundler, SourceCompiler};
use crate::codegen::{CodeGenerator, ExternalCodeGenerator};
use crate::errors::{BuildFailedError, UserError};
use crate::manifest::{CapabilityResolver, ManifestResolver, PythonCapabilityResolver};
use crate::python::PythonRunner;
use crate::writer::write_artifact;
use dvp_config::{ConfigValidator, ValidatedConfig};
use dvp_schema::{MetaSchema, SchemaValidator, ValidationMode, Warnings};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const DEFAULT_UPLOAD_ARTIFACT: &str = "artifact.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub plugin_config: PathBuf,
    pub upload_artifact: PathBuf,
    /// Stop after code generation and tolerate an incomplete config
    pub generate_only: bool,
    pub skip_id_validation: bool,
    /// Meta-schema file to use instead of the bundled one
    pub meta_schema: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildOutcome {
    /// None when only code generation ran
    pub artifact: Option<PathBuf>,
    pub warnings: Warnings,
}

/// A build wired to its external collaborators
pub struct Builder<'a> {
    compiler: &'a dyn SourceCompiler,
    resolver: &'a dyn CapabilityResolver,
    codegen: &'a dyn CodeGenerator,
}

impl<'a> Builder<'a> {
    pub fn new(
        compiler: &'a dyn SourceCompiler,
        resolver: &'a dyn CapabilityResolver,
        codegen: &'a dyn CodeGenerator,
    ) -> Self {
        Self {
            compiler,
            resolver,
            codegen,
        }
    }

    pub fn build(&self, options: &BuildOptions) -> Result<BuildOutcome, BuildFailedError> {
        debug!(
            "Build parameters include plugin_config: {}, upload_artifact: {}, generate_only: {}",
            options.plugin_config.display(),
            options.upload_artifact.display(),
            options.generate_only
        );
        self.run(options).map_err(BuildFailedError::from)
    }

    fn run(&self, options: &BuildOptions) -> Result<BuildOutcome, UserError> {
        let strict = !options.generate_only;
        let mode = ValidatedConfig::mode(strict);
        let mut warnings = Warnings::new();

        info!(
            "Reading and validating plugin config file {}",
            options.plugin_config.display()
        );
        let validated = ConfigValidator::new()?.read_and_validate(
            &options.plugin_config,
            strict,
            options.skip_id_validation,
        )?;
        warnings.extend(validated.warnings.clone());
        debug!("Plugin config content is: {:?}", validated.config);

        let meta_schema = match &options.meta_schema {
            Some(path) => MetaSchema::load(path)?,
            None => MetaSchema::bundled()?,
        };
        info!(
            "Reading and validating schemas from {}",
            validated.schema_file.display()
        );
        let schema_result = SchemaValidator::new(&validated.schema_file, &meta_schema, mode)
            .validate()?;
        warnings.extend(schema_result.warnings);
        let schemas = schema_result.schemas;
        debug!("Source directory path resolved is {}", validated.src_dir.display());

        self.codegen.generate(
            &validated.config.name,
            &validated.src_dir,
            &validated.config_dir,
            &schemas,
        )?;

        if options.generate_only {
            info!("Generating python code only. Skipping artifact build.");
            return Ok(BuildOutcome {
                artifact: None,
                warnings,
            });
        }

        let resolved = ManifestResolver::new(self.resolver).resolve(&validated, strict)?;
        if !resolved.warnings.is_empty() {
            warn!(
                "{} Warning(s). 0 Error(s).",
                resolved.warnings.count(ValidationMode::Warning.label())
            );
        }
        warnings.extend(resolved.warnings);

        let assembler = ArtifactAssembler::new(SourceBundler::new(self.compiler));
        let artifact = assembler.assemble(
            &validated.config,
            &validated.src_dir,
            &schemas,
            resolved.manifest,
        )?;

        write_artifact(&options.upload_artifact, &artifact)?;
        info!(
            "Successfully generated artifact file at {}.",
            options.upload_artifact.display()
        );

        Ok(BuildOutcome {
            artifact: Some(options.upload_artifact.clone()),
            warnings,
        })
    }
}

/// Build with the Python-backed compiler and capability resolver
pub fn build(options: &BuildOptions, interpreter: &Path) -> Result<BuildOutcome, BuildFailedError> {
    let compiler = PythonCompiler::new(PythonRunner::new(interpreter));
    let resolver = PythonCapabilityResolver::new(PythonRunner::new(interpreter));
    Builder::new(&compiler, &resolver, &ExternalCodeGenerator).build(options)
}
