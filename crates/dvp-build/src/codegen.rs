use crate::errors::CodegenError;
use dvp_schema::SchemaSet;
use std::path::Path;
use tracing::info;

/// Generates plugin classes from validated schemas
///
/// Runs after schema validation and before the source tree is bundled, so
/// generated files end up in the artifact.
pub trait CodeGenerator {
    fn generate(
        &self,
        plugin_name: &str,
        src_dir: &Path,
        config_dir: &Path,
        schemas: &SchemaSet,
    ) -> Result<(), CodegenError>;
}

/// Leaves generation to an external tool and only records the request
pub struct ExternalCodeGenerator;

impl CodeGenerator for ExternalCodeGenerator {
    fn generate(
        &self,
        plugin_name: &str,
        src_dir: &Path,
        config_dir: &Path,
        _schemas: &SchemaSet,
    ) -> Result<(), CodegenError> {
        info!(
            "Code generation for '{}' is handled outside dvp (source {}, project {})",
            plugin_name,
            src_dir.display(),
            config_dir.display()
        );
        Ok(())
    }
}
