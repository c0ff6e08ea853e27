//! Upload artifact assembly

use crate::bundler::SourceBundler;
use crate::discovery::{self, DiscoveryDefinition};
use crate::errors::UserError;
use dvp_config::{PluginConfig, DEFAULT_LOCALE, DIRECT_TYPE, STAGED_TYPE};
use dvp_schema::SchemaSet;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{info, warn};

pub const ARTIFACT_TYPE: &str = "Plugin";
pub const VIRTUAL_SOURCE_TYPE: &str = "PluginVirtualSourceDefinition";
pub const STAGED_LINKED_SOURCE_TYPE: &str = "PluginLinkedStagedSourceDefinition";
pub const DIRECT_LINKED_SOURCE_TYPE: &str = "PluginLinkedDirectSourceDefinition";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApiVersion {
    #[serde(rename = "type")]
    pub version_type: &'static str,
    pub major: u32,
    pub minor: u32,
    pub micro: u32,
}

impl ApiVersion {
    const fn new(major: u32, minor: u32, micro: u32) -> Self {
        Self {
            version_type: "APIVersion",
            major,
            minor,
            micro,
        }
    }
}

/// Version of the plugin build API this tool targets
pub const BUILD_API: ApiVersion = ApiVersion::new(1, 0, 1);
/// Oldest engine API the produced artifact runs on
pub const ENGINE_API: ApiVersion = ApiVersion::new(1, 10, 5);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypedDefinition {
    #[serde(rename = "type")]
    pub definition_type: &'static str,
    pub parameters: Map<String, Value>,
}

/// The file handed to the upload step
///
/// Field order is the key order of the written JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadArtifact {
    #[serde(rename = "type")]
    pub artifact_type: &'static str,
    pub name: String,
    pub pretty_name: String,
    pub version: String,
    pub default_locale: String,
    pub language: String,
    pub host_types: Vec<String>,
    pub entry_point: String,
    pub build_api: ApiVersion,
    pub engine_api: ApiVersion,
    pub root_squash_enabled: bool,
    pub source_code: String,
    pub virtual_source_definition: TypedDefinition,
    pub linked_source_definition: TypedDefinition,
    pub discovery_definition: DiscoveryDefinition,
    pub snapshot_schema: Map<String, Value>,
    pub manifest: Map<String, Value>,
}

/// Linked source type for a `pluginType` value
///
/// Only STAGED (any case) selects the staged type. Anything else is
/// treated as DIRECT.
pub fn linked_source_type(plugin_type: &str) -> &'static str {
    if plugin_type.eq_ignore_ascii_case(STAGED_TYPE) {
        return STAGED_LINKED_SOURCE_TYPE;
    }
    if !plugin_type.eq_ignore_ascii_case(DIRECT_TYPE) {
        warn!(
            "Unrecognized pluginType '{}', building a {} plugin",
            plugin_type, DIRECT_TYPE
        );
    }
    DIRECT_LINKED_SOURCE_TYPE
}

pub struct ArtifactAssembler<'a> {
    bundler: SourceBundler<'a>,
}

impl<'a> ArtifactAssembler<'a> {
    pub fn new(bundler: SourceBundler<'a>) -> Self {
        Self { bundler }
    }

    pub fn assemble(
        &self,
        config: &PluginConfig,
        src_dir: &Path,
        schemas: &SchemaSet,
        manifest: Map<String, Value>,
    ) -> Result<UploadArtifact, UserError> {
        let discovery_definition = discovery::transform(
            &schemas.repository_definition,
            &schemas.source_config_definition,
            config.manual_discovery,
        )?;

        info!("Bundling source code from {}", src_dir.display());
        let source_code = self.bundler.bundle(src_dir)?;

        Ok(UploadArtifact {
            artifact_type: ARTIFACT_TYPE,
            // The engine only accepts lower case names
            name: config.id.to_lowercase(),
            pretty_name: config.name.clone(),
            version: config.version.clone(),
            default_locale: config
                .default_locale
                .clone()
                .unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
            language: config.language.clone(),
            host_types: config.host_types.clone(),
            entry_point: config.entry_point.clone(),
            build_api: BUILD_API,
            engine_api: ENGINE_API,
            root_squash_enabled: config.root_squash_enabled.unwrap_or(true),
            source_code,
            virtual_source_definition: TypedDefinition {
                definition_type: VIRTUAL_SOURCE_TYPE,
                parameters: schemas.virtual_source_definition.clone(),
            },
            linked_source_definition: TypedDefinition {
                definition_type: linked_source_type(&config.plugin_type),
                parameters: schemas.linked_source_definition.clone(),
            },
            discovery_definition,
            snapshot_schema: schemas.snapshot_definition.clone(),
            manifest,
        })
    }
}
