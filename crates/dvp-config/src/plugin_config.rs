//! Plugin config file contents

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PLUGIN_CONFIG_FILE: &str = "plugin_config.yml";
pub const DEFAULT_LOCALE: &str = "en-us";
pub const STAGED_TYPE: &str = "STAGED";
pub const DIRECT_TYPE: &str = "DIRECT";

/// A plugin's `plugin_config.yml`
///
/// Every field tolerates absence so that a partially written config can
/// still drive code generation; completeness is checked by the validator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub host_types: Vec<String>,
    #[serde(default)]
    pub entry_point: String,
    #[serde(default)]
    pub src_dir: String,
    #[serde(default)]
    pub schema_file: String,
    #[serde(default)]
    pub plugin_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_squash_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_discovery: Option<bool>,
}

impl PluginConfig {
    /// `srcDir` relative to the directory holding the config file
    pub fn resolve_src_dir(&self, config_dir: &Path) -> PathBuf {
        config_dir.join(&self.src_dir)
    }

    /// `schemaFile` relative to the directory holding the config file
    pub fn resolve_schema_file(&self, config_dir: &Path) -> PathBuf {
        config_dir.join(&self.schema_file)
    }

    pub fn entry_point(&self) -> Result<EntryPoint, ConfigError> {
        EntryPoint::parse(&self.entry_point)
    }
}

/// `module.path:symbol` reference to the plugin object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    pub module: String,
    pub symbol: String,
}

impl EntryPoint {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let (module, symbol) = raw
            .split_once(':')
            .ok_or_else(|| ConfigError::InvalidEntryPoint(raw.to_string()))?;
        let module = module.trim();
        let symbol = symbol.trim();
        if module.is_empty() || symbol.is_empty() || symbol.contains(':') {
            return Err(ConfigError::InvalidEntryPoint(raw.to_string()));
        }
        Ok(Self {
            module: module.to_string(),
            symbol: symbol.to_string(),
        })
    }

    /// Files that could define the module, relative to the source directory
    pub fn module_candidates(&self) -> [PathBuf; 2] {
        let base: PathBuf = self.module.split('.').collect();
        [base.with_extension("py"), base.join("__init__.py")]
    }

    /// Locate the module file under `src_dir`
    pub fn find_module(&self, src_dir: &Path) -> Option<PathBuf> {
        self.module_candidates()
            .into_iter()
            .map(|candidate| src_dir.join(candidate))
            .find(|path| path.is_file())
    }
}
