//! Reading and validating `plugin_config.yml`

use crate::errors::ConfigError;
use crate::plugin_config::{EntryPoint, PluginConfig};
use dvp_schema::{sort_violations, MetaSchema, ValidationMode, Violation, Warnings};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Shape of a plugin config, checked before any filesystem lookups
pub const BUNDLED_CONFIG_SCHEMA: &str = include_str!("../resources/plugin_config_schema.json");

const BUNDLED_ORIGIN: &str = "<bundled plugin config schema>";

static PLUGIN_ID_PATTERN: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.:-]+$"));

/// A plugin config that passed validation, with its paths resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig {
    pub config: PluginConfig,
    /// Absolute path of the config file
    pub config_path: PathBuf,
    pub config_dir: PathBuf,
    pub src_dir: PathBuf,
    pub schema_file: PathBuf,
    pub warnings: Warnings,
}

impl ValidatedConfig {
    /// Severity policy every later stage of this build shares
    pub fn mode(strict: bool) -> ValidationMode {
        if strict {
            ValidationMode::Error
        } else {
            ValidationMode::Warning
        }
    }
}

pub struct ConfigValidator {
    schema: MetaSchema,
}

impl ConfigValidator {
    pub fn new() -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(BUNDLED_CONFIG_SCHEMA).map_err(|e| {
            dvp_schema::SchemaError::InvalidMetaSchema {
                origin: BUNDLED_ORIGIN.to_string(),
                message: e.to_string(),
            }
        })?;
        Ok(Self {
            schema: MetaSchema::from_value(BUNDLED_ORIGIN, &value)?,
        })
    }

    /// Read `config_path` and validate it
    ///
    /// `strict` reports violations through the ERROR reporter, otherwise
    /// through the WARNING reporter so that a partial config can still be
    /// used for code generation. Storage and parse failures are errors in
    /// both cases.
    pub fn read_and_validate(
        &self,
        config_path: &Path,
        strict: bool,
        skip_id_validation: bool,
    ) -> Result<ValidatedConfig, ConfigError> {
        info!("Reading plugin config file {}", config_path.display());
        let document = read_yaml_mapping(config_path)?;

        let config_path = fs::canonicalize(config_path).map_err(|source| ConfigError::Io {
            path: config_path.to_path_buf(),
            source,
        })?;
        let config_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let mode = ValidatedConfig::mode(strict);
        let document = Value::Object(document);
        let mut violations = self.schema.violations(&document);

        let config: PluginConfig = match serde_json::from_value(document) {
            Ok(config) => config,
            Err(e) => {
                // Type mismatches are already among the schema violations
                mode.reporter()
                    .report(&config_path, violations, &mut Warnings::new())?;
                return Err(ConfigError::InvalidField {
                    path: config_path,
                    message: e.to_string(),
                });
            }
        };

        if !skip_id_validation {
            violations.extend(check_id(&config.id));
        }

        let src_dir = config.resolve_src_dir(&config_dir);
        let schema_file = config.resolve_schema_file(&config_dir);
        violations.extend(check_paths(&config, &src_dir, &schema_file));
        sort_violations(&mut violations);

        debug!(
            "Plugin config {} has {} violation(s), reporting in {} mode",
            config_path.display(),
            violations.len(),
            mode
        );
        let mut warnings = Warnings::new();
        mode.reporter()
            .report(&config_path, violations, &mut warnings)?;

        Ok(ValidatedConfig {
            config,
            config_path,
            config_dir,
            src_dir,
            schema_file,
            warnings,
        })
    }
}

/// Convenience wrapper around [`ConfigValidator::read_and_validate`]
pub fn read_and_validate(
    config_path: &Path,
    strict: bool,
    skip_id_validation: bool,
) -> Result<ValidatedConfig, ConfigError> {
    ConfigValidator::new()?.read_and_validate(config_path, strict, skip_id_validation)
}

fn read_yaml_mapping(path: &Path) -> Result<Map<String, Value>, ConfigError> {
    let bytes = fs::read(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|_| ConfigError::Encoding {
        path: path.to_path_buf(),
    })?;
    let value: Value = serde_yaml::from_str(&text).map_err(|e| ConfigError::InvalidYaml {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ConfigError::NotAMapping {
            path: path.to_path_buf(),
        }),
    }
}

fn check_id(id: &str) -> Option<Violation> {
    // Absence is the schema's concern
    if id.is_empty() {
        return None;
    }
    let valid = match PLUGIN_ID_PATTERN.as_ref() {
        Ok(pattern) => pattern.is_match(id),
        Err(_) => false,
    };
    if valid {
        return None;
    }
    Some(Violation::at_key(
        "id",
        format!(
            "'{}' is not a valid plugin id. Ids may only contain letters, digits and the characters '_', '.', ':' or '-'",
            id
        ),
    ))
}

fn check_paths(config: &PluginConfig, src_dir: &Path, schema_file: &Path) -> Vec<Violation> {
    let mut violations = Vec::new();

    if !config.src_dir.is_empty() && !src_dir.is_dir() {
        violations.push(Violation::at_key(
            "srcDir",
            format!(
                "Source directory '{}' does not exist or is not a directory",
                src_dir.display()
            ),
        ));
    }

    if !config.schema_file.is_empty() && !schema_file.is_file() {
        violations.push(Violation::at_key(
            "schemaFile",
            format!(
                "Schema file '{}' does not exist or is not a file",
                schema_file.display()
            ),
        ));
    }

    // A malformed entry point is reported by the schema pattern
    if !config.src_dir.is_empty() && src_dir.is_dir() {
        if let Ok(entry_point) = EntryPoint::parse(&config.entry_point) {
            if entry_point.find_module(src_dir).is_none() {
                violations.push(Violation::at_key(
                    "entryPoint",
                    format!(
                        "Entry point module '{}' not found in '{}'",
                        entry_point.module,
                        src_dir.display()
                    ),
                ));
            }
        }
    }

    violations
}
