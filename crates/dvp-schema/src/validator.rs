//! Validation of a plugin schema document against the plugin meta-schema

use crate::errors::SchemaError;
use crate::mode::{ValidationMode, Warnings};
use crate::types::SchemaSet;
use crate::violation::{collect_violations, Violation};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Meta-schema pinned to the artifact schema version this tool produces
pub const BUNDLED_META_SCHEMA: &str = include_str!("../resources/plugin_meta_schema.json");

const BUNDLED_ORIGIN: &str = "<bundled plugin meta-schema>";

/// A compiled Draft-7 schema used to check other documents
pub struct MetaSchema {
    origin: String,
    validator: jsonschema::Validator,
}

impl MetaSchema {
    /// The meta-schema compiled into the binary
    pub fn bundled() -> Result<Self, SchemaError> {
        let value: Value =
            serde_json::from_str(BUNDLED_META_SCHEMA).map_err(|e| SchemaError::InvalidMetaSchema {
                origin: BUNDLED_ORIGIN.to_string(),
                message: e.to_string(),
            })?;
        Self::from_value(BUNDLED_ORIGIN, &value)
    }

    /// Load a meta-schema from storage
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        debug!("Loading meta-schema from {}", path.display());
        let value = read_json_file(path)?;
        Self::from_value(&path.display().to_string(), &value)
    }

    /// Compile an in-memory schema
    pub fn from_value(origin: &str, schema: &Value) -> Result<Self, SchemaError> {
        let validator =
            jsonschema::draft7::new(schema).map_err(|e| SchemaError::InvalidMetaSchema {
                origin: origin.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            origin: origin.to_string(),
            validator,
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Every violation of this schema in `instance`, sorted by instance path
    pub fn violations(&self, instance: &Value) -> Vec<Violation> {
        collect_violations(&self.validator, instance)
    }
}

impl fmt::Debug for MetaSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaSchema")
            .field("origin", &self.origin)
            .finish()
    }
}

/// Output of a successful validation run
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub schemas: SchemaSet,
    pub warnings: Warnings,
}

/// Reads a plugin schema file and validates it against a meta-schema
///
/// Storage problems (missing file, bad encoding, invalid JSON) are always
/// errors. Content violations go through the reporter for `mode`.
pub struct SchemaValidator<'a> {
    schema_file: PathBuf,
    meta_schema: &'a MetaSchema,
    mode: ValidationMode,
    document: Option<Value>,
}

impl<'a> SchemaValidator<'a> {
    pub fn new(schema_file: &Path, meta_schema: &'a MetaSchema, mode: ValidationMode) -> Self {
        Self {
            schema_file: schema_file.to_path_buf(),
            meta_schema,
            mode,
            document: None,
        }
    }

    /// Validate an already-parsed document instead of reading `schema_file`
    pub fn with_document(mut self, document: Value) -> Self {
        self.document = Some(document);
        self
    }

    pub fn validate(self) -> Result<ValidationResult, SchemaError> {
        let document = match self.document {
            Some(document) => document,
            None => {
                info!("Reading plugin schema file {}", self.schema_file.display());
                read_json_file(&self.schema_file)?
            }
        };

        debug!(
            "Validating {} against {} in {} mode",
            self.schema_file.display(),
            self.meta_schema.origin(),
            self.mode
        );

        // Collected in full before the mode decides anything
        let violations = self.meta_schema.violations(&document);
        let mut warnings = Warnings::new();
        self.mode
            .reporter()
            .report(&self.schema_file, violations, &mut warnings)?;

        let schemas = SchemaSet::from_document(&self.schema_file, &document)?;
        Ok(ValidationResult { schemas, warnings })
    }
}

/// Read and parse a JSON file, classifying storage failures
pub fn read_json_file(path: &Path) -> Result<Value, SchemaError> {
    let bytes = fs::read(path).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|e| SchemaError::Encoding {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&text).map_err(|e| SchemaError::InvalidJson {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::violation::PathSegment;
    use serde_json::json;
    use tempfile::TempDir;

    fn valid_document() -> Value {
        json!({
            "virtualSourceDefinition": {
                "type": "object",
                "properties": {"path": {"type": "string"}}
            },
            "linkedSourceDefinition": {"type": "object", "properties": {}},
            "repositoryDefinition": {
                "type": "object",
                "properties": {"name": {"type": "string"}},
                "identityFields": ["name"],
                "nameField": "name"
            },
            "sourceConfigDefinition": {
                "type": "object",
                "required": ["name"],
                "properties": {"name": {"type": "string"}},
                "identityFields": ["name"],
                "nameField": "name"
            },
            "snapshotDefinition": {"type": "object", "properties": {}}
        })
    }

    fn bundled() -> Option<MetaSchema> {
        MetaSchema::bundled().ok()
    }

    #[test]
    fn test_bundled_meta_schema_compiles() {
        assert!(MetaSchema::bundled().is_ok());
    }

    #[test]
    fn test_valid_document_passes() {
        let Some(meta) = bundled() else {
            assert!(false, "bundled meta-schema must compile");
            return;
        };
        let result = SchemaValidator::new(Path::new("schema.json"), &meta, ValidationMode::Error)
            .with_document(valid_document())
            .validate();
        assert!(result.is_ok_and(|r| r.warnings.is_empty()
            && r.schemas.source_config_definition["nameField"] == "name"));
    }

    #[test]
    fn test_missing_name_field_fails_in_error_mode() {
        let Some(meta) = bundled() else {
            assert!(false, "bundled meta-schema must compile");
            return;
        };
        let mut doc = valid_document();
        if let Some(obj) = doc["sourceConfigDefinition"].as_object_mut() {
            obj.remove("nameField");
        }
        let result = SchemaValidator::new(Path::new("schema.json"), &meta, ValidationMode::Error)
            .with_document(doc)
            .validate();
        let Err(SchemaError::Validation(err)) = result else {
            assert!(false, "expected a schema validation error");
            return;
        };
        assert!(err.violations.iter().any(|v| v.message.contains("nameField")
            && v.path == vec![PathSegment::Key("sourceConfigDefinition".to_string())]));
    }

    #[test]
    fn test_all_violations_collected_not_just_first() {
        let Some(meta) = bundled() else {
            assert!(false, "bundled meta-schema must compile");
            return;
        };
        let mut doc = valid_document();
        if let Some(obj) = doc["sourceConfigDefinition"].as_object_mut() {
            obj.remove("nameField");
        }
        if let Some(obj) = doc["repositoryDefinition"].as_object_mut() {
            obj.remove("identityFields");
        }
        doc["snapshotDefinition"]["type"] = json!("array");

        let result = SchemaValidator::new(Path::new("schema.json"), &meta, ValidationMode::Error)
            .with_document(doc)
            .validate();
        let Err(SchemaError::Validation(err)) = result else {
            assert!(false, "expected a schema validation error");
            return;
        };
        assert!(err.violations.len() >= 3);
    }

    #[test]
    fn test_violation_order_is_deterministic() {
        let Some(meta) = bundled() else {
            assert!(false, "bundled meta-schema must compile");
            return;
        };
        let doc = json!({
            "virtualSourceDefinition": 5,
            "snapshotDefinition": {"type": "array"},
            "repositoryDefinition": {"identityFields": []},
            "sourceConfigDefinition": {}
        });
        let first = meta.violations(&doc);
        let second = meta.violations(&doc);
        assert!(!first.is_empty());
        assert_eq!(first, second);
        let paths: Vec<_> = first.iter().map(|v| v.path.clone()).collect();
        let mut sorted = paths.clone();
        sorted.sort();
        assert_eq!(paths, sorted);
    }

    #[test]
    fn test_warning_mode_continues_with_warnings() {
        let Some(meta) = bundled() else {
            assert!(false, "bundled meta-schema must compile");
            return;
        };
        let mut doc = valid_document();
        doc["virtualSourceDefinition"]["type"] = json!("string");
        let result = SchemaValidator::new(Path::new("schema.json"), &meta, ValidationMode::Warning)
            .with_document(doc)
            .validate();
        assert!(result.is_ok_and(|r| r.warnings.count("warning") >= 1));
    }

    #[test]
    fn test_missing_file_is_storage_error() {
        let Some(meta) = bundled() else {
            assert!(false, "bundled meta-schema must compile");
            return;
        };
        let result = SchemaValidator::new(
            Path::new("/nonexistent/dvp/schema.json"),
            &meta,
            ValidationMode::Warning,
        )
        .validate();
        assert!(matches!(result, Err(SchemaError::Io { .. })));
        if let Err(err) = result {
            assert!(err.to_string().contains("Error code:"));
        }
    }

    #[test]
    fn test_invalid_json_and_encoding_are_distinct() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let bad_json = temp_dir.path().join("bad.json");
        let bad_utf8 = temp_dir.path().join("latin1.json");
        assert!(fs::write(&bad_json, "{\"repositoryDefinition\": ").is_ok());
        assert!(fs::write(&bad_utf8, [0x7b, 0xff, 0xfe, 0x7d]).is_ok());

        assert!(matches!(
            read_json_file(&bad_json),
            Err(SchemaError::InvalidJson { .. })
        ));
        assert!(matches!(
            read_json_file(&bad_utf8),
            Err(SchemaError::Encoding { .. })
        ));
    }

    #[test]
    fn test_meta_schema_loaded_from_file() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let path = temp_dir.path().join("meta.json");
        let meta = json!({
            "type": "object",
            "required": ["snapshotDefinition"]
        });
        assert!(fs::write(&path, meta.to_string()).is_ok());

        let loaded = MetaSchema::load(&path);
        assert!(loaded.is_ok_and(|m| m.violations(&json!({})).len() == 1));
    }

    #[test]
    fn test_invalid_meta_schema_rejected() {
        let result = MetaSchema::from_value("inline", &json!({"type": 12}));
        assert!(matches!(result, Err(SchemaError::InvalidMetaSchema { .. })));
    }
}
