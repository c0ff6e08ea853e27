//! The five schema fragments a plugin declares

use crate::errors::SchemaError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

pub const VIRTUAL_SOURCE_DEFINITION: &str = "virtualSourceDefinition";
pub const LINKED_SOURCE_DEFINITION: &str = "linkedSourceDefinition";
pub const REPOSITORY_DEFINITION: &str = "repositoryDefinition";
pub const SOURCE_CONFIG_DEFINITION: &str = "sourceConfigDefinition";
pub const SNAPSHOT_DEFINITION: &str = "snapshotDefinition";

/// Marker key listing the properties that identify an object
pub const IDENTITY_FIELDS: &str = "identityFields";
/// Marker key naming the property used as display name
pub const NAME_FIELD: &str = "nameField";

/// Schema fragments taken from a plugin's schema document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaSet {
    pub virtual_source_definition: Map<String, Value>,
    pub linked_source_definition: Map<String, Value>,
    pub repository_definition: Map<String, Value>,
    pub source_config_definition: Map<String, Value>,
    pub snapshot_definition: Map<String, Value>,
}

impl SchemaSet {
    /// Extract the fragments from a parsed schema document
    ///
    /// Unknown top-level keys are ignored; a missing or non-object fragment
    /// is an error naming the fragment.
    pub fn from_document(path: &Path, document: &Value) -> Result<Self, SchemaError> {
        let fragment = |name: &'static str| -> Result<Map<String, Value>, SchemaError> {
            match document.get(name) {
                Some(Value::Object(map)) => Ok(map.clone()),
                Some(_) => Err(SchemaError::InvalidDefinition {
                    path: path.to_path_buf(),
                    name,
                }),
                None => Err(SchemaError::MissingDefinition {
                    path: path.to_path_buf(),
                    name,
                }),
            }
        };

        Ok(Self {
            virtual_source_definition: fragment(VIRTUAL_SOURCE_DEFINITION)?,
            linked_source_definition: fragment(LINKED_SOURCE_DEFINITION)?,
            repository_definition: fragment(REPOSITORY_DEFINITION)?,
            source_config_definition: fragment(SOURCE_CONFIG_DEFINITION)?,
            snapshot_definition: fragment(SNAPSHOT_DEFINITION)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_document_extracts_all_fragments() {
        let doc = json!({
            "virtualSourceDefinition": {"type": "object", "properties": {}},
            "linkedSourceDefinition": {"type": "object", "properties": {}},
            "repositoryDefinition": {"type": "object", "properties": {}, "identityFields": ["name"]},
            "sourceConfigDefinition": {"type": "object", "properties": {}, "nameField": "name"},
            "snapshotDefinition": {"type": "object", "properties": {}},
            "extra": true
        });
        let set = SchemaSet::from_document(Path::new("schema.json"), &doc);
        assert!(set.is_ok_and(|s| s.repository_definition.contains_key("identityFields")
            && s.source_config_definition["nameField"] == "name"));
    }

    #[test]
    fn test_from_document_reports_missing_fragment() {
        let doc = json!({"virtualSourceDefinition": {}});
        let result = SchemaSet::from_document(Path::new("schema.json"), &doc);
        assert!(matches!(
            result,
            Err(SchemaError::MissingDefinition {
                name: LINKED_SOURCE_DEFINITION,
                ..
            })
        ));
    }

    #[test]
    fn test_from_document_rejects_non_object_fragment() {
        let doc = json!({
            "virtualSourceDefinition": [],
        });
        let result = SchemaSet::from_document(Path::new("schema.json"), &doc);
        assert!(matches!(
            result,
            Err(SchemaError::InvalidDefinition {
                name: VIRTUAL_SOURCE_DEFINITION,
                ..
            })
        ));
    }
}
