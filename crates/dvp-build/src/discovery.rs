//! Discovery definition for the upload artifact
//!
//! The schema file splits discovery into `repositoryDefinition` and
//! `sourceConfigDefinition`, each carrying its own `identityFields` and
//! `nameField`. The artifact wants those keys lifted out next to the
//! remaining schemas under new names.

use crate::errors::DiscoveryError;
use dvp_schema::types::{
    IDENTITY_FIELDS, NAME_FIELD, REPOSITORY_DEFINITION, SOURCE_CONFIG_DEFINITION,
};
use serde::Serialize;
use serde_json::{Map, Value};

pub const DISCOVERY_DEFINITION_TYPE: &str = "PluginDiscoveryDefinition";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryDefinition {
    #[serde(rename = "type")]
    pub definition_type: &'static str,
    pub manual_source_config_discovery: bool,
    pub repository_identity_fields: Value,
    pub repository_name_field: Option<Value>,
    pub repository_schema: Map<String, Value>,
    pub source_config_identity_fields: Option<Value>,
    pub source_config_name_field: Value,
    pub source_config_schema: Map<String, Value>,
}

/// Build the discovery definition from copies of both fragments
///
/// The repository fragment must carry `identityFields`; its `nameField` is
/// optional. The source-config fragment must carry `nameField`; its
/// `identityFields` is optional. `manual_discovery` defaults to true.
pub fn transform(
    repository: &Map<String, Value>,
    source_config: &Map<String, Value>,
    manual_discovery: Option<bool>,
) -> Result<DiscoveryDefinition, DiscoveryError> {
    let mut repository_schema = repository.clone();
    let mut source_config_schema = source_config.clone();

    let repository_identity_fields =
        repository_schema
            .remove(IDENTITY_FIELDS)
            .ok_or(DiscoveryError::MissingKey {
                definition: REPOSITORY_DEFINITION,
                key: IDENTITY_FIELDS,
            })?;
    let repository_name_field = repository_schema.remove(NAME_FIELD);

    let source_config_identity_fields = source_config_schema.remove(IDENTITY_FIELDS);
    let source_config_name_field =
        source_config_schema
            .remove(NAME_FIELD)
            .ok_or(DiscoveryError::MissingKey {
                definition: SOURCE_CONFIG_DEFINITION,
                key: NAME_FIELD,
            })?;

    Ok(DiscoveryDefinition {
        definition_type: DISCOVERY_DEFINITION_TYPE,
        manual_source_config_discovery: manual_discovery.unwrap_or(true),
        repository_identity_fields,
        repository_name_field,
        repository_schema,
        source_config_identity_fields,
        source_config_name_field,
        source_config_schema,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    fn repository() -> Map<String, Value> {
        as_map(json!({
            "type": "object",
            "properties": {"name": {"type": "string"}},
            "identityFields": ["name"],
            "nameField": "name"
        }))
    }

    fn source_config() -> Map<String, Value> {
        as_map(json!({
            "type": "object",
            "properties": {"path": {"type": "string"}},
            "identityFields": ["path"],
            "nameField": "path"
        }))
    }

    #[test]
    fn test_keys_are_lifted_and_renamed() {
        let result = transform(&repository(), &source_config(), None);
        let Ok(definition) = result else {
            assert!(false, "transform should succeed");
            return;
        };
        assert_eq!(definition.repository_identity_fields, json!(["name"]));
        assert_eq!(definition.repository_name_field, Some(json!("name")));
        assert_eq!(definition.source_config_identity_fields, Some(json!(["path"])));
        assert_eq!(definition.source_config_name_field, json!("path"));
        assert!(!definition.repository_schema.contains_key("identityFields"));
        assert!(!definition.source_config_schema.contains_key("nameField"));
        assert!(definition.manual_source_config_discovery);
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let repo = repository();
        let source = source_config();
        let (repo_before, source_before) = (repo.clone(), source.clone());
        assert!(transform(&repo, &source, Some(false)).is_ok());
        assert_eq!(repo, repo_before);
        assert_eq!(source, source_before);
    }

    #[test]
    fn test_optional_keys_become_null() {
        let mut repo = repository();
        repo.remove("nameField");
        let mut source = source_config();
        source.remove("identityFields");

        let result = transform(&repo, &source, Some(false));
        let Ok(definition) = result else {
            assert!(false, "optional keys may be absent");
            return;
        };
        assert!(!definition.manual_source_config_discovery);
        let rendered = serde_json::to_value(&definition).unwrap_or_default();
        assert_eq!(rendered["repositoryNameField"], Value::Null);
        assert_eq!(rendered["sourceConfigIdentityFields"], Value::Null);
        assert_eq!(rendered["type"], "PluginDiscoveryDefinition");
    }

    #[test]
    fn test_required_keys_are_enforced() {
        let mut repo = repository();
        repo.remove("identityFields");
        assert_eq!(
            transform(&repo, &source_config(), None),
            Err(DiscoveryError::MissingKey {
                definition: "repositoryDefinition",
                key: "identityFields",
            })
        );

        let mut source = source_config();
        source.remove("nameField");
        assert_eq!(
            transform(&repository(), &source, None),
            Err(DiscoveryError::MissingKey {
                definition: "sourceConfigDefinition",
                key: "nameField",
            })
        );
    }
}
