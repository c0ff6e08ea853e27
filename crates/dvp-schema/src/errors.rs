use crate::violation::Violation;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating plugin schemas
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Unable to load schemas from '{}'\n{}", .path.display(), describe_io_error(.source))]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to load schemas because '{}' is not UTF-8 encoded: {message}", .path.display())]
    Encoding { path: PathBuf, message: String },

    #[error("Failed to load schemas because '{}' is not a valid json file. Error: {message}", .path.display())]
    InvalidJson { path: PathBuf, message: String },

    #[error("Meta-schema '{origin}' is not a valid JSON Schema: {message}")]
    InvalidMetaSchema { origin: String, message: String },

    #[error("Schema document '{}' has no '{name}' definition", .path.display())]
    MissingDefinition { path: PathBuf, name: &'static str },

    #[error("Definition '{name}' in '{}' must be a JSON object", .path.display())]
    InvalidDefinition { path: PathBuf, name: &'static str },

    #[error(transparent)]
    Validation(#[from] SchemaValidationError),
}

/// Every violation found in one document, in deterministic order
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", render_validation_failure(.path, .violations))]
pub struct SchemaValidationError {
    pub path: PathBuf,
    pub violations: Vec<Violation>,
}

fn render_validation_failure(path: &std::path::Path, violations: &[Violation]) -> String {
    let mut out = format!(
        "{} validation error(s) found in '{}':",
        violations.len(),
        path.display()
    );
    for violation in violations {
        out.push_str("\n  - ");
        out.push_str(&violation.to_string());
    }
    out
}

/// Render an I/O error with its OS error code for user-facing messages
pub fn describe_io_error(err: &io::Error) -> String {
    match err.raw_os_error() {
        Some(code) => format!("Error code: {}. Error message: {}", code, err),
        None => format!("Error code: {:?}. Error message: {}", err.kind(), err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::violation::PathSegment;

    #[test]
    fn test_validation_error_lists_every_violation() {
        let err = SchemaValidationError {
            path: PathBuf::from("schema.json"),
            violations: vec![
                Violation::new(
                    vec![PathSegment::Key("repositoryDefinition".to_string())],
                    "\"identityFields\" is a required property",
                ),
                Violation::new(
                    vec![PathSegment::Key("sourceConfigDefinition".to_string())],
                    "\"nameField\" is a required property",
                ),
            ],
        };
        let rendered = err.to_string();
        assert!(rendered.starts_with("2 validation error(s) found in 'schema.json':"));
        assert!(rendered.contains("identityFields"));
        assert!(rendered.contains("nameField"));
    }

    #[test]
    fn test_io_error_includes_code() {
        let err = io::Error::from_raw_os_error(2);
        assert!(describe_io_error(&err).starts_with("Error code: 2."));
    }
}
