//! Plugin schema validation
//!
//! This crate checks a plugin's schema document against the meta-schema for
//! the pinned artifact version and decides, through a [`ValidationMode`],
//! whether violations stop the build or are only reported.
//!
//! Violations are always collected in full and sorted by instance path
//! before any decision is made, so reports are stable across runs.

pub mod errors;
pub mod mode;
pub mod types;
pub mod validator;
pub mod violation;

pub use errors::{describe_io_error, SchemaError, SchemaValidationError};
pub use mode::{
    AbortReporter, InfoReporter, ValidationMode, ValidationReporter, WarnReporter, Warnings,
};
pub use types::SchemaSet;
pub use validator::{read_json_file, MetaSchema, SchemaValidator, ValidationResult};
pub use violation::{collect_violations, sort_violations, PathSegment, Violation};
