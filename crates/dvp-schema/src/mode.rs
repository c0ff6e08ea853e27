//! Severity policy for validation failures
//!
//! A build picks one [`ValidationMode`] and every validation stage reports
//! through the matching [`ValidationReporter`]: abort, warn and continue, or
//! log quietly and continue.

use crate::errors::SchemaValidationError;
use crate::violation::Violation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidationMode {
    #[default]
    Error,
    Warning,
    Info,
}

impl ValidationMode {
    /// Label under which non-fatal messages are recorded
    pub fn label(self) -> &'static str {
        match self {
            ValidationMode::Error => "error",
            ValidationMode::Warning => "warning",
            ValidationMode::Info => "info",
        }
    }

    pub fn reporter(self) -> &'static dyn ValidationReporter {
        match self {
            ValidationMode::Error => &AbortReporter,
            ValidationMode::Warning => &WarnReporter,
            ValidationMode::Info => &InfoReporter,
        }
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label().to_uppercase())
    }
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(ValidationMode::Error),
            "warning" | "warn" => Ok(ValidationMode::Warning),
            "info" => Ok(ValidationMode::Info),
            other => Err(format!(
                "Unknown validation mode '{}'. Expected one of: error, warning, info",
                other
            )),
        }
    }
}

/// Non-fatal messages keyed by severity label, in report order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warnings(BTreeMap<String, Vec<String>>);

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: &str, message: impl Into<String>) {
        self.0.entry(label.to_string()).or_default().push(message.into());
    }

    pub fn get(&self, label: &str) -> &[String] {
        self.0.get(label).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn count(&self, label: &str) -> usize {
        self.get(label).len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    pub fn extend(&mut self, other: Warnings) {
        for (label, messages) in other.0 {
            self.0.entry(label).or_default().extend(messages);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Single reporting interface for every validation site
pub trait ValidationReporter: Sync {
    /// Decide what a set of violations means for the build
    ///
    /// `violations` must already be sorted. Non-fatal reporters record each
    /// violation in `warnings`.
    fn report(
        &self,
        source: &Path,
        violations: Vec<Violation>,
        warnings: &mut Warnings,
    ) -> Result<(), SchemaValidationError>;
}

/// Fails the stage when anything was found
pub struct AbortReporter;

impl ValidationReporter for AbortReporter {
    fn report(
        &self,
        source: &Path,
        violations: Vec<Violation>,
        _warnings: &mut Warnings,
    ) -> Result<(), SchemaValidationError> {
        if violations.is_empty() {
            return Ok(());
        }
        Err(SchemaValidationError {
            path: source.to_path_buf(),
            violations,
        })
    }
}

/// Logs each violation as a warning and lets the build continue
pub struct WarnReporter;

impl ValidationReporter for WarnReporter {
    fn report(
        &self,
        source: &Path,
        violations: Vec<Violation>,
        warnings: &mut Warnings,
    ) -> Result<(), SchemaValidationError> {
        for violation in violations {
            warn!("Validation failed on {}: {}", source.display(), violation);
            warnings.push(ValidationMode::Warning.label(), violation.to_string());
        }
        Ok(())
    }
}

/// Records violations at info level only
pub struct InfoReporter;

impl ValidationReporter for InfoReporter {
    fn report(
        &self,
        source: &Path,
        violations: Vec<Violation>,
        warnings: &mut Warnings,
    ) -> Result<(), SchemaValidationError> {
        for violation in violations {
            info!("Validation failed on {}: {}", source.display(), violation);
            warnings.push(ValidationMode::Info.label(), violation.to_string());
        }
        Ok(())
    }
}
