//! Plugin capability manifest
//!
//! The entry point is the one place plugin code runs during a build. It is
//! loaded by a [`CapabilityResolver`], which reports the implemented plugin
//! operations; [`ManifestResolver`] turns that into the artifact's
//! `manifest` object and warns about required operations that are missing.

use crate::errors::ManifestError;
use crate::python::{output_text, PythonRunner};
use dvp_config::{EntryPoint, ValidatedConfig, STAGED_TYPE};
use dvp_schema::{ValidationMode, Warnings};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info, warn};

const CAPABILITIES_SCRIPT: &str = include_str!("../resources/capabilities.py");
const REPLY_MARKER: &str = "__DVP_CAPABILITIES__";
const MANIFEST_TYPE: &str = "PluginManifest";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Required,
    /// Required only when the plugin type is STAGED
    RequiredForStaged,
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    /// `group.operation` as found on the plugin object
    pub name: &'static str,
    /// Manifest key recording whether it is implemented
    pub flag: &'static str,
    pub requirement: Requirement,
}

const fn op(name: &'static str, flag: &'static str, requirement: Requirement) -> Operation {
    Operation {
        name,
        flag,
        requirement,
    }
}

pub const OPERATIONS: &[Operation] = &[
    op("discovery.repository", "hasRepositoryDiscovery", Requirement::Required),
    op("discovery.source_config", "hasSourceConfigDiscovery", Requirement::Required),
    op("linked.pre_snapshot", "hasLinkedPreSnapshot", Requirement::Optional),
    op("linked.post_snapshot", "hasLinkedPostSnapshot", Requirement::Required),
    op("linked.start_staging", "hasLinkedStartStaging", Requirement::Optional),
    op("linked.stop_staging", "hasLinkedStopStaging", Requirement::Optional),
    op("linked.status", "hasLinkedStatus", Requirement::Optional),
    op("linked.worker", "hasLinkedWorker", Requirement::Optional),
    op(
        "linked.mount_specification",
        "hasLinkedMountSpecification",
        Requirement::RequiredForStaged,
    ),
    op("virtual.configure", "hasVirtualConfigure", Requirement::Required),
    op("virtual.unconfigure", "hasVirtualUnconfigure", Requirement::Optional),
    op("virtual.reconfigure", "hasVirtualReconfigure", Requirement::Required),
    op("virtual.start", "hasVirtualStart", Requirement::Optional),
    op("virtual.stop", "hasVirtualStop", Requirement::Optional),
    op("virtual.pre_snapshot", "hasVirtualPreSnapshot", Requirement::Optional),
    op("virtual.post_snapshot", "hasVirtualPostSnapshot", Requirement::Required),
    op(
        "virtual.mount_specification",
        "hasVirtualMountSpecification",
        Requirement::Required,
    ),
    op("virtual.status", "hasVirtualStatus", Requirement::Optional),
    op("virtual.initialize", "hasInitialize", Requirement::Optional),
];

/// Loads a plugin entry point and reports which operations it implements
pub trait CapabilityResolver {
    /// Names from `operations` that the plugin object implements
    ///
    /// Any failure to load the module, find the symbol or inspect the
    /// object is an error.
    fn implemented_operations(
        &self,
        src_dir: &Path,
        entry_point: &EntryPoint,
        operations: &[&str],
    ) -> Result<BTreeSet<String>, ManifestError>;
}

/// Imports the entry point in a child interpreter rooted at the source dir
pub struct PythonCapabilityResolver {
    runner: PythonRunner,
}

impl PythonCapabilityResolver {
    pub fn new(runner: PythonRunner) -> Self {
        Self { runner }
    }
}

#[derive(Debug, Deserialize)]
struct Reply {
    #[serde(default)]
    implemented: Option<BTreeMap<String, bool>>,
    #[serde(default)]
    error: Option<String>,
}

impl CapabilityResolver for PythonCapabilityResolver {
    fn implemented_operations(
        &self,
        src_dir: &Path,
        entry_point: &EntryPoint,
        operations: &[&str],
    ) -> Result<BTreeSet<String>, ManifestError> {
        let names = serde_json::to_string(operations).map_err(|e| ManifestError::NoReply {
            message: e.to_string(),
        })?;
        let output = self
            .runner
            .run_script(
                "plugin capability probe",
                CAPABILITIES_SCRIPT,
                &[&entry_point.module, &entry_point.symbol, &names],
                src_dir,
                // Importing must not leave bytecode behind in the source tree
                &[("PYTHONDONTWRITEBYTECODE", "1")],
            )
            .map_err(|source| ManifestError::Spawn {
                interpreter: self.runner.interpreter().to_path_buf(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let Some(line) = stdout
            .lines()
            .rev()
            .find_map(|line| line.strip_prefix(REPLY_MARKER))
        else {
            return Err(ManifestError::NoReply {
                message: output_text(&output),
            });
        };

        let reply: Reply = serde_json::from_str(line).map_err(|e| ManifestError::NoReply {
            message: e.to_string(),
        })?;
        if let Some(error) = reply.error {
            return Err(ManifestError::Import(error));
        }
        Ok(reply
            .implemented
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(name, present)| present.then_some(name))
            .collect())
    }
}

/// Manifest plus any warnings raised while building it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedManifest {
    pub manifest: Map<String, Value>,
    pub warnings: Warnings,
}

pub struct ManifestResolver<'a> {
    resolver: &'a dyn CapabilityResolver,
}

impl<'a> ManifestResolver<'a> {
    pub fn new(resolver: &'a dyn CapabilityResolver) -> Self {
        Self { resolver }
    }

    /// Build the manifest for an already validated config
    ///
    /// With `strict` unset a resolution failure is only a warning and the
    /// manifest is left empty.
    pub fn resolve(
        &self,
        validated: &ValidatedConfig,
        strict: bool,
    ) -> Result<ResolvedManifest, ManifestError> {
        info!(
            "Importing entry point '{}' from {}",
            validated.config.entry_point,
            validated.src_dir.display()
        );
        match self.implemented(validated) {
            Ok(implemented) => Ok(build_manifest(
                &implemented,
                validated.config.plugin_type.eq_ignore_ascii_case(STAGED_TYPE),
            )),
            Err(err) if !strict => {
                warn!(
                    "Skipping manifest for {}: {}",
                    validated.config_path.display(),
                    err
                );
                let mut warnings = Warnings::new();
                warnings.push(ValidationMode::Warning.label(), err.to_string());
                Ok(ResolvedManifest {
                    manifest: Map::new(),
                    warnings,
                })
            }
            Err(err) => Err(err),
        }
    }

    fn implemented(&self, validated: &ValidatedConfig) -> Result<BTreeSet<String>, ManifestError> {
        let entry_point = validated.config.entry_point()?;
        let names: Vec<&str> = OPERATIONS.iter().map(|op| op.name).collect();
        self.resolver
            .implemented_operations(&validated.src_dir, &entry_point, &names)
    }
}

/// Turn the implemented set into manifest flags and missing-method warnings
pub fn build_manifest(implemented: &BTreeSet<String>, staged: bool) -> ResolvedManifest {
    let mut manifest = Map::new();
    let mut warnings = Warnings::new();
    manifest.insert("type".to_string(), Value::from(MANIFEST_TYPE));

    for op in OPERATIONS {
        let present = implemented.contains(op.name);
        manifest.insert(op.flag.to_string(), Value::Bool(present));

        let required = match op.requirement {
            Requirement::Required => true,
            Requirement::RequiredForStaged => staged,
            Requirement::Optional => false,
        };
        if required && !present {
            let message = format!(
                "Implementation missing for required method: {}(). The plugin operation will fail when executed.",
                op.name
            );
            warn!("{}", message);
            warnings.push(ValidationMode::Warning.label(), message);
        }
    }

    debug!(
        "Manifest has {} implemented operation(s)",
        implemented.len()
    );
    ResolvedManifest { manifest, warnings }
}
