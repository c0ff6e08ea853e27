//! Choosing the Python interpreter used for compilation and introspection

use crate::errors::ConfigError;
use crate::settings::Settings;
use crate::venv_paths::resolve_python_exe;
use std::path::{Path, PathBuf};
use tracing::debug;
use which::which;

const PATH_CANDIDATES: &[&str] = &["python2.7", "python", "python3"];

/// Pick an interpreter
///
/// Order: explicit path, `python-path` setting, `venv-path` setting, then the
/// first of `python2.7`, `python`, `python3` found on `PATH`.
pub fn resolve_interpreter(
    explicit: Option<&Path>,
    settings: &Settings,
) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return existing(path, "--python");
    }

    if let Some(path) = settings.python_path.as_deref() {
        return existing(Path::new(path), "python-path setting");
    }

    if let Some(venv) = settings.venv_path.as_deref() {
        let exe = resolve_python_exe(Path::new(venv))?;
        debug!("Using interpreter from venv: {}", exe.display());
        return Ok(exe);
    }

    for name in PATH_CANDIDATES {
        if let Ok(found) = which(name) {
            debug!("Using interpreter from PATH: {}", found.display());
            return Ok(found);
        }
    }

    Err(ConfigError::InterpreterNotFound(format!(
        "none of {} found on PATH. Set one with 'dvp config set python-path <path>'",
        PATH_CANDIDATES.join(", ")
    )))
}

fn existing(path: &Path, origin: &str) -> Result<PathBuf, ConfigError> {
    if path.is_file() {
        debug!("Using interpreter from {}: {}", origin, path.display());
        return Ok(path.to_path_buf());
    }
    // Bare names such as "python2.7" are looked up on PATH
    if path.components().count() == 1 {
        if let Ok(found) = which(path) {
            return Ok(found);
        }
    }
    Err(ConfigError::InterpreterNotFound(format!(
        "'{}' from {} does not exist",
        path.display(),
        origin
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_path_wins() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let explicit = temp_dir.path().join("mypython");
        assert!(fs::write(&explicit, "").is_ok());
        let settings = Settings {
            python_path: Some("/nonexistent/python".to_string()),
            ..Default::default()
        };
        let result = resolve_interpreter(Some(&explicit), &settings);
        assert!(result.is_ok_and(|p| p == explicit));
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let result = resolve_interpreter(
            Some(Path::new("/nonexistent/dvp/python")),
            &Settings::default(),
        );
        assert!(matches!(result, Err(ConfigError::InterpreterNotFound(_))));
    }

    #[test]
    fn test_settings_python_path_used() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let configured = temp_dir.path().join("python2.7");
        assert!(fs::write(&configured, "").is_ok());
        let settings = Settings {
            python_path: Some(configured.display().to_string()),
            ..Default::default()
        };
        let result = resolve_interpreter(None, &settings);
        assert!(result.is_ok_and(|p| p == configured));
    }

    #[test]
    fn test_bad_venv_setting_is_error() {
        let settings = Settings {
            venv_path: Some("/nonexistent/dvp/venv".to_string()),
            ..Default::default()
        };
        let result = resolve_interpreter(None, &settings);
        assert!(matches!(result, Err(ConfigError::Venv(_))));
    }
}
