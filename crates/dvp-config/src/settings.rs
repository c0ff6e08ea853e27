//! Persistent tool settings stored as TOML

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the settings file location
pub const SETTINGS_ENV_VAR: &str = "DVP_CONFIG";

/// Keys accepted by `get`/`set`, in display order
pub const SETTINGS_KEYS: &[&str] = &["python-path", "venv-path", "meta-schema-path"];

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub python_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venv_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_schema_path: Option<String>,
}

impl Settings {
    /// Location of the settings file
    ///
    /// `DVP_CONFIG` wins when set and non-empty, otherwise
    /// `~/.config/dvp/dvp.toml` (the platform config dir on Windows).
    pub fn path() -> Result<PathBuf, ConfigError> {
        if let Ok(env_path) = std::env::var(SETTINGS_ENV_VAR) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }

        #[cfg(not(target_os = "windows"))]
        let base = dirs::home_dir()
            .ok_or(ConfigError::HomeDirNotFound)?
            .join(".config");

        #[cfg(target_os = "windows")]
        let base = dirs::config_dir().ok_or(ConfigError::HomeDirNotFound)?;

        Ok(base.join("dvp").join("dvp.toml"))
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Missing file means defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Settings {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Settings {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let settings_error = |message: String| ConfigError::Settings {
            path: path.to_path_buf(),
            message,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| settings_error(e.to_string()))?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| settings_error(e.to_string()))?;
        fs::write(path, content).map_err(|e| settings_error(e.to_string()))
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "python-path" => self.python_path.clone(),
            "venv-path" => self.venv_path.clone(),
            "meta-schema-path" => self.meta_schema_path.clone(),
            _ => None,
        }
    }

    /// Returns false for an unknown key
    pub fn set(&mut self, key: &str, value: String) -> bool {
        let slot = match key {
            "python-path" => &mut self.python_path,
            "venv-path" => &mut self.venv_path,
            "meta-schema-path" => &mut self.meta_schema_path,
            _ => return false,
        };
        *slot = if value.trim().is_empty() {
            None
        } else {
            Some(value)
        };
        true
    }

    pub fn is_empty(&self) -> bool {
        self.python_path.is_none() && self.venv_path.is_none() && self.meta_schema_path.is_none()
    }

    pub fn values_iter(&self) -> Vec<(&'static str, String)> {
        SETTINGS_KEYS
            .iter()
            .filter_map(|key| self.get(key).map(|value| (*key, value)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let result = Settings::load_from(Path::new("/nonexistent/dvp/dvp.toml"));
        assert!(result.is_ok_and(|s| s.is_empty()));
    }

    #[test]
    fn test_save_and_reload() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let path = temp_dir.path().join("nested").join("dvp.toml");
        let mut settings = Settings::default();
        assert!(settings.set("python-path", "/usr/bin/python2.7".to_string()));
        assert!(settings.set("meta-schema-path", "/opt/meta.json".to_string()));
        assert!(settings.save_to(&path).is_ok());

        let loaded = Settings::load_from(&path);
        assert!(loaded.is_ok_and(|s| s == settings));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let mut settings = Settings::default();
        assert!(!settings.set("cache-path", "/tmp".to_string()));
        assert!(settings.get("cache-path").is_none());
        assert!(settings.is_empty());
    }

    #[test]
    fn test_empty_value_clears_key() {
        let mut settings = Settings {
            venv_path: Some("/venv".to_string()),
            ..Default::default()
        };
        assert!(settings.set("venv-path", String::new()));
        assert!(settings.venv_path.is_none());
    }

    #[test]
    fn test_values_iter_order() {
        let settings = Settings {
            python_path: Some("py".to_string()),
            venv_path: None,
            meta_schema_path: Some("meta".to_string()),
        };
        let keys: Vec<&str> = settings.values_iter().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["python-path", "meta-schema-path"]);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let path = temp_dir.path().join("dvp.toml");
        assert!(fs::write(&path, "python_path = [").is_ok());
        assert!(matches!(
            Settings::load_from(&path),
            Err(ConfigError::Settings { .. })
        ));
    }
}
