//! Plugin configuration and tool settings
//!
//! - [`validator`] reads `plugin_config.yml` and checks it
//! - [`settings`] holds the tool's own TOML settings
//! - [`interpreter`] picks the Python interpreter used for plugin code

pub mod errors;
pub mod interpreter;
pub mod plugin_config;
pub mod settings;
pub mod validator;
pub mod venv_paths;

pub use errors::ConfigError;
pub use interpreter::resolve_interpreter;
pub use plugin_config::{
    EntryPoint, PluginConfig, DEFAULT_LOCALE, DEFAULT_PLUGIN_CONFIG_FILE, DIRECT_TYPE, STAGED_TYPE,
};
pub use settings::{Settings, SETTINGS_ENV_VAR, SETTINGS_KEYS};
pub use validator::{read_and_validate, ConfigValidator, ValidatedConfig};
