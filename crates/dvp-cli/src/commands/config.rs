use crate::errors::CliError;
use crate::GlobalOpts;
use clap::Subcommand;
use colored::Colorize;
use dvp_config::{Settings, SETTINGS_KEYS};
use dvp_logger as logger;
use tracing::debug;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Show all configured values
    Show,
    /// Print one value
    Get { key: String },
    /// Set a value. An empty value clears it
    Set { key: String, value: String },
    /// Print the path of the settings file
    Path,
}

pub fn handle_config(action: ConfigAction, opts: &GlobalOpts) -> Result<(), CliError> {
    let path = Settings::path()?;
    debug!("Reading settings from: {}", path.display());

    match action {
        ConfigAction::Show => {
            let settings = Settings::load_from(&path)?;
            println!("{}", "Configuration:".bold().green());
            if settings.is_empty() {
                if opts.verbosity_level() > 0 {
                    println!("  {}", "(empty)".yellow());
                }
            } else {
                for (key, value) in settings.values_iter() {
                    println!("  {}: {}", key.cyan(), value);
                }
            }
        }
        ConfigAction::Get { key } => {
            ensure_known(&key)?;
            let settings = Settings::load_from(&path)?;
            if let Some(value) = settings.get(&key) {
                println!("{}", value);
            }
        }
        ConfigAction::Set { key, value } => {
            let mut settings = Settings::load_from(&path)?;
            if !settings.set(&key, value.clone()) {
                return Err(unknown(&key));
            }
            settings.save_to(&path)?;
            logger::success(&format!("Set {} = {}", key, value));
        }
        ConfigAction::Path => {
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn ensure_known(key: &str) -> Result<(), CliError> {
    if SETTINGS_KEYS.contains(&key) {
        Ok(())
    } else {
        Err(unknown(key))
    }
}

fn unknown(key: &str) -> CliError {
    CliError::UnknownSetting {
        key: key.to_string(),
        supported: SETTINGS_KEYS.join(", "),
    }
}
