use crate::errors::CliError;
use clap::Args;
use dvp_build::{BuildOptions, BuildOutcome, DEFAULT_UPLOAD_ARTIFACT};
use dvp_config::{resolve_interpreter, Settings, DEFAULT_PLUGIN_CONFIG_FILE};
use dvp_logger as logger;
use std::path::PathBuf;
use tracing::debug;

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    /// Plugin config file
    #[arg(short = 'c', long, default_value = DEFAULT_PLUGIN_CONFIG_FILE)]
    pub plugin_config: PathBuf,

    /// File the upload artifact is written to
    #[arg(short = 'a', long, default_value = DEFAULT_UPLOAD_ARTIFACT)]
    pub upload_artifact: PathBuf,

    /// Only generate code from the schemas, do not build the artifact
    #[arg(short = 'g', long)]
    pub generate_only: bool,

    /// Do not check the plugin id format
    #[arg(long)]
    pub skip_id_validation: bool,

    /// Validate schemas against this meta-schema instead of the bundled one
    #[arg(long, value_name = "PATH")]
    pub meta_schema: Option<PathBuf>,

    /// Python interpreter used to compile and inspect the plugin
    #[arg(long, value_name = "PATH")]
    pub python: Option<PathBuf>,
}

impl BuildCommand {
    fn options(&self, settings: &Settings) -> BuildOptions {
        BuildOptions {
            plugin_config: self.plugin_config.clone(),
            upload_artifact: self.upload_artifact.clone(),
            generate_only: self.generate_only,
            skip_id_validation: self.skip_id_validation,
            meta_schema: self
                .meta_schema
                .clone()
                .or_else(|| settings.meta_schema_path.as_ref().map(PathBuf::from)),
        }
    }
}

pub fn handle_build(cmd: &BuildCommand) -> Result<BuildOutcome, CliError> {
    let settings = Settings::load()?;
    let options = cmd.options(&settings);

    let interpreter = match resolve_interpreter(cmd.python.as_deref(), &settings) {
        Ok(path) => path,
        // Generation alone never starts an interpreter
        Err(e) if cmd.generate_only => {
            debug!("No interpreter available: {}", e);
            PathBuf::from("python")
        }
        Err(e) => return Err(e.into()),
    };

    logger::spinner_start(if cmd.generate_only {
        "Generating plugin code"
    } else {
        "Building plugin"
    });
    let result = dvp_build::build(&options, &interpreter);
    logger::spinner_stop();
    let outcome = result?;

    for (label, messages) in outcome.warnings.iter() {
        for message in messages {
            debug!("[{}] {}", label, message);
        }
    }
    let warning_count = outcome.warnings.count("warning");
    if warning_count > 0 {
        logger::warn(&format!("{} Warning(s). 0 Error(s).", warning_count));
    }

    match &outcome.artifact {
        Some(path) => logger::success(&format!(
            "Successfully generated artifact file at {}.\nBUILD SUCCESSFUL.",
            path.display()
        )),
        None => logger::success("Generating python code only. Skipping artifact build."),
    }
    Ok(outcome)
}
