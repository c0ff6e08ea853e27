use clap::{Parser, Subcommand};
use dvp::{
    commands::{
        build::{self, BuildCommand},
        config::{self, ConfigAction},
    },
    GlobalOpts,
};
use dvp_logger as logger;

#[derive(Parser)]
#[command(name = "dvp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Virtualization plugin build tool",
    long_about = "dvp validates a plugin project and packages it into an upload artifact."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the plugin's upload artifact
    Build(BuildCommand),
    /// Configure dvp
    #[command(subcommand_required = false, arg_required_else_help = false)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init_with_verbosity(cli.global.verbosity_level()) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }

    match cli.command {
        Commands::Build(cmd) => {
            if let Err(e) = build::handle_build(&cmd) {
                logger::error(&e.to_string());
                logger::show_log_path();
                std::process::exit(1);
            }
        }
        Commands::Config { action } => {
            let action = action.unwrap_or(ConfigAction::Show);
            if let Err(e) = config::handle_config(action, &cli.global) {
                logger::error(&e.to_string());
                std::process::exit(1);
            }
        }
    }
}
