use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use kursy::core::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for kursy::AppCommand {
    fn from(cmd: Commands) -> kursy::AppCommand {
        match cmd {
            Commands::Currencies => kursy::AppCommand::Currencies,
            Commands::Rates { codes } => kursy::AppCommand::Rates { codes },
            Commands::Sync { codes } => kursy::AppCommand::Sync { codes },
            Commands::Export { codes, output } => kursy::AppCommand::Export { codes, output },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List the known currency codes
    Currencies,
    /// Fetch current exchange rates without saving them
    Rates { codes: Vec<String> },
    /// Fetch exchange rates and merge them into the local store
    Sync { codes: Vec<String> },
    /// Export stored rates as CSV
    Export {
        codes: Vec<String>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => kursy::setup::setup(),
        Some(cmd) => kursy::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
