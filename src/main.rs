use anyhow::Result;
use clap::{Parser, Subcommand};
use ferry::commands::{self, pick::PickArgs};
use ferry::{FileFilter, PickMode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ferry")]
#[command(about = "Filesystem-mediated IPC between a host and detached helpers", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to <config dir>/ferry/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Record helper command lines instead of spawning helpers
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the namespace directory for this run
    Namespace {
        /// Create the directory as well
        #[arg(long)]
        create: bool,
    },

    /// Open the log console and run until it is closed
    Console {
        /// Stop after this many seconds
        #[arg(long = "for", value_name = "SECS")]
        duration: Option<u64>,
    },

    /// Ask the picker helper for a file or folder
    Pick {
        #[arg(long, value_enum, default_value = "open-file")]
        mode: PickMode,

        /// Directory the dialog starts in (defaults to the home directory)
        #[arg(long)]
        start: Option<PathBuf>,

        /// File type filter, e.g. "Levels|*.gmd *.json" (repeatable)
        #[arg(long = "filter")]
        filters: Vec<FileFilter>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Namespace { create } => {
            commands::init_logging(&config, None)?;
            commands::namespace::execute(&config, create)
        }
        Commands::Console { duration } => {
            commands::console::execute(config, duration, cli.dry_run)
        }
        Commands::Pick {
            mode,
            start,
            filters,
            json,
        } => commands::pick::execute(
            config,
            PickArgs {
                mode,
                start,
                filters,
                json,
            },
            cli.dry_run,
        ),
    }
}
