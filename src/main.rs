//! collsync CLI
//!
//! Command-line interface for installing and removing collections.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use collsync::{config::Config, gitignore};
use commands::Workspace;

#[derive(Parser)]
#[command(name = "collsync")]
#[command(
    author,
    version,
    about = "Install curated rule and command collections into your local config folder"
)]
#[command(propagate_version = true)]
struct Cli {
    /// Add the managed folder to .gitignore in the project root
    #[arg(short, long, global = true)]
    gitignore: bool,

    /// Project root directory (default: current directory)
    #[arg(short, long, global = true)]
    path: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Read collections from a local directory instead of the remote repository
    #[arg(long, global = true, env = "COLLSYNC_MIRROR")]
    mirror: Option<PathBuf>,

    /// Show detailed output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available collections
    List,

    /// Install a collection
    Install {
        /// Collection name
        name: String,
    },

    /// Uninstall a collection, keeping entries other installed collections still use
    Uninstall {
        /// Collection name
        name: String,
    },

    /// Inspect the local managed folder
    #[command(subcommand)]
    Local(LocalCommand),
}

#[derive(Subcommand)]
enum LocalCommand {
    /// Print the local folder contents in collection manifest format
    List,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("collsync=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let project_root = match cli.path {
        Some(p) => p,
        None => env::current_dir().context("Failed to determine current directory")?,
    };

    let mut config = Config::load_or_default(&project_root, cli.config.as_deref())?;
    if let Some(mirror) = cli.mirror {
        config.remote.mirror = Some(mirror);
    }

    if cli.gitignore
        && let Err(e) = gitignore::ensure_ignored(&project_root, &config.gitignore_entry())
    {
        eprintln!("{} failed to update .gitignore: {:#}", "Warning:".yellow(), e);
    }

    let workspace = Workspace {
        project_root,
        config,
    };

    match cli.command {
        Commands::List => commands::list::run_list(&workspace),
        Commands::Install { name } => commands::install::run_install(&name, &workspace),
        Commands::Uninstall { name } => commands::uninstall::run_uninstall(&name, &workspace),
        Commands::Local(LocalCommand::List) => commands::local::run_local_list(&workspace),
    }
}
