//! Subcommand implementations.

pub mod install;
pub mod list;
pub mod local;
pub mod uninstall;

use anyhow::{Context, Result, anyhow};
use colored::Colorize;
use std::path::PathBuf;

use collsync::remote::{self, CachingSource};
use collsync::{Collection, CollectionFile, Config, Outcome, RemoteSource, Report};

/// Project root plus the configuration that applies to it.
pub struct Workspace {
    pub project_root: PathBuf,
    pub config: Config,
}

impl Workspace {
    pub fn local_root(&self) -> PathBuf {
        self.config.local_root(&self.project_root)
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.config.ledger_path(&self.project_root)
    }

    pub fn open_source(&self) -> Result<CachingSource<Box<dyn RemoteSource>>> {
        remote::open(&self.config).context("Failed to set up remote source")
    }
}

/// Fetch and parse the collection manifest.
pub fn fetch_collections<S: RemoteSource + ?Sized>(source: &S) -> Result<CollectionFile> {
    let data = source.fetch_manifest()?;
    Ok(CollectionFile::parse(&data)?)
}

/// Look up `name`, naming the available collections when it is missing.
pub fn find_collection<'a>(collections: &'a CollectionFile, name: &str) -> Result<&'a Collection> {
    collections.get(name).ok_or_else(|| {
        anyhow!(
            "collection '{}' not found (available: {})",
            name,
            collections.sorted_names().join(", ")
        )
    })
}

pub fn print_report(report: &Report) {
    for entry in &report.entries {
        let files = if entry.files == 1 {
            String::new()
        } else {
            format!(" ({} files)", entry.files)
        };

        match entry.outcome {
            Outcome::Installed => {
                println!("  {} installed: {}{}", "✔".green(), entry.path, files.dimmed())
            }
            Outcome::Updated => {
                println!("  {} updated: {}{}", "↻".yellow(), entry.path, files.dimmed())
            }
            Outcome::Skipped => println!(
                "  {} skipped: {} {}",
                "○".yellow(),
                entry.path,
                "(already exists, not managed)".dimmed()
            ),
            Outcome::Removed => {
                println!("  {} removed: {}{}", "✘".red(), entry.path, files.dimmed())
            }
            Outcome::KeptShared => println!(
                "  {} kept (shared): {} {}",
                "●".cyan(),
                entry.path,
                entry
                    .note
                    .as_deref()
                    .map(|n| format!("({n})"))
                    .unwrap_or_default()
                    .dimmed()
            ),
            Outcome::NotManaged => println!(
                "  {} not managed: {}",
                "○".dimmed(),
                entry.path.dimmed()
            ),
        }
    }
}
