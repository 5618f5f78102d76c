use anyhow::{Context, Result};
use colored::Colorize;

use collsync::{Ledger, Outcome, Reconciler};

use super::{Workspace, fetch_collections, find_collection, print_report};

pub fn run_uninstall(name: &str, workspace: &Workspace) -> Result<()> {
    let source = workspace.open_source()?;
    let collections = fetch_collections(&source)?;
    let collection = find_collection(&collections, name)?;

    let ledger = Ledger::load(&workspace.ledger_path()).context("Failed to load ledger")?;
    if !ledger.has_collection(name) {
        tracing::warn!(collection = %name, "collection is not recorded as installed");
    }

    println!(
        "{} {}\n",
        "➤ Uninstalling collection:".cyan().bold(),
        name.bold()
    );

    let mut reconciler = Reconciler::new(&source, workspace.local_root(), ledger);
    let report = reconciler
        .uninstall(collection, name, &collections.collections)
        .with_context(|| format!("Failed to uninstall collection '{name}'"))?;

    print_report(&report);

    println!("\n{}", "✨ Done.".green().bold());
    println!(
        "  Removed: {}, Kept (shared): {}",
        report.count(Outcome::Removed).to_string().green(),
        report.count(Outcome::KeptShared).to_string().cyan()
    );

    Ok(())
}
