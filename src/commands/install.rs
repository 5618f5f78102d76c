use anyhow::{Context, Result};
use colored::Colorize;

use collsync::{Ledger, Outcome, Reconciler};

use super::{Workspace, fetch_collections, find_collection, print_report};

pub fn run_install(name: &str, workspace: &Workspace) -> Result<()> {
    let source = workspace.open_source()?;
    let collections = fetch_collections(&source)?;
    let collection = find_collection(&collections, name)?;

    let ledger_path = workspace.ledger_path();
    let ledger = Ledger::load(&ledger_path).context("Failed to load ledger")?;

    println!(
        "{} {}\n",
        "➤ Installing collection:".cyan().bold(),
        name.bold()
    );

    let mut reconciler = Reconciler::new(&source, workspace.local_root(), ledger);
    let report = reconciler
        .install(collection, name)
        .with_context(|| format!("Failed to install collection '{name}'"))?;

    print_report(&report);

    println!("\n{}", "✨ Done.".green().bold());
    println!(
        "  Installed: {}, Updated: {}, Skipped: {}",
        report.count(Outcome::Installed).to_string().green(),
        report.count(Outcome::Updated).to_string().yellow(),
        report.count(Outcome::Skipped).to_string().dimmed()
    );

    Ok(())
}
