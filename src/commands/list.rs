use anyhow::Result;
use colored::Colorize;

use collsync::Collection;

use super::{Workspace, fetch_collections};

pub fn run_list(workspace: &Workspace) -> Result<()> {
    let source = workspace.open_source()?;
    let collections = fetch_collections(&source)?;

    if collections.collections.is_empty() {
        println!("{}", "No collections available.".dimmed());
        return Ok(());
    }

    let blocks: Vec<String> = collections
        .collections
        .iter()
        .map(|(name, collection)| render_collection(name, collection))
        .collect();
    println!("{}", blocks.join("\n"));

    Ok(())
}

/// One block per collection: a bold header and one row per object type.
fn render_collection(name: &str, collection: &Collection) -> String {
    let width = collection.keys().map(String::len).max().unwrap_or(0);

    let mut out = format!("{}\n", name.bold());
    for (object_type, entries) in collection {
        let label = format!("{object_type:<width$}");
        out.push_str(&format!("  {}  {}\n", label.cyan(), entries.join(", ")));
    }
    out
}
