//! Gitignore management
//!
//! Ensures the managed folder is excluded from version control.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;

/// Append `entry` to `<project_root>/.gitignore` unless a line already matches.
///
/// Returns `true` if the file was changed.
pub fn ensure_ignored(project_root: &Path, entry: &str) -> Result<bool> {
    let gitignore_path = project_root.join(".gitignore");

    let existing_content = if gitignore_path.exists() {
        fs::read_to_string(&gitignore_path)
            .with_context(|| format!("Failed to read .gitignore: {}", gitignore_path.display()))?
    } else {
        String::new()
    };

    if contains_entry(&existing_content, entry) {
        println!("  {} .gitignore already lists {}", "○".dimmed(), entry);
        return Ok(false);
    }

    let mut new_content = existing_content;
    if !new_content.is_empty() && !new_content.ends_with('\n') {
        new_content.push('\n');
    }
    new_content.push_str(entry);
    new_content.push('\n');

    fs::write(&gitignore_path, new_content)
        .with_context(|| format!("Failed to write .gitignore: {}", gitignore_path.display()))?;

    println!("  {} Added {} to .gitignore", "✔".green(), entry);
    Ok(true)
}

fn contains_entry(content: &str, entry: &str) -> bool {
    content.lines().any(|line| line.trim() == entry)
}
