use anyhow::{Context, Result, bail};
use std::path::Path;
use walkdir::WalkDir;

use collsync::reconciler::strip_extension;
use collsync::{Collection, CollectionFile};

use super::Workspace;

pub fn run_local_list(workspace: &Workspace) -> Result<()> {
    let root = workspace.local_root();
    if !root.is_dir() {
        bail!(
            "{}/ directory not found in {}",
            workspace.config.local.root,
            workspace.project_root.display()
        );
    }

    let collection = scan_local(&root)?;
    let document = CollectionFile::single("local", collection);
    println!("{}", document.to_json()?);

    Ok(())
}

/// Describe the managed root as a collection: each top-level directory is an
/// object type, its subdirectories and extension-less file names are entries.
fn scan_local(root: &Path) -> Result<Collection> {
    let mut collection = Collection::new();

    for object_dir in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let object_dir =
            object_dir.with_context(|| format!("Failed to read {}", root.display()))?;
        if !object_dir.file_type().is_dir() {
            continue;
        }

        let mut items = Vec::new();
        for child in WalkDir::new(object_dir.path())
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let child = match child {
                Ok(child) => child,
                Err(e) => {
                    tracing::warn!(dir = %object_dir.path().display(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            let name = child.file_name().to_string_lossy();
            if child.file_type().is_dir() {
                items.push(name.into_owned());
            } else {
                items.push(strip_extension(&name).to_string());
            }
        }

        if !items.is_empty() {
            let object_type = object_dir.file_name().to_string_lossy().into_owned();
            collection.insert(object_type, items);
        }
    }

    Ok(collection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_local_shapes_tree_as_collection() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("rules/common")).unwrap();
        fs::write(root.join("rules/common/x.md"), "x").unwrap();
        fs::write(root.join("rules/style.mdc"), "s").unwrap();
        fs::create_dir_all(root.join("commands")).unwrap();
        fs::write(root.join("commands/review.md"), "r").unwrap();
        fs::create_dir_all(root.join("empty")).unwrap();
        fs::write(root.join(".collsync.json"), "{}").unwrap();

        let collection = scan_local(root).unwrap();

        assert_eq!(collection.len(), 2);
        assert_eq!(collection["rules"], vec!["common", "style"]);
        assert_eq!(collection["commands"], vec!["review"]);
    }

    #[test]
    fn test_scan_local_empty_root() {
        let temp_dir = TempDir::new().unwrap();
        assert!(scan_local(temp_dir.path()).unwrap().is_empty());
    }
}
