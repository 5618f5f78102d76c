//! File system utilities.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Result, SyncError};

/// Write `data` to `path`, creating missing parent directories.
pub fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| SyncError::fs("create directory", parent, e))?;
    }
    fs::write(path, data).map_err(|e| SyncError::fs("write", path, e))
}

/// Remove a file. Returns `false` if it was already gone.
pub fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(SyncError::fs("remove", path, e)),
    }
}

/// Remove `start` and each of its ancestors while they are empty, stopping
/// before `stop`. `start` must be inside `stop`.
pub fn prune_empty_dirs(start: &Path, stop: &Path) -> Result<()> {
    let mut current = start;

    while current != stop && current.starts_with(stop) {
        let is_empty = match fs::read_dir(current) {
            Ok(mut entries) => entries.next().is_none(),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // Already gone; keep walking up.
                match current.parent() {
                    Some(parent) => {
                        current = parent;
                        continue;
                    }
                    None => break,
                }
            }
            Err(e) => return Err(SyncError::fs("read directory", current, e)),
        };

        if !is_empty {
            break;
        }

        fs::remove_dir(current).map_err(|e| SyncError::fs("remove directory", current, e))?;
        tracing::debug!(dir = %current.display(), "removed empty directory");

        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }

    Ok(())
}
