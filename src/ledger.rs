//! Install ledger
//!
//! Records every entry this tool has written into the managed root so that
//! later runs can tell managed content from user-owned content.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::{Result, SyncError};

/// One installed `(object type, entry name)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    #[serde(rename = "type")]
    pub object_type: String,
    pub name: String,
    pub is_dir: bool,
    /// Local file paths, relative to the managed root, `/`-separated.
    #[serde(default)]
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    pub collections: Vec<String>,
    #[serde(default)]
    pub entries: Vec<LedgerEntry>,
    #[serde(skip)]
    path: PathBuf,
}

impl Ledger {
    /// Empty ledger that will be saved to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Load the ledger at `path`, or an empty one if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::new(path));
            }
            Err(e) => return Err(SyncError::fs("read ledger", path, e)),
        };

        let mut ledger: Ledger = serde_json::from_slice(&content)
            .map_err(|e| SyncError::parse(format!("ledger {}", path.display()), e))?;
        ledger.path = path.to_path_buf();
        Ok(ledger)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the ledger, replacing the previous file in one rename.
    pub fn save(&self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| SyncError::fs("create directory", dir, e))?;

        let mut body = serde_json::to_string_pretty(self)
            .map_err(|e| SyncError::encode("ledger", e))?;
        body.push('\n');

        let mut tmp =
            NamedTempFile::new_in(dir).map_err(|e| SyncError::fs("create temp file in", dir, e))?;
        tmp.write_all(body.as_bytes())
            .map_err(|e| SyncError::fs("write ledger", &self.path, e))?;
        tmp.persist(&self.path)
            .map_err(|e| SyncError::fs("write ledger", &self.path, e.error))?;

        tracing::debug!(path = %self.path.display(), entries = self.entries.len(), "ledger saved");
        Ok(())
    }

    pub fn is_managed(&self, object_type: &str, name: &str) -> bool {
        self.get_entry(object_type, name).is_some()
    }

    pub fn get_entry(&self, object_type: &str, name: &str) -> Option<&LedgerEntry> {
        self.entries
            .iter()
            .find(|e| e.object_type == object_type && e.name == name)
    }

    /// Replace the row for the entry's key in place, or append it.
    pub fn add_or_update(&mut self, entry: LedgerEntry) {
        match self
            .entries
            .iter_mut()
            .find(|e| e.object_type == entry.object_type && e.name == entry.name)
        {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Remove and return the row for `(object_type, name)`, if any.
    pub fn remove_entry(&mut self, object_type: &str, name: &str) -> Option<LedgerEntry> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.object_type == object_type && e.name == name)?;
        Some(self.entries.remove(idx))
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.collections.iter().any(|c| c == name)
    }

    pub fn add_collection(&mut self, name: &str) {
        if !self.has_collection(name) {
            self.collections.push(name.to_string());
        }
    }

    pub fn remove_collection(&mut self, name: &str) {
        self.collections.retain(|c| c != name);
    }
}
