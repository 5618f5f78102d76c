//! Install/uninstall reconciliation
//!
//! Decides, for every entry of a collection, what shape it has remotely
//! (directory, single file, or a file named without its extension), whether a
//! local copy may be written, and how the ledger changes as a result.
//!
//! Local paths that exist but are not recorded in the ledger belong to the
//! user and are never overwritten.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::collection::{self, Collection};
use crate::error::{Result, SyncError, validate_name};
use crate::fs::{prune_empty_dirs, remove_file_if_exists, write_file};
use crate::ledger::{Ledger, LedgerEntry};
use crate::remote::{RemoteEntry, RemoteSource};

/// What happened to one entry (or one file of an entry).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Installed,
    Updated,
    /// Local path exists and is not managed
    Skipped,
    Removed,
    /// Still referenced by another installed collection
    KeptShared,
    /// Listed by the collection but not in the ledger
    NotManaged,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Installed => "installed",
            Outcome::Updated => "updated",
            Outcome::Skipped => "skipped",
            Outcome::Removed => "removed",
            Outcome::KeptShared => "kept (shared)",
            Outcome::NotManaged => "not managed",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    pub object_type: String,
    pub name: String,
    /// Local path relative to the managed root
    pub path: String,
    pub files: usize,
    pub outcome: Outcome,
    pub note: Option<String>,
}

/// Result of an install or uninstall run
#[derive(Debug, Default)]
pub struct Report {
    pub entries: Vec<EntryReport>,
}

impl Report {
    pub fn count(&self, outcome: Outcome) -> usize {
        self.entries.iter().filter(|e| e.outcome == outcome).count()
    }

    fn push(&mut self, object_type: &str, name: &str, path: String, files: usize, outcome: Outcome) {
        tracing::info!(%object_type, %name, %path, %outcome, "entry reconciled");
        self.entries.push(EntryReport {
            object_type: object_type.to_string(),
            name: name.to_string(),
            path,
            files,
            outcome,
            note: None,
        });
    }
}

/// Name of a file without its last extension (`b.md` → `b`, `a.tar.gz` → `a.tar`).
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => &name[..idx],
        None => name,
    }
}

/// Applies collections from a remote source to a managed root.
pub struct Reconciler<'a, S: ?Sized> {
    source: &'a S,
    root: PathBuf,
    ledger: Ledger,
}

impl<'a, S: RemoteSource + ?Sized> Reconciler<'a, S> {
    pub fn new(source: &'a S, root: impl Into<PathBuf>, ledger: Ledger) -> Self {
        Self {
            source,
            root: root.into(),
            ledger,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn into_ledger(self) -> Ledger {
        self.ledger
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Install every entry of `collection`, then record `name` and save the
    /// ledger. On error the ledger is left as it was; files already written
    /// stay on disk.
    pub fn install(&mut self, collection: &Collection, name: &str) -> Result<Report> {
        let snapshot = self.ledger.clone();
        let mut report = Report::default();

        let result = collection::entries(collection)
            .try_for_each(|(object_type, entry)| {
                self.install_entry(object_type, entry, &mut report)
                    .inspect_err(|e| {
                        tracing::warn!(%object_type, %entry, error = %e, "install aborted");
                    })
            })
            .and_then(|()| {
                self.ledger.add_collection(name);
                self.ledger.save()
            });

        if let Err(e) = result {
            self.ledger = snapshot;
            return Err(e);
        }
        Ok(report)
    }

    /// Remove the entries of `collection` that no other installed collection
    /// still references, then drop `name` from the ledger and save it.
    ///
    /// `all` is the full manifest; installed collections missing from it no
    /// longer hold references.
    pub fn uninstall(
        &mut self,
        collection: &Collection,
        name: &str,
        all: &BTreeMap<String, Collection>,
    ) -> Result<Report> {
        let snapshot = self.ledger.clone();
        let mut report = Report::default();

        let result = collection::entries(collection)
            .try_for_each(|(object_type, entry)| {
                self.uninstall_entry(object_type, entry, name, all, &mut report)
            })
            .and_then(|()| {
                self.ledger.remove_collection(name);
                self.ledger.save()
            });

        if let Err(e) = result {
            self.ledger = snapshot;
            return Err(e);
        }
        Ok(report)
    }

    fn install_entry(&mut self, object_type: &str, entry: &str, report: &mut Report) -> Result<()> {
        validate_name(object_type)?;
        validate_name(entry)?;

        // An exact match always wins over the extension-less fallback.
        match self.source.list_directory(&format!("{object_type}/{entry}")) {
            Ok(listing) if listing.is_directory => {
                self.install_directory(object_type, entry, &listing.entries, report)
            }
            Ok(listing) => match listing.entries.first() {
                Some(file) => self.install_single_file(object_type, entry, file, report),
                None => Err(SyncError::EntryNotFound {
                    object_type: object_type.to_string(),
                    name: entry.to_string(),
                }),
            },
            Err(e) if e.is_not_found() => self.install_by_name(object_type, entry, report),
            Err(e) => Err(e),
        }
    }

    fn install_directory(
        &mut self,
        object_type: &str,
        entry: &str,
        contents: &[RemoteEntry],
        report: &mut Report,
    ) -> Result<()> {
        let rel_dir = format!("{object_type}/{entry}");
        let local_dir = self.local_path(&rel_dir)?;
        let managed = self.ledger.is_managed(object_type, entry);

        if exists(&local_dir) && !managed {
            report.push(object_type, entry, rel_dir, 0, Outcome::Skipped);
            return Ok(());
        }

        std::fs::create_dir_all(&local_dir)
            .map_err(|e| SyncError::fs("create directory", &local_dir, e))?;

        let mut files = Vec::new();
        for remote in contents.iter().filter(|c| c.is_file()) {
            validate_name(&remote.name)?;
            let rel = format!("{rel_dir}/{}", remote.name);
            let local = self.local_path(&rel)?;

            // A managed directory may still hold files the user added.
            if exists(&local) && !self.owns(object_type, entry, &rel) {
                tracing::warn!(path = %rel, "keeping unmanaged file inside managed directory");
                continue;
            }

            let data = self.source.download(&rel)?;
            write_file(&local, &data)?;
            files.push(rel);
        }

        let count = files.len();
        self.record(object_type, entry, true, files)?;
        report.push(object_type, entry, rel_dir, count, outcome_for(managed));
        Ok(())
    }

    fn install_single_file(
        &mut self,
        object_type: &str,
        entry: &str,
        remote: &RemoteEntry,
        report: &mut Report,
    ) -> Result<()> {
        validate_name(&remote.name)?;
        let rel = format!("{object_type}/{}", remote.name);
        let managed = self.ledger.is_managed(object_type, entry);

        if exists(&self.local_path(&rel)?) && !self.owns(object_type, entry, &rel) {
            report.push(object_type, entry, rel, 0, Outcome::Skipped);
            return Ok(());
        }

        self.fetch_file(remote, &rel)?;
        self.record(object_type, entry, false, vec![rel.clone()])?;
        report.push(object_type, entry, rel, 1, outcome_for(managed));
        Ok(())
    }

    /// Match files in the object type's directory whose extension-less name
    /// equals `entry`.
    fn install_by_name(&mut self, object_type: &str, entry: &str, report: &mut Report) -> Result<()> {
        let not_found = || SyncError::EntryNotFound {
            object_type: object_type.to_string(),
            name: entry.to_string(),
        };

        let listing = match self.source.list_directory(object_type) {
            Ok(listing) if listing.is_directory => listing,
            Ok(_) => return Err(not_found()),
            Err(e) if e.is_not_found() => return Err(not_found()),
            Err(e) => return Err(e),
        };

        let matches: Vec<&RemoteEntry> = listing
            .entries
            .iter()
            .filter(|c| c.is_file() && strip_extension(&c.name) == entry)
            .collect();
        if matches.is_empty() {
            return Err(not_found());
        }

        let managed = self.ledger.is_managed(object_type, entry);
        let mut files = Vec::new();
        for remote in matches {
            validate_name(&remote.name)?;
            let rel = format!("{object_type}/{}", remote.name);

            if exists(&self.local_path(&rel)?) && !self.owns(object_type, entry, &rel) {
                report.push(object_type, entry, rel, 0, Outcome::Skipped);
                continue;
            }

            self.fetch_file(remote, &rel)?;
            report.push(object_type, entry, rel.clone(), 1, outcome_for(managed));
            files.push(rel);
        }

        // Every match was user-owned: leave the entry unmanaged.
        if files.is_empty() {
            return Ok(());
        }
        self.record(object_type, entry, false, files)
    }

    fn uninstall_entry(
        &mut self,
        object_type: &str,
        entry: &str,
        collection_name: &str,
        all: &BTreeMap<String, Collection>,
        report: &mut Report,
    ) -> Result<()> {
        let Some(recorded) = self.ledger.get_entry(object_type, entry).cloned() else {
            report.push(
                object_type,
                entry,
                format!("{object_type}/{entry}"),
                0,
                Outcome::NotManaged,
            );
            return Ok(());
        };
        let path = display_path(&recorded);

        if let Some(other) = self.shared_with(object_type, entry, collection_name, all) {
            report.push(object_type, entry, path, recorded.files.len(), Outcome::KeptShared);
            if let Some(last) = report.entries.last_mut() {
                last.note = Some(format!("used by {other}"));
            }
            return Ok(());
        }

        for file in &recorded.files {
            let local = self.local_path(file)?;
            if !remove_file_if_exists(&local)? {
                tracing::debug!(path = %local.display(), "file already gone");
            }
            if let Some(parent) = local.parent() {
                prune_empty_dirs(parent, &self.root)?;
            }
        }
        if recorded.is_dir {
            prune_empty_dirs(&self.local_path(&format!("{object_type}/{entry}"))?, &self.root)?;
        }

        self.ledger.remove_entry(object_type, entry);
        report.push(object_type, entry, path, recorded.files.len(), Outcome::Removed);
        Ok(())
    }

    /// Whether the ledger records `rel` as written by a previous install.
    fn owns(&self, object_type: &str, entry: &str, rel: &str) -> bool {
        self.ledger
            .get_entry(object_type, entry)
            .is_some_and(|e| e.files.iter().any(|f| f == rel))
    }

    /// First other installed collection that still lists the entry.
    fn shared_with(
        &self,
        object_type: &str,
        entry: &str,
        collection_name: &str,
        all: &BTreeMap<String, Collection>,
    ) -> Option<String> {
        self.ledger
            .collections
            .iter()
            .filter(|c| c.as_str() != collection_name)
            .find(|c| {
                all.get(c.as_str())
                    .is_some_and(|col| collection::references(col, object_type, entry))
            })
            .cloned()
    }

    fn fetch_file(&self, remote: &RemoteEntry, rel: &str) -> Result<()> {
        let data = self.source.download(self.source.relative_path(&remote.path))?;
        write_file(&self.local_path(rel)?, &data)
    }

    /// Store the new file set, deleting files the previous install owned but
    /// the new one no longer provides.
    fn record(&mut self, object_type: &str, entry: &str, is_dir: bool, files: Vec<String>) -> Result<()> {
        if let Some(previous) = self.ledger.get_entry(object_type, entry) {
            let stale: Vec<String> = previous
                .files
                .iter()
                .filter(|f| !files.contains(*f))
                .cloned()
                .collect();
            for file in stale {
                let local = self.local_path(&file)?;
                if remove_file_if_exists(&local)? {
                    tracing::debug!(path = %local.display(), "removed stale file");
                }
                if let Some(parent) = local.parent() {
                    prune_empty_dirs(parent, &self.root)?;
                }
            }
        }

        self.ledger.add_or_update(LedgerEntry {
            object_type: object_type.to_string(),
            name: entry.to_string(),
            is_dir,
            files,
        });
        Ok(())
    }

    /// Resolve a `/`-separated path relative to the managed root.
    fn local_path(&self, rel: &str) -> Result<PathBuf> {
        let mut path = self.root.clone();
        for segment in rel.split('/') {
            validate_name(segment)?;
            path.push(segment);
        }
        Ok(path)
    }
}

fn outcome_for(managed: bool) -> Outcome {
    if managed {
        Outcome::Updated
    } else {
        Outcome::Installed
    }
}

fn exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

fn display_path(entry: &LedgerEntry) -> String {
    match entry.files.as_slice() {
        [single] if !entry.is_dir => single.clone(),
        _ => format!("{}/{}", entry.object_type, entry.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension("b.md"), "b");
        assert_eq!(strip_extension("clean-code.mdc"), "clean-code");
        assert_eq!(strip_extension("archive.tar.gz"), "archive.tar");
        assert_eq!(strip_extension("README"), "README");
        assert_eq!(strip_extension(".hidden"), "");
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(Outcome::KeptShared.to_string(), "kept (shared)");
        assert_eq!(outcome_for(true), Outcome::Updated);
        assert_eq!(outcome_for(false), Outcome::Installed);
    }

    #[test]
    fn test_display_path() {
        let file = LedgerEntry {
            object_type: "commands".into(),
            name: "b".into(),
            is_dir: false,
            files: vec!["commands/b.md".into()],
        };
        assert_eq!(display_path(&file), "commands/b.md");

        let dir = LedgerEntry {
            object_type: "rules".into(),
            name: "a".into(),
            is_dir: true,
            files: vec!["rules/a/x.md".into()],
        };
        assert_eq!(display_path(&dir), "rules/a");
    }
}
