//! Remote source backed by a local directory.
//!
//! The directory mirrors the published layout: the manifest sits at
//! `collection.json` and object types are top-level directories.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{EntryKind, Listing, RemoteEntry, RemoteSource};
use crate::error::{Result, SyncError};

/// Manifest file name inside a mirror.
pub const MANIFEST_FILE: &str = "collection.json";

#[derive(Debug, Clone)]
pub struct MirrorSource {
    root: PathBuf,
    prefix: String,
}

impl MirrorSource {
    /// `prefix` is prepended to every listing path, matching what the HTTP
    /// source reports.
    pub fn new(root: impl Into<PathBuf>, prefix: &str) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.to_string(),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|s| !s.is_empty())
            .fold(self.root.clone(), |acc, seg| acc.join(seg))
    }

    fn entry_for(&self, relative: &str, name: &str, kind: EntryKind) -> RemoteEntry {
        RemoteEntry {
            name: name.to_string(),
            path: format!("{}{}", self.prefix, relative),
            kind,
            download_url: None,
        }
    }
}

fn read(path: &Path, what: &str) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => SyncError::NotFound(what.to_string()),
        _ => SyncError::fs("read", path, e),
    })
}

impl RemoteSource for MirrorSource {
    fn fetch_manifest(&self) -> Result<Vec<u8>> {
        read(&self.root.join(MANIFEST_FILE), MANIFEST_FILE)
    }

    fn list_directory(&self, path: &str) -> Result<Listing> {
        let local = self.resolve(path);
        let relative = path.trim_matches('/');

        let meta = match fs::metadata(&local) {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SyncError::NotFound(path.to_string()));
            }
            Err(e) => return Err(SyncError::fs("read", &local, e)),
        };

        if !meta.is_dir() {
            let name = relative.rsplit('/').next().unwrap_or(relative);
            return Ok(Listing {
                is_directory: false,
                entries: vec![self.entry_for(relative, name, EntryKind::File)],
            });
        }

        let mut entries = Vec::new();
        for item in WalkDir::new(&local)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let item = item.map_err(|e| {
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory loop"));
                SyncError::fs("read directory", &local, source)
            })?;
            let name = item.file_name().to_string_lossy().into_owned();
            let ty = item.file_type();
            let kind = if ty.is_dir() {
                EntryKind::Dir
            } else if ty.is_file() {
                EntryKind::File
            } else {
                EntryKind::Other
            };
            let child = if relative.is_empty() {
                name.clone()
            } else {
                format!("{relative}/{name}")
            };
            entries.push(self.entry_for(&child, &name, kind));
        }

        Ok(Listing {
            is_directory: true,
            entries,
        })
    }

    fn download(&self, path: &str) -> Result<Vec<u8>> {
        read(&self.resolve(path), path)
    }

    fn root_prefix(&self) -> &str {
        &self.prefix
    }
}
