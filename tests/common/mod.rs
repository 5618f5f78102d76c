//! Shared fixtures: a temporary remote mirror and a temporary project.
#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

use collsync::remote::{Listing, MirrorSource};
use collsync::{CollectionFile, Ledger, RemoteSource, Result, SyncError};

pub const PREFIX: &str = "data/.cursor/";

/// A remote repository laid out on disk.
pub struct Mirror {
    dir: TempDir,
}

impl Mirror {
    pub fn new(manifest: &str) -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("collection.json"), manifest).unwrap();
        Self { dir }
    }

    pub fn with_file(self, rel: &str, content: &str) -> Self {
        self.write(rel, content);
        self
    }

    pub fn write(&self, rel: &str, content: &str) {
        let path = self.dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub fn remove(&self, rel: &str) {
        fs::remove_file(self.dir.path().join(rel)).unwrap();
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn source(&self) -> MirrorSource {
        MirrorSource::new(self.dir.path(), PREFIX)
    }

    pub fn collections(&self) -> CollectionFile {
        CollectionFile::parse(&self.source().fetch_manifest().unwrap()).unwrap()
    }
}

/// A project directory with a `.cursor` managed root.
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().join(".cursor")
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.root().join(".collsync.json")
    }

    pub fn ledger(&self) -> Ledger {
        Ledger::load(&self.ledger_path()).unwrap()
    }

    pub fn write(&self, rel: &str, content: &str) {
        let path = self.root().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.root().join(rel)).unwrap()
    }

    /// Every file under the managed root, relative and `/`-separated, sorted.
    pub fn files(&self) -> Vec<String> {
        let root = self.root();
        if !root.exists() {
            return Vec::new();
        }
        let mut files: Vec<String> = WalkDir::new(&root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                e.path()
                    .strip_prefix(&root)
                    .unwrap()
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .collect();
        files.sort();
        files
    }
}

/// Records every `list_directory` call that reaches the wrapped source.
pub struct Recording<S> {
    pub inner: S,
    pub listed: RefCell<Vec<String>>,
}

impl<S> Recording<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            listed: RefCell::new(Vec::new()),
        }
    }

    pub fn times_listed(&self, path: &str) -> usize {
        self.listed.borrow().iter().filter(|p| *p == path).count()
    }
}

impl<S: RemoteSource> RemoteSource for Recording<S> {
    fn fetch_manifest(&self) -> Result<Vec<u8>> {
        self.inner.fetch_manifest()
    }

    fn list_directory(&self, path: &str) -> Result<Listing> {
        self.listed.borrow_mut().push(path.to_string());
        self.inner.list_directory(path)
    }

    fn download(&self, path: &str) -> Result<Vec<u8>> {
        self.inner.download(path)
    }

    fn root_prefix(&self) -> &str {
        self.inner.root_prefix()
    }
}

/// Answers `list_directory` for one path with a rate-limit error.
pub struct RateLimitedAt<S> {
    pub inner: S,
    pub path: String,
}

impl<S> RateLimitedAt<S> {
    pub fn new(inner: S, path: &str) -> Self {
        Self {
            inner,
            path: path.to_string(),
        }
    }
}

impl<S: RemoteSource> RemoteSource for RateLimitedAt<S> {
    fn fetch_manifest(&self) -> Result<Vec<u8>> {
        self.inner.fetch_manifest()
    }

    fn list_directory(&self, path: &str) -> Result<Listing> {
        if path == self.path {
            return Err(SyncError::RateLimited);
        }
        self.inner.list_directory(path)
    }

    fn download(&self, path: &str) -> Result<Vec<u8>> {
        self.inner.download(path)
    }

    fn root_prefix(&self) -> &str {
        self.inner.root_prefix()
    }
}
