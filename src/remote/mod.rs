//! Remote collection sources
//!
//! A remote source exposes the collection manifest, directory listings and raw
//! file downloads, all addressed by paths relative to a fixed remote root.

pub mod cache;
pub mod github;
pub mod mirror;

pub use cache::CachingSource;
pub use github::GithubSource;
pub use mirror::MirrorSource;

use serde::Deserialize;

use crate::config::Config;
use crate::error::Result;

/// Kind of a remote listing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    /// Symlinks, submodules and anything else we do not install.
    #[serde(other)]
    Other,
}

/// One object in a remote listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteEntry {
    pub name: String,
    /// Path from the repository root, including the remote root prefix.
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub download_url: Option<String>,
}

impl RemoteEntry {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// Result of listing a remote path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    /// `true` if the path is a directory; otherwise `entries` holds the single file.
    pub is_directory: bool,
    pub entries: Vec<RemoteEntry>,
}

/// Interface to wherever collections are published.
pub trait RemoteSource {
    /// Raw bytes of the collection manifest.
    fn fetch_manifest(&self) -> Result<Vec<u8>>;

    /// List `path` (relative to the remote root). Absent paths yield
    /// [`SyncError::NotFound`](crate::SyncError::NotFound).
    fn list_directory(&self, path: &str) -> Result<Listing>;

    /// Raw bytes of the file at `path` (relative to the remote root).
    fn download(&self, path: &str) -> Result<Vec<u8>>;

    /// Prefix carried by [`RemoteEntry::path`] in front of the remote-root-relative path.
    fn root_prefix(&self) -> &str;

    /// Strip [`root_prefix`](Self::root_prefix) from a listing path.
    fn relative_path<'a>(&self, entry_path: &'a str) -> &'a str {
        entry_path
            .strip_prefix(self.root_prefix())
            .unwrap_or(entry_path)
    }
}

impl<S: RemoteSource + ?Sized> RemoteSource for Box<S> {
    fn fetch_manifest(&self) -> Result<Vec<u8>> {
        (**self).fetch_manifest()
    }

    fn list_directory(&self, path: &str) -> Result<Listing> {
        (**self).list_directory(path)
    }

    fn download(&self, path: &str) -> Result<Vec<u8>> {
        (**self).download(path)
    }

    fn root_prefix(&self) -> &str {
        (**self).root_prefix()
    }
}

/// Build the source described by the configuration, wrapped in a listing cache.
pub fn open(config: &Config) -> Result<CachingSource<Box<dyn RemoteSource>>> {
    let inner: Box<dyn RemoteSource> = match &config.remote.mirror {
        Some(dir) => {
            tracing::debug!(mirror = %dir.display(), "using local mirror");
            Box::new(MirrorSource::new(dir, &config.remote.root_prefix))
        }
        None => Box::new(GithubSource::from_config(&config.remote)?),
    };
    Ok(CachingSource::new(inner))
}
