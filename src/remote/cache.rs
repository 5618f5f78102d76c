//! Process-lifetime memoization of directory listings.

use std::cell::RefCell;
use std::collections::HashMap;

use super::{Listing, RemoteSource};
use crate::error::Result;

/// Wraps a source and remembers successful `list_directory` results by path.
pub struct CachingSource<S> {
    inner: S,
    listings: RefCell<HashMap<String, Listing>>,
}

impl<S: RemoteSource> CachingSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            listings: RefCell::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: RemoteSource> RemoteSource for CachingSource<S> {
    fn fetch_manifest(&self) -> Result<Vec<u8>> {
        self.inner.fetch_manifest()
    }

    fn list_directory(&self, path: &str) -> Result<Listing> {
        if let Some(cached) = self.listings.borrow().get(path) {
            tracing::debug!(%path, "listing cache hit");
            return Ok(cached.clone());
        }

        let listing = self.inner.list_directory(path)?;
        self.listings
            .borrow_mut()
            .insert(path.to_string(), listing.clone());
        Ok(listing)
    }

    fn download(&self, path: &str) -> Result<Vec<u8>> {
        self.inner.download(path)
    }

    fn root_prefix(&self) -> &str {
        self.inner.root_prefix()
    }
}
