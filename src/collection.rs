//! Collection manifest model
//!
//! The remote manifest maps collection names to object types (e.g. `rules`,
//! `commands`) and each object type to an ordered list of entry names.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, SyncError};

/// A single collection: object type → entry names.
///
/// Object types iterate in lexicographic order; entry order is preserved.
pub type Collection = BTreeMap<String, Vec<String>>;

/// Top-level manifest document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionFile {
    #[serde(default)]
    pub collections: BTreeMap<String, Collection>,
}

impl CollectionFile {
    /// Parse manifest bytes.
    pub fn parse(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data).map_err(|e| SyncError::parse("collection manifest", e))
    }

    /// Collection names in lexicographic order.
    pub fn sorted_names(&self) -> Vec<&str> {
        self.collections.keys().map(String::as_str).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    /// Pretty-printed JSON in the same shape as the remote manifest.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| SyncError::encode("collection manifest", e))
    }

    /// Wrap a single collection under the given name.
    pub fn single(name: &str, collection: Collection) -> Self {
        let mut collections = BTreeMap::new();
        collections.insert(name.to_string(), collection);
        Self { collections }
    }
}

/// Iterate every `(object_type, entry_name)` pair of a collection in order.
pub fn entries(collection: &Collection) -> impl Iterator<Item = (&str, &str)> {
    collection
        .iter()
        .flat_map(|(ty, names)| names.iter().map(move |n| (ty.as_str(), n.as_str())))
}

/// True when the collection lists `name` under `object_type`.
pub fn references(collection: &Collection, object_type: &str, name: &str) -> bool {
    collection
        .get(object_type)
        .is_some_and(|names| names.iter().any(|n| n == name))
}
