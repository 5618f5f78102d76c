//! Error types shared by the library modules.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Debug, Error)]
pub enum SyncError {
    /// The request never produced a usable response.
    #[error("failed to reach {target}")]
    Transport {
        target: String,
        #[source]
        source: reqwest::Error,
    },

    /// The remote answered with a status we do not handle.
    #[error("failed to fetch {target}: HTTP {status}")]
    HttpStatus { target: String, status: u16 },

    #[error("remote rate limit exceeded, try again later or provide an API token")]
    RateLimited,

    #[error("path not found: {0}")]
    NotFound(String),

    #[error("failed to parse {what}")]
    Parse {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode {what}")]
    Encode {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to {action} {}", path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("entry {object_type}/{name} not found in remote repository")]
    EntryNotFound { object_type: String, name: String },

    #[error("invalid name '{0}': must be non-empty and must not contain path separators")]
    InvalidName(String),
}

impl SyncError {
    pub(crate) fn fs(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(what: impl Into<String>, source: serde_json::Error) -> Self {
        SyncError::Parse {
            what: what.into(),
            source,
        }
    }

    pub(crate) fn encode(what: impl Into<String>, source: serde_json::Error) -> Self {
        SyncError::Encode {
            what: what.into(),
            source,
        }
    }

    /// True when the remote reported the path as absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::NotFound(_))
    }
}

/// Reject names that could escape the directory they are joined onto.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
    {
        return Err(SyncError::InvalidName(name.to_string()));
    }
    Ok(())
}
