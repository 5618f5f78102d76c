//! collsync - Collection Synchronization
//!
//! Installs named collections of editor rules and commands from a remote
//! repository into a local config folder, and records what it installed so
//! uninstalling only removes files it owns.

pub mod collection;
pub mod config;
pub mod error;
pub mod fs;
pub mod gitignore;
pub mod ledger;
pub mod reconciler;
pub mod remote;

pub use collection::{Collection, CollectionFile};
pub use config::Config;
pub use error::{Result, SyncError};
pub use ledger::{Ledger, LedgerEntry};
pub use reconciler::{EntryReport, Outcome, Reconciler, Report};
pub use remote::RemoteSource;
