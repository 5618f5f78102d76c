//! Configuration parsing for collsync
//!
//! An optional TOML file tells the tool where collections are published and
//! where the managed folder lives. Every field has a default.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "collsync.toml";

/// Default managed root, relative to the project root
pub const DEFAULT_LOCAL_ROOT: &str = ".cursor";

/// Default ledger file name, stored inside the managed root
pub const DEFAULT_LEDGER_FILE: &str = ".collsync.json";

/// Root configuration structure
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Where collections are fetched from
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Where collections are installed to
    #[serde(default)]
    pub local: LocalConfig,
}

/// Remote repository settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// URL of the collection manifest
    pub manifest_url: String,

    /// Base URL of the directory-listing API
    pub contents_url: String,

    /// Base URL for raw file downloads
    pub raw_url: String,

    /// Prefix carried by listing paths in front of the remote root
    pub root_prefix: String,

    /// Per-request timeout
    pub timeout_secs: u64,

    /// Environment variable holding an API token
    pub token_env: String,

    /// Local directory to use instead of the HTTP remote
    pub mirror: Option<PathBuf>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            manifest_url: "https://raw.githubusercontent.com/bilgehannal/cursor-config/refs/heads/main/data/collection.json".to_string(),
            contents_url: "https://api.github.com/repos/bilgehannal/cursor-config/contents/data/.cursor".to_string(),
            raw_url: "https://raw.githubusercontent.com/bilgehannal/cursor-config/refs/heads/main/data/.cursor".to_string(),
            root_prefix: "data/.cursor/".to_string(),
            timeout_secs: 30,
            token_env: "GITHUB_TOKEN".to_string(),
            mirror: None,
        }
    }
}

/// Local folder settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// Managed root (relative to the project root)
    pub root: String,

    /// Ledger file name (inside the managed root)
    pub ledger_file: String,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            root: DEFAULT_LOCAL_ROOT.to_string(),
            ledger_file: DEFAULT_LEDGER_FILE.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load `path` if given, else `collsync.toml` in the project root if it
    /// exists, else the defaults.
    pub fn load_or_default(project_root: &Path, path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        let candidate = project_root.join(CONFIG_FILE_NAME);
        if candidate.exists() {
            tracing::debug!(config = %candidate.display(), "loading config");
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        if self.remote.mirror.is_none() {
            for (field, value) in [
                ("remote.manifest_url", &self.remote.manifest_url),
                ("remote.contents_url", &self.remote.contents_url),
                ("remote.raw_url", &self.remote.raw_url),
            ] {
                url::Url::parse(value)
                    .with_context(|| format!("{field} is not a valid URL: {value}"))?;
            }
        }

        crate::error::validate_name(&self.local.ledger_file)
            .context("local.ledger_file must be a plain file name")?;
        if self.local.root.trim().is_empty() {
            anyhow::bail!("local.root must not be empty");
        }

        Ok(())
    }

    /// Managed root for a project
    pub fn local_root(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.local.root)
    }

    /// Ledger location for a project
    pub fn ledger_path(&self, project_root: &Path) -> PathBuf {
        self.local_root(project_root).join(&self.local.ledger_file)
    }

    /// Line added to `.gitignore` by `--gitignore`
    pub fn gitignore_entry(&self) -> String {
        format!("{}/", self.local.root.trim_end_matches('/'))
    }
}
