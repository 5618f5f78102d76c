//! HTTP source for collections published in a GitHub repository.
//!
//! Listings go through the repository contents API; file bodies and the
//! manifest are fetched from the raw content host.

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use std::time::Duration;

use super::{Listing, RemoteEntry, RemoteSource};
use crate::config::RemoteConfig;
use crate::error::{Result, SyncError};

const USER_AGENT: &str = concat!("collsync/", env!("CARGO_PKG_VERSION"));

/// The contents API returns an array for directories and an object for files.
#[derive(Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    Directory(Vec<RemoteEntry>),
    File(RemoteEntry),
}

pub struct GithubSource {
    client: Client,
    manifest_url: String,
    contents_url: String,
    raw_url: String,
    root_prefix: String,
    token: Option<String>,
}

impl GithubSource {
    pub fn from_config(config: &RemoteConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|source| SyncError::Transport {
                target: "HTTP client".to_string(),
                source,
            })?;

        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty());
        if token.is_some() {
            tracing::debug!(env = %config.token_env, "using API token");
        }

        Ok(Self {
            client,
            manifest_url: config.manifest_url.clone(),
            contents_url: config.contents_url.trim_end_matches('/').to_string(),
            raw_url: config.raw_url.trim_end_matches('/').to_string(),
            root_prefix: config.root_prefix.clone(),
            token,
        })
    }

    fn get(&self, url: &str, target: &str, authenticated: bool) -> Result<Response> {
        tracing::debug!(%url, "GET");
        let mut request = self.client.get(url);
        if authenticated && let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(|source| SyncError::Transport {
            target: target.to_string(),
            source,
        })?;
        check_status(response.status(), target)?;
        Ok(response)
    }

    fn get_bytes(&self, url: &str, target: &str, authenticated: bool) -> Result<Vec<u8>> {
        let response = self.get(url, target, authenticated)?;
        let body = response.bytes().map_err(|source| SyncError::Transport {
            target: target.to_string(),
            source,
        })?;
        Ok(body.to_vec())
    }
}

impl RemoteSource for GithubSource {
    fn fetch_manifest(&self) -> Result<Vec<u8>> {
        self.get_bytes(&self.manifest_url, "collection manifest", false)
    }

    fn list_directory(&self, path: &str) -> Result<Listing> {
        let url = format!("{}/{}", self.contents_url, encode_path(path));
        let body = self.get_bytes(&url, path, true)?;
        parse_contents(&body, path)
    }

    fn download(&self, path: &str) -> Result<Vec<u8>> {
        let url = format!("{}/{}", self.raw_url, encode_path(path));
        self.get_bytes(&url, path, false)
    }

    fn root_prefix(&self) -> &str {
        &self.root_prefix
    }
}

fn check_status(status: StatusCode, target: &str) -> Result<()> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::NOT_FOUND => Err(SyncError::NotFound(target.to_string())),
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => Err(SyncError::RateLimited),
        s => Err(SyncError::HttpStatus {
            target: target.to_string(),
            status: s.as_u16(),
        }),
    }
}

/// Percent-encode each segment of a `/`-separated path.
fn encode_path(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| urlencoding::encode(s).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn parse_contents(body: &[u8], path: &str) -> Result<Listing> {
    let response: ContentsResponse = serde_json::from_slice(body)
        .map_err(|e| SyncError::parse(format!("contents listing for {path}"), e))?;

    Ok(match response {
        ContentsResponse::Directory(entries) => Listing {
            is_directory: true,
            entries,
        },
        ContentsResponse::File(entry) => Listing {
            is_directory: false,
            entries: vec![entry],
        },
    })
}
