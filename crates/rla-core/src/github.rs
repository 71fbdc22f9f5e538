use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

pub const DEFAULT_REMOTE: &str = "origin";

#[derive(Debug, thiserror::Error)]
pub enum GithubEventError {
    #[error("failed to read event payload {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse event payload {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The slice of a GitHub Actions webhook payload needed to find the base ref.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GithubEvent {
    #[serde(default)]
    pub pull_request: Option<PullRequest>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PullRequest {
    #[serde(default)]
    pub base: Option<PullRequestBase>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PullRequestBase {
    #[serde(rename = "ref", default)]
    pub git_ref: Option<String>,
}

impl GithubEvent {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GithubEventError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| GithubEventError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| GithubEventError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn base_ref(&self) -> Option<&str> {
        self.pull_request
            .as_ref()?
            .base
            .as_ref()?
            .git_ref
            .as_deref()
    }
}

/// Picks the diff base from the event payload, falling back to the
/// `GITHUB_BASE_REF` value. Empty values count as missing.
pub fn resolve_base_ref(event: Option<&GithubEvent>, env_base_ref: Option<&str>) -> Option<String> {
    let branch = event
        .and_then(GithubEvent::base_ref)
        .map(str::trim)
        .filter(|branch| !branch.is_empty())
        .or_else(|| env_base_ref.map(str::trim).filter(|branch| !branch.is_empty()))?;
    Some(qualify_remote(branch))
}

/// `main` becomes `origin/main`; refs already on the remote are left alone.
pub fn qualify_remote(branch: &str) -> String {
    let prefix = format!("{DEFAULT_REMOTE}/");
    if branch.starts_with(&prefix) {
        branch.to_string()
    } else {
        format!("{prefix}{branch}")
    }
}
