//! context
//!
//! Execution context for a single automation run.
//!
//! # Design
//!
//! A [`RunContext`] carries the repository coordinates and the triggering
//! event payload. It is read-only for the life of the adapter: operations
//! consult it, never change it. Harnesses can build one explicitly with
//! [`RunContext::new`] or derive one from the standard automation
//! environment with [`RunContext::from_env`], which reads
//! `GITHUB_REPOSITORY` (`owner/repo`) and the event payload file named by
//! `GITHUB_EVENT_PATH`.
//!
//! Payload parsing is tolerant: unknown fields are ignored and everything
//! modelled is optional except the issue number, so payloads from any event
//! kind deserialize cleanly.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors from building a context out of the environment.
#[derive(Debug, Error)]
pub enum ContextError {
    /// A required environment variable is not set.
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),

    /// `GITHUB_REPOSITORY` is not in `owner/repo` form.
    #[error("repository slug is not in owner/repo form: {0}")]
    MalformedRepository(String),

    /// The event payload file could not be read.
    #[error("failed to read event payload at {}", path.display())]
    ReadPayload {
        /// Path of the payload file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The event payload file is not valid JSON.
    #[error("failed to parse event payload at {}", path.display())]
    ParsePayload {
        /// Path of the payload file.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },
}

/// Webhook event payload, reduced to the fields the adapter reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPayload {
    /// The issue or pull request the triggering event relates to.
    pub issue: Option<IssuePayload>,
}

impl EventPayload {
    /// Payload whose originating issue is a pull request.
    pub fn for_pull_request(number: u64) -> Self {
        Self {
            issue: Some(IssuePayload {
                number,
                pull_request: Some(PullRequestLink::default()),
            }),
        }
    }

    /// Payload whose originating issue is a plain issue.
    pub fn for_issue(number: u64) -> Self {
        Self {
            issue: Some(IssuePayload {
                number,
                pull_request: None,
            }),
        }
    }

    /// Load a payload from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ContextError> {
        let text = std::fs::read_to_string(path).map_err(|source| ContextError::ReadPayload {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ContextError::ParsePayload {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// The issue entry of an event payload.
#[derive(Debug, Clone, Deserialize)]
pub struct IssuePayload {
    /// Issue number; for pull requests this is the PR number.
    pub number: u64,
    /// Present when the issue is a pull request.
    pub pull_request: Option<PullRequestLink>,
}

/// Marker object linking an issue to its pull request.
///
/// Its presence on an issue is the signal; the fields are incidental.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequestLink {
    /// API URL of the pull request.
    pub url: Option<String>,
}

/// Repository coordinates and event payload for one run.
#[derive(Debug, Clone)]
pub struct RunContext {
    owner: String,
    repo: String,
    payload: EventPayload,
}

impl RunContext {
    /// Build a context from explicit parts.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            payload,
        }
    }

    /// Build a context from the standard automation environment.
    ///
    /// Reads `GITHUB_REPOSITORY` for the coordinates and the file named by
    /// `GITHUB_EVENT_PATH` for the payload. When `GITHUB_EVENT_PATH` is not
    /// set the payload is empty and a warning is logged; when it names a
    /// file that cannot be read or parsed, that is an error.
    ///
    /// # Errors
    ///
    /// - `MissingVar` if `GITHUB_REPOSITORY` is unset
    /// - `MalformedRepository` if it is not `owner/repo`
    /// - `ReadPayload` / `ParsePayload` for a bad payload file
    pub fn from_env() -> Result<Self, ContextError> {
        let slug = std::env::var("GITHUB_REPOSITORY")
            .map_err(|_| ContextError::MissingVar("GITHUB_REPOSITORY"))?;
        let (owner, repo) = slug
            .split_once('/')
            .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty())
            .ok_or_else(|| ContextError::MalformedRepository(slug.clone()))?;

        let payload = match std::env::var("GITHUB_EVENT_PATH") {
            Ok(path) => EventPayload::from_file(Path::new(&path))?,
            Err(_) => {
                tracing::warn!("GITHUB_EVENT_PATH is not set; event payload is empty");
                EventPayload::default()
            }
        };

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            payload,
        })
    }

    /// Repository owner.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Triggering event payload.
    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }
}
