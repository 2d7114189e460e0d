//! api::traits
//!
//! Capability trait for the GitHub REST operations the adapter depends on.
//!
//! # Design
//!
//! The `GitHubApi` trait is async because every operation involves network
//! I/O. It covers exactly the six remote endpoints the pull-request
//! operations translate into: create-comment-on-issue, update-a-reference,
//! update-a-pull-request, get-a-pull-request, create-a-commit-status, and
//! get-a-branch. Each operation takes `(owner, repo, …)` so one client can
//! serve any repository; callers that are scoped to a single repository
//! (like [`PullRequestClient`]) capture the coordinates once and pass them
//! through.
//!
//! Response types mirror the wire payloads: pull requests expose
//! `head.ref`, `head.sha`, and `base.ref`; branches expose `commit.sha`.
//! Unknown wire fields are ignored on deserialization.
//!
//! [`PullRequestClient`]: crate::client::PullRequestClient

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from remote API operations.
///
/// These map the common failure modes of the hosting service. The adapter
/// layer never inspects or reclassifies them; they pass through to the
/// caller unchanged.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Authentication failed (invalid token, expired, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    Network(String),
}

/// Commit status state.
///
/// The hosting service accepts exactly these four values for a commit
/// status; a new status never replaces an earlier one under the same
/// context label (the service keeps the history).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    /// The check errored before producing a result.
    Error,
    /// The check ran and failed.
    Failure,
    /// The check has not finished yet.
    Pending,
    /// The check ran and passed.
    Success,
}

impl std::fmt::Display for StatusState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusState::Error => write!(f, "error"),
            StatusState::Failure => write!(f, "failure"),
            StatusState::Pending => write!(f, "pending"),
            StatusState::Success => write!(f, "success"),
        }
    }
}

/// Pull request state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    /// PR is open.
    Open,
    /// PR is closed (merged or not).
    Closed,
}

impl std::fmt::Display for PullRequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PullRequestState::Open => write!(f, "open"),
            PullRequestState::Closed => write!(f, "closed"),
        }
    }
}

/// Head or base side of a pull request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestRef {
    /// Branch name (without the `heads/` prefix).
    #[serde(rename = "ref")]
    pub ref_name: String,
    /// Tip commit identifier of the branch at fetch time.
    pub sha: String,
}

/// A pull request as fetched from the remote service.
///
/// This is a transient snapshot: it reflects remote state at the moment of
/// the fetch and is never cached locally, so two fetches may disagree if
/// the remote moved in between.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR number.
    pub number: u64,
    /// PR state (open or closed).
    pub state: PullRequestState,
    /// PR title.
    pub title: String,
    /// Web URL for viewing.
    pub html_url: String,
    /// Head side (the branch with changes).
    pub head: PullRequestRef,
    /// Base side (the branch to merge into).
    pub base: PullRequestRef,
}

/// Fields to change on a pull request.
///
/// Serialized as the PATCH body for update-a-pull-request; unset fields are
/// omitted so the remote service leaves them untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PullRequestUpdate {
    /// New title (if changing).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New body (if changing).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// New state (if changing).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<PullRequestState>,
    /// New base branch (if changing).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
}

impl PullRequestUpdate {
    /// Update that closes the pull request and changes nothing else.
    pub fn closed() -> Self {
        Self {
            state: Some(PullRequestState::Closed),
            ..Self::default()
        }
    }
}

/// A branch as fetched from the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    /// Branch name.
    pub name: String,
    /// Tip commit of the branch.
    pub commit: BranchCommit,
}

/// Tip commit of a branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchCommit {
    /// Commit identifier.
    pub sha: String,
}

/// A git reference as returned by update-a-reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitReference {
    /// Fully qualified reference name (e.g. `refs/heads/main`).
    #[serde(rename = "ref")]
    pub ref_name: String,
    /// Object the reference points at.
    pub object: GitObject,
}

/// Object a git reference points at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitObject {
    /// Object identifier.
    pub sha: String,
    /// Object type (`commit` for branch heads).
    #[serde(rename = "type")]
    pub object_type: String,
}

/// A comment created on an issue or pull request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueComment {
    /// Comment identifier.
    pub id: u64,
    /// Comment text.
    pub body: String,
    /// Web URL for viewing.
    pub html_url: String,
    /// Creation time reported by the remote service.
    pub created_at: DateTime<Utc>,
}

/// A commit status created by create-a-commit-status.
///
/// The commit it attaches to is named in the request, not echoed in the
/// response payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitStatus {
    /// Status identifier.
    pub id: u64,
    /// Status state.
    pub state: StatusState,
    /// Context label the status is filed under.
    pub context: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Creation time reported by the remote service.
    pub created_at: DateTime<Utc>,
}

/// The GitHub REST operations the pull-request adapter translates into.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so one client can be shared across
/// async tasks.
///
/// # Error Handling
///
/// All methods return `Result<T, ApiError>`. Implementations classify
/// transport and response failures into the [`ApiError`] taxonomy; callers
/// above this boundary propagate them without reinterpretation.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Create a comment on an issue or pull request.
    ///
    /// # Arguments
    ///
    /// * `issue_number` - Issue or pull request number (the hosting service
    ///   files PR comments under the issue endpoint)
    /// * `body` - Comment text
    ///
    /// # Errors
    ///
    /// - `NotFound` if the issue doesn't exist
    /// - `AuthFailed` if the token lacks permission to comment
    async fn create_issue_comment(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<IssueComment, ApiError>;

    /// Move a reference to a new commit.
    ///
    /// # Arguments
    ///
    /// * `reference` - Short reference name, e.g. `heads/main`
    /// * `sha` - Commit identifier to point the reference at
    /// * `force` - When `false` the remote service rejects any move that is
    ///   not a fast-forward
    ///
    /// # Errors
    ///
    /// - `Api` with status 422 if the reference doesn't exist or the move is
    ///   not a fast-forward while `force` is `false`
    async fn update_reference(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
        sha: &str,
        force: bool,
    ) -> Result<GitReference, ApiError>;

    /// Change fields on a pull request.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the pull request doesn't exist
    /// - `AuthFailed` if lacking permission to update
    async fn update_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        update: &PullRequestUpdate,
    ) -> Result<PullRequest, ApiError>;

    /// Fetch a pull request by number.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the pull request doesn't exist
    async fn get_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<PullRequest, ApiError>;

    /// Attach a status to a commit.
    ///
    /// A new status never replaces an earlier one under the same `context`
    /// label; the remote service keeps the full history.
    ///
    /// # Arguments
    ///
    /// * `sha` - Commit identifier the status attaches to
    /// * `state` - One of error, failure, pending, success
    /// * `context` - Label the status is filed under
    /// * `description` - Optional free-text description
    ///
    /// # Errors
    ///
    /// - `Api` with status 422 if the commit is unknown to the repository
    async fn create_commit_status(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
        state: StatusState,
        context: &str,
        description: Option<&str>,
    ) -> Result<CommitStatus, ApiError>;

    /// Fetch a branch by name.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the branch doesn't exist
    async fn get_branch(&self, owner: &str, repo: &str, branch: &str) -> Result<Branch, ApiError>;
}
