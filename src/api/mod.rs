//! api
//!
//! Remote access to the GitHub hosting service.
//!
//! # Design
//!
//! The [`GitHubApi`] trait names the six REST operations the adapter
//! depends on. [`GitHubRestApi`] is the production implementation over
//! HTTP; [`MockGitHubApi`] is an in-memory double that records calls and
//! injects failures for tests. Code above this boundary holds an
//! `Arc<dyn GitHubApi>` and never knows which one it has.

pub mod mock;
pub mod rest;
pub mod traits;

pub use mock::{FailOn, MockGitHubApi, MockOperation};
pub use rest::GitHubRestApi;
pub use traits::{
    ApiError, Branch, BranchCommit, CommitStatus, GitHubApi, GitObject, GitReference,
    IssueComment, PullRequest, PullRequestRef, PullRequestState, PullRequestUpdate, StatusState,
};
