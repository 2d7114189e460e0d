//! client
//!
//! Pull-request operations over the remote API.
//!
//! # Design
//!
//! [`PullRequestClient`] translates each domain verb (comment, close,
//! fast-forward, status-set, branch-compare) into one remote call, plus a
//! snapshot fetch where the verb needs pull-request fields first. It holds
//! no mutable state and caches nothing: every operation that needs the pull
//! request re-fetches it, so each call acts on live remote state. Errors
//! from the remote pass through unchanged.
//!
//! The [`PullRequestOps`] trait is the seam for harnesses: production code
//! takes `&dyn PullRequestOps` and tests substitute their own double.
//!
//! # Example
//!
//! ```no_run
//! use ffwd::auth::AccessToken;
//! use ffwd::client::{PullRequestClient, PullRequestOps};
//! use ffwd::context::RunContext;
//!
//! # tokio_test::block_on(async {
//! let context = RunContext::from_env().unwrap();
//! let client = PullRequestClient::new(context, AccessToken::new("ghp_example"));
//!
//! let number = client.current_pull_request_number().unwrap();
//! client.comment_on_pull_request(number, "fast-forwarding now").await.unwrap();
//! client.fast_forward_target_to_source(number).await.unwrap();
//! # });
//! ```

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::api::{ApiError, GitHubApi, GitHubRestApi, PullRequest, PullRequestUpdate, StatusState};
use crate::auth::AccessToken;
use crate::context::RunContext;

/// Errors from pull-request operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The run context does not describe a pull request.
    #[error("event payload does not describe a pull request")]
    NotAPullRequest,

    /// A remote call failed. The underlying error is passed through
    /// unchanged.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// The pull-request operations this crate offers.
///
/// One method per domain verb. All remote-backed methods are async and
/// return `Result`; the only synchronous method is
/// [`current_pull_request_number`], which reads the run context and never
/// touches the network.
///
/// [`current_pull_request_number`]: PullRequestOps::current_pull_request_number
#[async_trait]
pub trait PullRequestOps: Send + Sync {
    /// Pull-request number of the triggering event.
    ///
    /// # Errors
    ///
    /// `NotAPullRequest` if the payload has no issue entry or the issue is
    /// not associated with a pull request.
    fn current_pull_request_number(&self) -> Result<u64, ClientError>;

    /// Post a comment on a pull request.
    async fn comment_on_pull_request(&self, number: u64, body: &str) -> Result<(), ClientError>;

    /// Fast-forward the base branch to the head commit.
    ///
    /// Fetches the pull request, then moves `heads/{base}` to the head
    /// commit with a non-forcing reference update. If the base has moved so
    /// the update is no longer a fast-forward, the remote service rejects
    /// it and the error surfaces here; the branch is never force-moved.
    async fn fast_forward_target_to_source(&self, number: u64) -> Result<(), ClientError>;

    /// Close a pull request.
    ///
    /// Sets the state to closed and changes nothing else. Closing an
    /// already-closed pull request is whatever the remote service makes
    /// of it.
    async fn close_pull_request(&self, number: u64) -> Result<(), ClientError>;

    /// Head (source) branch name of a pull request.
    async fn pull_request_source_head(&self, number: u64) -> Result<String, ClientError>;

    /// Base (target) branch name of a pull request.
    async fn pull_request_target_base(&self, number: u64) -> Result<String, ClientError>;

    /// Fetch the current snapshot of a pull request.
    ///
    /// Never cached: every call re-fetches, so two calls may observe
    /// different snapshots if the remote moved in between.
    async fn pull_request(&self, number: u64) -> Result<PullRequest, ClientError>;

    /// Attach a status to the pull request's head commit.
    ///
    /// Fetches the pull request for its head commit, then creates a status
    /// with the given state under the `status_name` label. Earlier statuses
    /// under the same label are kept by the remote service, not replaced.
    async fn set_pull_request_status(
        &self,
        number: u64,
        state: StatusState,
        status_name: &str,
        description: Option<&str>,
    ) -> Result<(), ClientError>;

    /// Whether two branches currently point at the same commit.
    ///
    /// Fetches both branches and compares their tip commit identifiers.
    /// Fails if either branch is missing.
    async fn compare_branch_heads(
        &self,
        branch_a: &str,
        branch_b: &str,
    ) -> Result<bool, ClientError>;
}

/// Pull-request operations client for one repository.
///
/// Built from a [`RunContext`] (which fixes the owner and repository for
/// the client's lifetime) and either a token or an injected API
/// implementation.
#[derive(Clone)]
pub struct PullRequestClient {
    api: Arc<dyn GitHubApi>,
    context: RunContext,
}

impl PullRequestClient {
    /// Create a client over the GitHub REST API.
    pub fn new(context: RunContext, token: AccessToken) -> Self {
        Self::with_api(context, Arc::new(GitHubRestApi::new(token)))
    }

    /// Create a client over any API implementation.
    ///
    /// This is the seam for tests ([`MockGitHubApi`]) and for Enterprise
    /// deployments built with [`GitHubRestApi::with_api_base`].
    ///
    /// [`MockGitHubApi`]: crate::api::MockGitHubApi
    pub fn with_api(context: RunContext, api: Arc<dyn GitHubApi>) -> Self {
        Self { api, context }
    }

    /// The run context this client was built from.
    pub fn context(&self) -> &RunContext {
        &self.context
    }
}

impl fmt::Debug for PullRequestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PullRequestClient")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PullRequestOps for PullRequestClient {
    fn current_pull_request_number(&self) -> Result<u64, ClientError> {
        self.context
            .payload()
            .issue
            .as_ref()
            .filter(|issue| issue.pull_request.is_some())
            .map(|issue| issue.number)
            .ok_or(ClientError::NotAPullRequest)
    }

    async fn comment_on_pull_request(&self, number: u64, body: &str) -> Result<(), ClientError> {
        self.api
            .create_issue_comment(self.context.owner(), self.context.repo(), number, body)
            .await?;
        Ok(())
    }

    async fn fast_forward_target_to_source(&self, number: u64) -> Result<(), ClientError> {
        let pr = self.pull_request(number).await?;
        tracing::debug!(
            number,
            base = %pr.base.ref_name,
            sha = %pr.head.sha,
            "fast-forwarding base to head"
        );
        // force stays false so a non-fast-forward move is rejected remotely
        self.api
            .update_reference(
                self.context.owner(),
                self.context.repo(),
                &format!("heads/{}", pr.base.ref_name),
                &pr.head.sha,
                false,
            )
            .await?;
        Ok(())
    }

    async fn close_pull_request(&self, number: u64) -> Result<(), ClientError> {
        self.api
            .update_pull_request(
                self.context.owner(),
                self.context.repo(),
                number,
                &PullRequestUpdate::closed(),
            )
            .await?;
        Ok(())
    }

    async fn pull_request_source_head(&self, number: u64) -> Result<String, ClientError> {
        let pr = self.pull_request(number).await?;
        Ok(pr.head.ref_name)
    }

    async fn pull_request_target_base(&self, number: u64) -> Result<String, ClientError> {
        let pr = self.pull_request(number).await?;
        Ok(pr.base.ref_name)
    }

    async fn pull_request(&self, number: u64) -> Result<PullRequest, ClientError> {
        let pr = self
            .api
            .get_pull_request(self.context.owner(), self.context.repo(), number)
            .await?;
        Ok(pr)
    }

    async fn set_pull_request_status(
        &self,
        number: u64,
        state: StatusState,
        status_name: &str,
        description: Option<&str>,
    ) -> Result<(), ClientError> {
        let pr = self.pull_request(number).await?;
        self.api
            .create_commit_status(
                self.context.owner(),
                self.context.repo(),
                &pr.head.sha,
                state,
                status_name,
                description,
            )
            .await?;
        Ok(())
    }

    async fn compare_branch_heads(
        &self,
        branch_a: &str,
        branch_b: &str,
    ) -> Result<bool, ClientError> {
        let a = self
            .api
            .get_branch(self.context.owner(), self.context.repo(), branch_a)
            .await?;
        let b = self
            .api
            .get_branch(self.context.owner(), self.context.repo(), branch_b)
            .await?;
        Ok(a.commit.sha == b.commit.sha)
    }
}
