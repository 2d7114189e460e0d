//! api::mock
//!
//! In-memory [`GitHubApi`] implementation for testing.
//!
//! # Design
//!
//! The mock holds pull requests and branch heads behind an `Arc<Mutex<_>>`
//! so clones share state, records every operation in call order, and can be
//! told to fail a specific operation with a chosen error. An operation is
//! recorded before its injected failure fires, so tests can assert that a
//! call was attempted even when it errors.
//!
//! Branch ancestry is not modelled: `update_reference` accepts any move and
//! the `force` flag is only recorded for assertions.
//!
//! # Example
//!
//! ```
//! use ffwd::api::{GitHubApi, MockGitHubApi};
//!
//! # tokio_test::block_on(async {
//! let api = MockGitHubApi::new().with_branch("main", "abc123");
//! let branch = api.get_branch("octocat", "hello-world", "main").await.unwrap();
//! assert_eq!(branch.commit.sha, "abc123");
//! assert_eq!(api.operations().len(), 1);
//! # });
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::api::traits::{
    ApiError, Branch, BranchCommit, CommitStatus, GitHubApi, GitObject, GitReference,
    IssueComment, PullRequest, PullRequestUpdate, StatusState,
};

/// Which operation should fail, and with what error.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail create_issue_comment calls.
    CreateIssueComment(ApiError),
    /// Fail update_reference calls.
    UpdateReference(ApiError),
    /// Fail update_pull_request calls.
    UpdatePullRequest(ApiError),
    /// Fail get_pull_request calls.
    GetPullRequest(ApiError),
    /// Fail create_commit_status calls.
    CreateCommitStatus(ApiError),
    /// Fail get_branch calls.
    GetBranch(ApiError),
}

/// A recorded API call with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum MockOperation {
    /// create_issue_comment was called.
    CreateIssueComment {
        owner: String,
        repo: String,
        issue_number: u64,
        body: String,
    },
    /// update_reference was called.
    UpdateReference {
        owner: String,
        repo: String,
        reference: String,
        sha: String,
        force: bool,
    },
    /// update_pull_request was called.
    UpdatePullRequest {
        owner: String,
        repo: String,
        number: u64,
        update: PullRequestUpdate,
    },
    /// get_pull_request was called.
    GetPullRequest {
        owner: String,
        repo: String,
        number: u64,
    },
    /// create_commit_status was called.
    CreateCommitStatus {
        owner: String,
        repo: String,
        sha: String,
        state: StatusState,
        context: String,
        description: Option<String>,
    },
    /// get_branch was called.
    GetBranch {
        owner: String,
        repo: String,
        branch: String,
    },
}

struct MockGitHubApiInner {
    pull_requests: HashMap<u64, PullRequest>,
    branches: HashMap<String, String>,
    comments: Vec<(u64, IssueComment)>,
    statuses: Vec<(String, CommitStatus)>,
    next_comment_id: u64,
    next_status_id: u64,
    fail_on: Option<FailOn>,
    operations: Vec<MockOperation>,
}

/// In-memory GitHub API for tests.
///
/// Cloning shares the underlying state, so a clone handed to the code under
/// test can be inspected afterwards through the original handle.
#[derive(Clone)]
pub struct MockGitHubApi {
    inner: Arc<Mutex<MockGitHubApiInner>>,
}

impl MockGitHubApi {
    /// Create an empty mock with no seeded state.
    pub fn new() -> Self {
        Self::with_pull_requests(Vec::new())
    }

    /// Create a mock seeded with pull requests, keyed by number.
    pub fn with_pull_requests(prs: Vec<PullRequest>) -> Self {
        let pull_requests = prs.into_iter().map(|pr| (pr.number, pr)).collect();
        Self {
            inner: Arc::new(Mutex::new(MockGitHubApiInner {
                pull_requests,
                branches: HashMap::new(),
                comments: Vec::new(),
                statuses: Vec::new(),
                next_comment_id: 1,
                next_status_id: 1,
                fail_on: None,
                operations: Vec::new(),
            })),
        }
    }

    /// Seed a branch head. Chainable.
    pub fn with_branch(self, name: impl Into<String>, sha: impl Into<String>) -> Self {
        self.inner
            .lock()
            .unwrap()
            .branches
            .insert(name.into(), sha.into());
        self
    }

    /// Inject a failure for one operation. Chainable.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.inner.lock().unwrap().fail_on = Some(fail_on);
        self
    }

    /// All operations recorded so far, in call order.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.inner.lock().unwrap().operations.clone()
    }

    /// Current stored state of a pull request.
    pub fn pull_request(&self, number: u64) -> Option<PullRequest> {
        self.inner.lock().unwrap().pull_requests.get(&number).cloned()
    }

    /// Current head of a branch.
    pub fn branch_sha(&self, name: &str) -> Option<String> {
        self.inner.lock().unwrap().branches.get(name).cloned()
    }

    /// Comments created on an issue, in creation order.
    pub fn comments_for(&self, issue_number: u64) -> Vec<IssueComment> {
        self.inner
            .lock()
            .unwrap()
            .comments
            .iter()
            .filter(|(number, _)| *number == issue_number)
            .map(|(_, comment)| comment.clone())
            .collect()
    }

    /// Statuses created on a commit, in creation order.
    pub fn statuses_for(&self, sha: &str) -> Vec<CommitStatus> {
        self.inner
            .lock()
            .unwrap()
            .statuses
            .iter()
            .filter(|(status_sha, _)| status_sha == sha)
            .map(|(_, status)| status.clone())
            .collect()
    }
}

impl Default for MockGitHubApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GitHubApi for MockGitHubApi {
    async fn create_issue_comment(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<IssueComment, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(MockOperation::CreateIssueComment {
            owner: owner.to_string(),
            repo: repo.to_string(),
            issue_number,
            body: body.to_string(),
        });

        if let Some(FailOn::CreateIssueComment(err)) = &inner.fail_on {
            return Err(err.clone());
        }

        if !inner.pull_requests.contains_key(&issue_number) {
            return Err(ApiError::NotFound(format!(
                "issue #{issue_number} not found"
            )));
        }

        let id = inner.next_comment_id;
        inner.next_comment_id += 1;
        let comment = IssueComment {
            id,
            body: body.to_string(),
            html_url: format!(
                "https://github.com/{owner}/{repo}/issues/{issue_number}#issuecomment-{id}"
            ),
            created_at: Utc::now(),
        };
        inner.comments.push((issue_number, comment.clone()));
        Ok(comment)
    }

    async fn update_reference(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
        sha: &str,
        force: bool,
    ) -> Result<GitReference, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(MockOperation::UpdateReference {
            owner: owner.to_string(),
            repo: repo.to_string(),
            reference: reference.to_string(),
            sha: sha.to_string(),
            force,
        });

        if let Some(FailOn::UpdateReference(err)) = &inner.fail_on {
            return Err(err.clone());
        }

        let branch = reference.strip_prefix("heads/").unwrap_or(reference);
        if !inner.branches.contains_key(branch) {
            return Err(ApiError::Api {
                status: 422,
                message: "Reference does not exist".to_string(),
            });
        }
        inner.branches.insert(branch.to_string(), sha.to_string());

        Ok(GitReference {
            ref_name: format!("refs/{reference}"),
            object: GitObject {
                sha: sha.to_string(),
                object_type: "commit".to_string(),
            },
        })
    }

    async fn update_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        update: &PullRequestUpdate,
    ) -> Result<PullRequest, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(MockOperation::UpdatePullRequest {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
            update: update.clone(),
        });

        if let Some(FailOn::UpdatePullRequest(err)) = &inner.fail_on {
            return Err(err.clone());
        }

        let pr = inner
            .pull_requests
            .get_mut(&number)
            .ok_or_else(|| ApiError::NotFound(format!("PR #{number} not found")))?;

        if let Some(title) = &update.title {
            pr.title = title.clone();
        }
        if let Some(state) = update.state {
            pr.state = state;
        }
        if let Some(base) = &update.base {
            pr.base.ref_name = base.clone();
        }
        Ok(pr.clone())
    }

    async fn get_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<PullRequest, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(MockOperation::GetPullRequest {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
        });

        if let Some(FailOn::GetPullRequest(err)) = &inner.fail_on {
            return Err(err.clone());
        }

        inner
            .pull_requests
            .get(&number)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("PR #{number} not found")))
    }

    async fn create_commit_status(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
        state: StatusState,
        context: &str,
        description: Option<&str>,
    ) -> Result<CommitStatus, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(MockOperation::CreateCommitStatus {
            owner: owner.to_string(),
            repo: repo.to_string(),
            sha: sha.to_string(),
            state,
            context: context.to_string(),
            description: description.map(|d| d.to_string()),
        });

        if let Some(FailOn::CreateCommitStatus(err)) = &inner.fail_on {
            return Err(err.clone());
        }

        let id = inner.next_status_id;
        inner.next_status_id += 1;
        let status = CommitStatus {
            id,
            state,
            context: context.to_string(),
            description: description.map(|d| d.to_string()),
            created_at: Utc::now(),
        };
        inner.statuses.push((sha.to_string(), status.clone()));
        Ok(status)
    }

    async fn get_branch(&self, owner: &str, repo: &str, branch: &str) -> Result<Branch, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(MockOperation::GetBranch {
            owner: owner.to_string(),
            repo: repo.to_string(),
            branch: branch.to_string(),
        });

        if let Some(FailOn::GetBranch(err)) = &inner.fail_on {
            return Err(err.clone());
        }

        let sha = inner
            .branches
            .get(branch)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("branch {branch} not found")))?;

        Ok(Branch {
            name: branch.to_string(),
            commit: BranchCommit { sha },
        })
    }
}
