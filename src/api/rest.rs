//! api::rest
//!
//! GitHub REST implementation of the [`GitHubApi`] trait.
//!
//! # Design
//!
//! Uses the GitHub REST API v3 with token authentication. Each trait method
//! is one HTTP request; there is no caching, retry, or backoff at this
//! layer, so every call reflects live remote state and every failure
//! surfaces immediately as an [`ApiError`].
//!
//! # Example
//!
//! ```no_run
//! use ffwd::api::{GitHubApi, GitHubRestApi};
//! use ffwd::auth::AccessToken;
//!
//! # tokio_test::block_on(async {
//! let api = GitHubRestApi::new(AccessToken::new("ghp_example"));
//! let pr = api.get_pull_request("octocat", "hello-world", 42).await.unwrap();
//! println!("head is at {}", pr.head.sha);
//! # });
//! ```

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::api::traits::{
    ApiError, Branch, CommitStatus, GitHubApi, GitReference, IssueComment, PullRequest,
    PullRequestUpdate, StatusState,
};
use crate::auth::AccessToken;

/// Default GitHub API base URL.
const DEFAULT_API_BASE: &str = "https://api.github.com";

/// REST API version header value.
const API_VERSION: &str = "2022-11-28";

/// User-Agent header value; GitHub rejects requests without one.
const USER_AGENT_VALUE: &str = "ffwd";

/// GitHub REST client.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct GitHubRestApi {
    client: Client,
    token: AccessToken,
    api_base: String,
}

impl GitHubRestApi {
    /// Create a client against the public GitHub API.
    pub fn new(token: AccessToken) -> Self {
        Self::with_api_base(token, DEFAULT_API_BASE)
    }

    /// Create a client against a custom API base URL.
    ///
    /// Useful for GitHub Enterprise instances or tests against a local
    /// server.
    pub fn with_api_base(token: AccessToken, api_base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            token,
            api_base: api_base.into(),
        }
    }

    /// Build the standard headers for API requests.
    fn headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.token.as_str()))
            .map_err(|_| ApiError::AuthFailed("token contains invalid header characters".into()))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));
        Ok(headers)
    }

    /// Build a repository-scoped API URL.
    fn repo_url(&self, owner: &str, repo: &str, path: &str) -> String {
        format!("{}/repos/{}/{}/{}", self.api_base, owner, repo, path)
    }

    /// Decode a successful response body, or classify the failure.
    async fn handle_response<T>(&self, response: Response) -> Result<T, ApiError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let status = response.status();
        if status.is_success() {
            response.json::<T>().await.map_err(|e| ApiError::Api {
                status: status.as_u16(),
                message: format!("failed to decode response body: {e}"),
            })
        } else {
            Err(self.handle_error_response(response).await)
        }
    }

    /// Map an error response onto the [`ApiError`] taxonomy.
    async fn handle_error_response(&self, response: Response) -> ApiError {
        let status = response.status();
        let message = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.message)
            .unwrap_or_else(|_| "unknown error".to_string());

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::AuthFailed(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited,
            _ => ApiError::Api {
                status: status.as_u16(),
                message,
            },
        }
    }
}

#[async_trait]
impl GitHubApi for GitHubRestApi {
    async fn create_issue_comment(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<IssueComment, ApiError> {
        tracing::debug!(owner, repo, issue_number, "creating issue comment");
        let url = self.repo_url(owner, repo, &format!("issues/{issue_number}/comments"));
        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&CreateCommentBody { body })
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        self.handle_response(response).await
    }

    async fn update_reference(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
        sha: &str,
        force: bool,
    ) -> Result<GitReference, ApiError> {
        tracing::debug!(owner, repo, reference, sha, force, "updating reference");
        let url = self.repo_url(owner, repo, &format!("git/refs/{reference}"));
        let response = self
            .client
            .patch(&url)
            .headers(self.headers()?)
            .json(&UpdateReferenceBody { sha, force })
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        self.handle_response(response).await
    }

    async fn update_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        update: &PullRequestUpdate,
    ) -> Result<PullRequest, ApiError> {
        tracing::debug!(owner, repo, number, "updating pull request");
        let url = self.repo_url(owner, repo, &format!("pulls/{number}"));
        let response = self
            .client
            .patch(&url)
            .headers(self.headers()?)
            .json(update)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        self.handle_response(response).await
    }

    async fn get_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<PullRequest, ApiError> {
        tracing::debug!(owner, repo, number, "fetching pull request");
        let url = self.repo_url(owner, repo, &format!("pulls/{number}"));
        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        self.handle_response(response).await
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
        tracing::debug!(owner, repo, sha, %state, context, "creating commit status");
        let url = self.repo_url(owner, repo, &format!("statuses/{sha}"));
        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&CreateStatusBody {
                state,
                context,
                description,
            })
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        self.handle_response(response).await
    }

    async fn get_branch(&self, owner: &str, repo: &str, branch: &str) -> Result<Branch, ApiError> {
        tracing::debug!(owner, repo, branch, "fetching branch");
        let url = self.repo_url(owner, repo, &format!("branches/{branch}"));
        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        self.handle_response(response).await
    }
}

/// Request body for create-issue-comment.
#[derive(Serialize)]
struct CreateCommentBody<'a> {
    body: &'a str,
}

/// Request body for update-a-reference.
#[derive(Serialize)]
struct UpdateReferenceBody<'a> {
    sha: &'a str,
    force: bool,
}

/// Request body for create-a-commit-status.
#[derive(Serialize)]
struct CreateStatusBody<'a> {
    state: StatusState,
    context: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

/// Error response body from the API.
#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_api() -> GitHubRestApi {
        GitHubRestApi::new(AccessToken::new("ghp_test_token_12345"))
    }

    #[test]
    fn repo_url_uses_default_base() {
        let api = test_api();
        assert_eq!(
            api.repo_url("octocat", "hello-world", "pulls/42"),
            "https://api.github.com/repos/octocat/hello-world/pulls/42"
        );
    }

    #[test]
    fn repo_url_uses_custom_base() {
        let api = GitHubRestApi::with_api_base(
            AccessToken::new("ghp_test"),
            "https://github.example.com/api/v3",
        );
        assert_eq!(
            api.repo_url("octocat", "hello-world", "branches/main"),
            "https://github.example.com/api/v3/repos/octocat/hello-world/branches/main"
        );
    }

    #[test]
    fn headers_include_auth_and_api_version() {
        let api = test_api();
        let headers = api.headers().unwrap();

        assert_eq!(
            headers.get(AUTHORIZATION).unwrap().to_str().unwrap(),
            "Bearer ghp_test_token_12345"
        );
        assert_eq!(
            headers.get(ACCEPT).unwrap().to_str().unwrap(),
            "application/vnd.github+json"
        );
        assert_eq!(
            headers.get("X-GitHub-Api-Version").unwrap().to_str().unwrap(),
            API_VERSION
        );
    }

    #[test]
    fn headers_reject_invalid_token_characters() {
        let api = GitHubRestApi::new(AccessToken::new("bad\ntoken"));
        assert!(matches!(api.headers(), Err(ApiError::AuthFailed(_))));
    }

    #[test]
    fn debug_does_not_leak_token() {
        let api = test_api();
        let debug = format!("{api:?}");
        assert!(!debug.contains("ghp_test_token_12345"));
    }

    #[test]
    fn serialized_reference_body_carries_force_flag() {
        let body = UpdateReferenceBody {
            sha: "abc123",
            force: false,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            "{\"sha\":\"abc123\",\"force\":false}"
        );
    }

    #[test]
    fn serialized_status_body_omits_missing_description() {
        let body = CreateStatusBody {
            state: StatusState::Pending,
            context: "merge-check",
            description: None,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            "{\"state\":\"pending\",\"context\":\"merge-check\"}"
        );
    }
}
