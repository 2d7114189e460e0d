//! Integration tests for the pull-request operations client.
//!
//! These tests drive `PullRequestClient` against `MockGitHubApi` and assert
//! both the values returned and the exact remote operations issued.

use std::sync::Arc;

use ffwd::api::{
    ApiError, FailOn, MockGitHubApi, MockOperation, PullRequest, PullRequestRef,
    PullRequestState, PullRequestUpdate, StatusState,
};
use ffwd::client::{ClientError, PullRequestClient, PullRequestOps};
use ffwd::context::{EventPayload, RunContext};

// =============================================================================
// Fixtures
// =============================================================================

fn sample_pr(number: u64, head_ref: &str, head_sha: &str, base_ref: &str) -> PullRequest {
    PullRequest {
        number,
        state: PullRequestState::Open,
        title: format!("PR {number}"),
        html_url: format!("https://github.com/octocat/hello-world/pull/{number}"),
        head: PullRequestRef {
            ref_name: head_ref.to_string(),
            sha: head_sha.to_string(),
        },
        base: PullRequestRef {
            ref_name: base_ref.to_string(),
            sha: "base123".to_string(),
        },
    }
}

fn client_for(api: &MockGitHubApi, payload: EventPayload) -> PullRequestClient {
    PullRequestClient::with_api(
        RunContext::new("octocat", "hello-world", payload),
        Arc::new(api.clone()),
    )
}

// =============================================================================
// Current Pull Request Number
// =============================================================================

mod current_number_tests {
    use super::*;

    #[test]
    fn returns_issue_number_when_marker_present() {
        let api = MockGitHubApi::new();
        let client = client_for(&api, EventPayload::for_pull_request(7));

        assert_eq!(client.current_pull_request_number().unwrap(), 7);
    }

    #[test]
    fn plain_issue_fails_without_remote_calls() {
        let api = MockGitHubApi::new();
        let client = client_for(&api, EventPayload::for_issue(7));

        let result = client.current_pull_request_number();

        assert!(matches!(result, Err(ClientError::NotAPullRequest)));
        assert!(api.operations().is_empty());
    }

    #[test]
    fn missing_issue_fails_without_remote_calls() {
        let api = MockGitHubApi::new();
        let client = client_for(&api, EventPayload::default());

        let result = client.current_pull_request_number();

        assert!(matches!(result, Err(ClientError::NotAPullRequest)));
        assert!(api.operations().is_empty());
    }
}

// =============================================================================
// Snapshot Reads
// =============================================================================

mod snapshot_tests {
    use super::*;

    #[tokio::test]
    async fn pull_request_returns_current_snapshot() {
        let api =
            MockGitHubApi::with_pull_requests(vec![sample_pr(42, "feature", "head456", "main")]);
        let client = client_for(&api, EventPayload::default());

        let pr = client.pull_request(42).await.unwrap();

        assert_eq!(pr.number, 42);
        assert_eq!(pr.head.ref_name, "feature");
        assert_eq!(pr.head.sha, "head456");
        assert_eq!(pr.base.ref_name, "main");
    }

    #[tokio::test]
    async fn source_head_and_target_base_read_branch_names() {
        let api =
            MockGitHubApi::with_pull_requests(vec![sample_pr(42, "feature", "head456", "main")]);
        let client = client_for(&api, EventPayload::default());

        assert_eq!(client.pull_request_source_head(42).await.unwrap(), "feature");
        assert_eq!(client.pull_request_target_base(42).await.unwrap(), "main");
    }

    #[tokio::test]
    async fn sibling_reads_each_fetch_fresh() {
        let api =
            MockGitHubApi::with_pull_requests(vec![sample_pr(42, "feature", "head456", "main")]);
        let client = client_for(&api, EventPayload::default());

        client.pull_request_source_head(42).await.unwrap();
        client.pull_request_target_base(42).await.unwrap();

        let fetches = api
            .operations()
            .iter()
            .filter(|op| matches!(op, MockOperation::GetPullRequest { .. }))
            .count();
        assert_eq!(fetches, 2);
    }

    #[tokio::test]
    async fn unknown_pull_request_is_not_found() {
        let api = MockGitHubApi::new();
        let client = client_for(&api, EventPayload::default());

        let result = client.pull_request(99).await;
        assert!(matches!(result, Err(ClientError::Api(ApiError::NotFound(_)))));
    }

    #[tokio::test]
    async fn operations_carry_context_coordinates() {
        let api =
            MockGitHubApi::with_pull_requests(vec![sample_pr(42, "feature", "head456", "main")]);
        let client = PullRequestClient::with_api(
            RunContext::new("torvalds", "linux", EventPayload::default()),
            Arc::new(api.clone()),
        );

        client.pull_request(42).await.unwrap();

        assert_eq!(
            api.operations(),
            vec![MockOperation::GetPullRequest {
                owner: "torvalds".to_string(),
                repo: "linux".to_string(),
                number: 42,
            }]
        );
    }
}

// =============================================================================
// Commenting
// =============================================================================

mod comment_tests {
    use super::*;

    #[tokio::test]
    async fn comment_posts_body_on_pull_request() {
        let api =
            MockGitHubApi::with_pull_requests(vec![sample_pr(42, "feature", "head456", "main")]);
        let client = client_for(&api, EventPayload::default());

        client
            .comment_on_pull_request(42, "fast-forwarding now")
            .await
            .unwrap();

        let comments = api.comments_for(42);
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].body, "fast-forwarding now");
        assert_eq!(
            api.operations(),
            vec![MockOperation::CreateIssueComment {
                owner: "octocat".to_string(),
                repo: "hello-world".to_string(),
                issue_number: 42,
                body: "fast-forwarding now".to_string(),
            }]
        );
    }
}

// =============================================================================
// Fast-Forward
// =============================================================================

mod fast_forward_tests {
    use super::*;

    #[tokio::test]
    async fn moves_base_branch_to_head_commit() {
        let api =
            MockGitHubApi::with_pull_requests(vec![sample_pr(42, "feature", "head456", "main")])
                .with_branch("main", "base123");
        let client = client_for(&api, EventPayload::default());

        client.fast_forward_target_to_source(42).await.unwrap();

        assert_eq!(api.branch_sha("main").as_deref(), Some("head456"));
    }

    #[tokio::test]
    async fn reference_update_is_never_forced() {
        let api =
            MockGitHubApi::with_pull_requests(vec![sample_pr(42, "feature", "head456", "main")])
                .with_branch("main", "base123");
        let client = client_for(&api, EventPayload::default());

        client.fast_forward_target_to_source(42).await.unwrap();

        let operations = api.operations();
        assert_eq!(operations.len(), 2);
        assert!(matches!(
            operations[0],
            MockOperation::GetPullRequest { number: 42, .. }
        ));
        assert_eq!(
            operations[1],
            MockOperation::UpdateReference {
                owner: "octocat".to_string(),
                repo: "hello-world".to_string(),
                reference: "heads/main".to_string(),
                sha: "head456".to_string(),
                force: false,
            }
        );
    }

    #[tokio::test]
    async fn rejected_update_surfaces_and_leaves_branch_alone() {
        let api =
            MockGitHubApi::with_pull_requests(vec![sample_pr(42, "feature", "head456", "main")])
                .with_branch("main", "base123")
                .fail_on(FailOn::UpdateReference(ApiError::Api {
                    status: 422,
                    message: "Update is not a fast forward".to_string(),
                }));
        let client = client_for(&api, EventPayload::default());

        let err = client.fast_forward_target_to_source(42).await.unwrap_err();

        assert!(matches!(
            err,
            ClientError::Api(ApiError::Api { status: 422, .. })
        ));
        assert_eq!(api.branch_sha("main").as_deref(), Some("base123"));
    }
}

// =============================================================================
// Closing
// =============================================================================

mod close_tests {
    use super::*;

    #[tokio::test]
    async fn close_sets_state_and_nothing_else() {
        let api =
            MockGitHubApi::with_pull_requests(vec![sample_pr(42, "feature", "head456", "main")]);
        let client = client_for(&api, EventPayload::default());

        client.close_pull_request(42).await.unwrap();

        assert_eq!(
            api.pull_request(42).unwrap().state,
            PullRequestState::Closed
        );
        assert_eq!(
            api.operations(),
            vec![MockOperation::UpdatePullRequest {
                owner: "octocat".to_string(),
                repo: "hello-world".to_string(),
                number: 42,
                update: PullRequestUpdate::closed(),
            }]
        );
    }
}

// =============================================================================
// Commit Status
// =============================================================================

mod status_tests {
    use super::*;

    #[tokio::test]
    async fn status_lands_on_head_commit_with_exact_fields() {
        let api =
            MockGitHubApi::with_pull_requests(vec![sample_pr(42, "feature", "head456", "main")]);
        let client = client_for(&api, EventPayload::default());

        client
            .set_pull_request_status(42, StatusState::Success, "ci", Some("all checks passed"))
            .await
            .unwrap();

        let operations = api.operations();
        assert_eq!(operations.len(), 2);
        assert!(matches!(operations[0], MockOperation::GetPullRequest { .. }));
        assert_eq!(
            operations[1],
            MockOperation::CreateCommitStatus {
                owner: "octocat".to_string(),
                repo: "hello-world".to_string(),
                sha: "head456".to_string(),
                state: StatusState::Success,
                context: "ci".to_string(),
                description: Some("all checks passed".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn repeated_statuses_accumulate_history() {
        let api =
            MockGitHubApi::with_pull_requests(vec![sample_pr(42, "feature", "head456", "main")]);
        let client = client_for(&api, EventPayload::default());

        client
            .set_pull_request_status(42, StatusState::Pending, "merge-check", None)
            .await
            .unwrap();
        client
            .set_pull_request_status(42, StatusState::Success, "merge-check", Some("done"))
            .await
            .unwrap();

        let statuses = api.statuses_for("head456");
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].state, StatusState::Pending);
        assert_eq!(statuses[1].state, StatusState::Success);
    }
}

// =============================================================================
// Branch Comparison
// =============================================================================

mod compare_tests {
    use super::*;

    #[tokio::test]
    async fn same_commit_compares_equal() {
        let api = MockGitHubApi::new()
            .with_branch("main", "abc123")
            .with_branch("release", "abc123");
        let client = client_for(&api, EventPayload::default());

        assert!(client.compare_branch_heads("main", "release").await.unwrap());
    }

    #[tokio::test]
    async fn branch_compared_with_itself_is_equal() {
        let api = MockGitHubApi::new().with_branch("main", "abc123");
        let client = client_for(&api, EventPayload::default());

        assert!(client.compare_branch_heads("main", "main").await.unwrap());
    }

    #[tokio::test]
    async fn differing_commits_compare_unequal() {
        let api = MockGitHubApi::new()
            .with_branch("main", "abc123")
            .with_branch("feature", "def456");
        let client = client_for(&api, EventPayload::default());

        assert!(!client.compare_branch_heads("main", "feature").await.unwrap());
    }

    #[tokio::test]
    async fn fetches_both_branches_in_order() {
        let api = MockGitHubApi::new()
            .with_branch("main", "abc123")
            .with_branch("feature", "def456");
        let client = client_for(&api, EventPayload::default());

        client.compare_branch_heads("main", "feature").await.unwrap();

        let operations = api.operations();
        assert_eq!(operations.len(), 2);
        assert!(matches!(
            &operations[0],
            MockOperation::GetBranch { branch, .. } if branch == "main"
        ));
        assert!(matches!(
            &operations[1],
            MockOperation::GetBranch { branch, .. } if branch == "feature"
        ));
    }

    #[tokio::test]
    async fn missing_branch_propagates_not_found() {
        let api = MockGitHubApi::new().with_branch("main", "abc123");
        let client = client_for(&api, EventPayload::default());

        let result = client.compare_branch_heads("main", "ghost").await;
        assert!(matches!(result, Err(ClientError::Api(ApiError::NotFound(_)))));
    }
}

// =============================================================================
// Error Propagation
// =============================================================================

mod error_tests {
    use super::*;

    #[tokio::test]
    async fn injected_error_surfaces_unchanged() {
        let api = MockGitHubApi::new().fail_on(FailOn::GetPullRequest(ApiError::RateLimited));
        let client = client_for(&api, EventPayload::default());

        let err = client.pull_request(42).await.unwrap_err();
        assert!(matches!(err, ClientError::Api(ApiError::RateLimited)));
    }

    #[tokio::test]
    async fn error_message_is_preserved() {
        let api = MockGitHubApi::new().fail_on(FailOn::CreateIssueComment(ApiError::AuthFailed(
            "bad credentials".to_string(),
        )));
        let client = client_for(&api, EventPayload::default());

        let err = client
            .comment_on_pull_request(42, "hello")
            .await
            .unwrap_err();
        assert_eq!(format!("{err}"), "authentication failed: bad credentials");
    }

    #[tokio::test]
    async fn failed_operation_is_still_recorded() {
        let api = MockGitHubApi::new().fail_on(FailOn::GetBranch(ApiError::RateLimited));
        let client = client_for(&api, EventPayload::default());

        let _ = client.compare_branch_heads("main", "feature").await;

        assert_eq!(api.operations().len(), 1);
    }
}

// =============================================================================
// End-to-End Flow
// =============================================================================

mod flow_tests {
    use super::*;

    #[tokio::test]
    async fn fast_forward_flow_from_event_payload() {
        let api =
            MockGitHubApi::with_pull_requests(vec![sample_pr(42, "feature", "head456", "main")])
                .with_branch("main", "base123");
        let client = client_for(&api, EventPayload::for_pull_request(42));

        let number = client.current_pull_request_number().unwrap();
        client
            .comment_on_pull_request(number, "Fast forwarding...")
            .await
            .unwrap();
        client.fast_forward_target_to_source(number).await.unwrap();
        client
            .set_pull_request_status(number, StatusState::Success, "fast-forward", None)
            .await
            .unwrap();

        assert_eq!(api.branch_sha("main").as_deref(), Some("head456"));
        assert_eq!(api.comments_for(42).len(), 1);
        assert_eq!(api.statuses_for("head456").len(), 1);

        let kinds: Vec<&str> = api
            .operations()
            .iter()
            .map(|op| match op {
                MockOperation::CreateIssueComment { .. } => "comment",
                MockOperation::UpdateReference { .. } => "update-ref",
                MockOperation::UpdatePullRequest { .. } => "update-pr",
                MockOperation::GetPullRequest { .. } => "get-pr",
                MockOperation::CreateCommitStatus { .. } => "create-status",
                MockOperation::GetBranch { .. } => "get-branch",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["comment", "get-pr", "update-ref", "get-pr", "create-status"]
        );
    }
}
