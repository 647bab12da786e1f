use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::json;

use crate::auth::{Credential, CredentialKind, CredentialLookup, CredentialStore, Token, UsernamePassword};
use crate::config::ProxyConfig;
use crate::error::{ConfigError, NotifyError};
use crate::notification::NotificationRequest;

use super::{CommitState, GitHubClient, GitHubProvider, DEFAULT_API_URL};

const ACCOUNT: &str = "raul-arabaolaza";
const REPO: &str = "acceptance-test-harness";
const SHA: &str = "0b5936eb903d439ac0c0bf84940d73128d5e9487";

fn lookup() -> CredentialLookup {
    CredentialLookup::new().with_provider(CredentialStore::new(
        "global",
        vec![
            Credential {
                id: "dummy".to_string(),
                description: Some("Dummy Credentials".to_string()),
                kind: CredentialKind::UsernamePassword(UsernamePassword {
                    username: "dummy".to_string(),
                    password: Token::from("ghp_dummy"),
                }),
            },
            Credential {
                id: "text-only".to_string(),
                description: None,
                kind: CredentialKind::SecretText {
                    secret: Token::from("ghp_text"),
                },
            },
        ],
    ))
}

fn request(api_url: String) -> NotificationRequest {
    NotificationRequest {
        status: CommitState::Success,
        description: "All tests are OK".to_string(),
        context: "jenkins/githubnotify".to_string(),
        repo_owner: ACCOUNT.to_string(),
        repo_name: REPO.to_string(),
        commit_sha: SHA.to_string(),
        credentials_id: "dummy".to_string(),
        api_url: Some(api_url),
        target_url: Some("http://www.cloudbees.com".to_string()),
    }
}

async fn mock_user(server: &mut ServerGuard, prefix: &str, status: usize) -> Mock {
    let body = if status == 200 {
        r#"{"login":"dummy"}"#
    } else {
        r#"{"message":"Bad credentials"}"#
    };

    server
        .mock("GET", format!("{prefix}/user").as_str())
        .match_header("authorization", "Bearer ghp_dummy")
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

async fn mock_repo(server: &mut ServerGuard, prefix: &str) -> Mock {
    server
        .mock("GET", format!("{prefix}/repos/{ACCOUNT}/{REPO}").as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "name": REPO,
                "full_name": format!("{ACCOUNT}/{REPO}"),
                "owner": { "login": ACCOUNT },
                "html_url": format!("https://github.com/{ACCOUNT}/{REPO}"),
            })
            .to_string(),
        )
        .create_async()
        .await
}

async fn mock_commit(server: &mut ServerGuard, prefix: &str) -> Mock {
    server
        .mock("GET", format!("{prefix}/repos/{ACCOUNT}/{REPO}/commits/{SHA}").as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "sha": SHA }).to_string())
        .create_async()
        .await
}

async fn mock_status(server: &mut ServerGuard, prefix: &str, times: usize) -> Mock {
    server
        .mock("POST", format!("{prefix}/repos/{ACCOUNT}/{REPO}/statuses/{SHA}").as_str())
        .match_header("authorization", "Bearer ghp_dummy")
        .match_body(Matcher::Json(json!({
            "state": "success",
            "target_url": "http://www.cloudbees.com",
            "description": "All tests are OK",
            "context": "jenkins/githubnotify",
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": 1,
                "state": "success",
                "target_url": "http://www.cloudbees.com",
                "description": "All tests are OK",
                "context": "jenkins/githubnotify",
            })
            .to_string(),
        )
        .expect(times)
        .create_async()
        .await
}

#[test]
fn test_client_defaults_to_public_endpoint() {
    let client = GitHubClient::builder().build().unwrap();
    assert_eq!(client.api_url(), DEFAULT_API_URL);
}

#[test]
fn test_client_uses_enterprise_endpoint() {
    let client = GitHubClient::builder()
        .with_endpoint("https://api.example.com/")
        .build()
        .unwrap();
    assert_eq!(client.api_url(), "https://api.example.com");
}

#[test]
fn test_client_rejects_malformed_endpoint() {
    let result = GitHubClient::builder().with_endpoint("not a url").build();
    assert!(matches!(
        result,
        Err(NotifyError::Config(ConfigError::InvalidUrl { .. }))
    ));
}

#[tokio::test]
async fn test_empty_credentials_id() {
    let credentials = lookup();
    let provider = GitHubProvider::new(&credentials, None);

    for id in [None, Some("")] {
        let err = provider.connect(id, None).await.err().unwrap();
        assert_eq!(err.to_string(), "Credentials ID is null or empty");
    }
}

#[tokio::test]
async fn test_not_existing_credentials() {
    let credentials = lookup();
    let provider = GitHubProvider::new(&credentials, None);

    let err = provider.connect(Some("notExisting"), None).await.err().unwrap();
    assert_eq!(
        err.to_string(),
        "The credentialsId does not seem to exist, please check it"
    );

    // Only username/password credentials can log in.
    let err = provider.connect(Some("text-only"), None).await.err().unwrap();
    assert!(matches!(
        err,
        NotifyError::Config(ConfigError::CredentialsNotFound)
    ));
}

#[tokio::test]
async fn test_wrong_credentials() {
    let mut server = Server::new_async().await;
    let user = mock_user(&mut server, "", 401).await;

    let credentials = lookup();
    let provider = GitHubProvider::new(&credentials, None);
    let err = provider
        .connect(Some("dummy"), Some(server.url().as_str()))
        .await
        .err()
        .unwrap();

    assert!(matches!(err, NotifyError::Auth));
    assert_eq!(err.to_string(), "The supplied credentials are invalid to login");
    user.assert_async().await;
}

#[tokio::test]
async fn test_wrong_credentials_enterprise() {
    let mut server = Server::new_async().await;
    let user = mock_user(&mut server, "/api/v3", 401).await;

    let credentials = lookup();
    let provider = GitHubProvider::new(&credentials, None);
    let api_url = format!("{}/api/v3", server.url());
    let err = provider
        .connect(Some("dummy"), Some(api_url.as_str()))
        .await
        .err()
        .unwrap();

    assert!(matches!(err, NotifyError::Auth));
    user.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_endpoint_counts_as_invalid_credentials() {
    let credentials = lookup();
    let provider = GitHubProvider::new(&credentials, None);

    // Nothing listens on port 9 of the loopback interface.
    let err = provider
        .connect(Some("dummy"), Some("http://127.0.0.1:9"))
        .await
        .err()
        .unwrap();

    assert!(matches!(err, NotifyError::Auth));
}

#[tokio::test]
async fn test_wrong_repo() {
    let mut server = Server::new_async().await;
    let _user = mock_user(&mut server, "", 200).await;
    let repo = server
        .mock("GET", format!("/repos/{ACCOUNT}/{REPO}").as_str())
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"Not Found"}"#)
        .create_async()
        .await;
    let status = mock_status(&mut server, "", 0).await;

    let credentials = lookup();
    let provider = GitHubProvider::new(&credentials, None);
    let err = provider.notify(&request(server.url())).await.unwrap_err();

    assert!(matches!(err, NotifyError::RepoNotFound));
    assert_eq!(
        err.to_string(),
        "The specified repository does not exists for the specified account"
    );
    repo.assert_async().await;
    status.assert_async().await;
}

#[tokio::test]
async fn test_null_repository() {
    let mut server = Server::new_async().await;
    let _user = mock_user(&mut server, "", 200).await;
    let repo = server
        .mock("GET", format!("/repos/{ACCOUNT}/{REPO}").as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("null")
        .create_async()
        .await;
    let status = mock_status(&mut server, "", 0).await;

    let credentials = lookup();
    let provider = GitHubProvider::new(&credentials, None);
    let err = provider.notify(&request(server.url())).await.unwrap_err();

    assert!(matches!(err, NotifyError::RepoNotFound));
    repo.assert_async().await;
    status.assert_async().await;
}

#[tokio::test]
async fn test_path_segments_are_percent_encoded() {
    let mut server = Server::new_async().await;
    let commit = server
        .mock(
            "GET",
            format!("/repos/{ACCOUNT}/{REPO}/commits/abc%3Fx%23y").as_str(),
        )
        .match_header("authorization", "Bearer ghp_dummy")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "sha": SHA }).to_string())
        .create_async()
        .await;

    let client = GitHubClient::builder()
        .with_endpoint(server.url())
        .with_oauth_token(UsernamePassword {
            username: "dummy".to_string(),
            password: Token::from("ghp_dummy"),
        })
        .build()
        .unwrap();
    let found = client.get_commit(ACCOUNT, REPO, "abc?x#y").await.unwrap();

    assert_eq!(found.map(|c| c.sha).as_deref(), Some(SHA));
    commit.assert_async().await;
}

#[tokio::test]
async fn test_wrong_commit() {
    let mut server = Server::new_async().await;
    let _user = mock_user(&mut server, "", 200).await;
    let _repo = mock_repo(&mut server, "").await;
    let commit = server
        .mock("GET", format!("/repos/{ACCOUNT}/{REPO}/commits/{SHA}").as_str())
        .with_status(422)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"No commit found for SHA"}"#)
        .create_async()
        .await;
    let status = mock_status(&mut server, "", 0).await;

    let credentials = lookup();
    let provider = GitHubProvider::new(&credentials, None);
    let err = provider.notify(&request(server.url())).await.unwrap_err();

    assert!(matches!(err, NotifyError::CommitNotFound(None)));
    commit.assert_async().await;
    status.assert_async().await;
}

#[tokio::test]
async fn test_commit_lookup_error_is_reported_as_missing_commit() {
    let mut server = Server::new_async().await;
    let _user = mock_user(&mut server, "", 200).await;
    let _repo = mock_repo(&mut server, "").await;
    let _commit = server
        .mock("GET", format!("/repos/{ACCOUNT}/{REPO}/commits/{SHA}").as_str())
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let credentials = lookup();
    let provider = GitHubProvider::new(&credentials, None);
    let err = provider.notify(&request(server.url())).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "The specified commit does not exists in the specified repository"
    );
    match err {
        NotifyError::CommitNotFound(Some(source)) => {
            assert!(matches!(*source, NotifyError::Api { status: 500, .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_notify_success() {
    let mut server = Server::new_async().await;
    let user = mock_user(&mut server, "", 200).await;
    let repo = mock_repo(&mut server, "").await;
    let commit = mock_commit(&mut server, "").await;
    let status = mock_status(&mut server, "", 1).await;

    let credentials = lookup();
    let provider = GitHubProvider::new(&credentials, None);
    let created = provider.notify(&request(server.url())).await.unwrap();

    assert_eq!(created.state, CommitState::Success);
    assert_eq!(created.target_url.as_deref(), Some("http://www.cloudbees.com"));
    assert_eq!(created.context.as_deref(), Some("jenkins/githubnotify"));
    user.assert_async().await;
    repo.assert_async().await;
    commit.assert_async().await;
    status.assert_async().await;
}

#[tokio::test]
async fn test_notify_success_enterprise() {
    let mut server = Server::new_async().await;
    let _user = mock_user(&mut server, "/api/v3", 200).await;
    let _repo = mock_repo(&mut server, "/api/v3").await;
    let _commit = mock_commit(&mut server, "/api/v3").await;
    let status = mock_status(&mut server, "/api/v3", 1).await;

    let credentials = lookup();
    let provider = GitHubProvider::new(&credentials, None);
    let created = provider
        .notify(&request(format!("{}/api/v3", server.url())))
        .await
        .unwrap();

    assert_eq!(created.state, CommitState::Success);
    status.assert_async().await;
}

#[tokio::test]
async fn test_notify_twice_sends_two_statuses() {
    let mut server = Server::new_async().await;
    let _user = mock_user(&mut server, "", 200).await;
    let _repo = mock_repo(&mut server, "").await;
    let _commit = mock_commit(&mut server, "").await;
    let status = mock_status(&mut server, "", 2).await;

    let credentials = lookup();
    let provider = GitHubProvider::new(&credentials, None);
    let request = request(server.url());

    provider.notify(&request).await.unwrap();
    provider.notify(&request).await.unwrap();

    status.assert_async().await;
}

#[tokio::test]
async fn test_status_without_target_url() {
    let mut server = Server::new_async().await;
    let _user = mock_user(&mut server, "", 200).await;
    let _repo = mock_repo(&mut server, "").await;
    let _commit = mock_commit(&mut server, "").await;
    let status = server
        .mock("POST", format!("/repos/{ACCOUNT}/{REPO}/statuses/{SHA}").as_str())
        .match_body(Matcher::Json(json!({
            "state": "pending",
            "description": "",
            "context": "ci/build",
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":2,"state":"pending","context":"ci/build"}"#)
        .create_async()
        .await;

    let credentials = lookup();
    let provider = GitHubProvider::new(&credentials, None);
    let request = NotificationRequest {
        status: CommitState::Pending,
        description: String::new(),
        context: "ci/build".to_string(),
        target_url: None,
        ..request(server.url())
    };

    let created = provider.notify(&request).await.unwrap();
    assert_eq!(created.state, CommitState::Pending);
    assert_eq!(created.target_url, None);
    status.assert_async().await;
}

#[tokio::test]
async fn test_requests_go_through_configured_proxy() {
    let mut proxy_server = Server::new_async().await;
    // Only reachable through the proxy, the .invalid domain never resolves.
    let user = mock_user(&mut proxy_server, "/api/v3", 200).await;

    let proxy = ProxyConfig {
        url: proxy_server.url(),
        username: None,
        password: None,
        no_proxy: vec![],
    };
    let credentials = lookup();
    let provider = GitHubProvider::new(&credentials, Some(&proxy));
    let client = provider
        .connect(Some("dummy"), Some("http://github.invalid/api/v3"))
        .await
        .unwrap();

    assert_eq!(client.api_url(), "http://github.invalid/api/v3");
    user.assert_async().await;
}

#[tokio::test]
async fn test_no_proxy_hosts_bypass_the_proxy() {
    let mut proxy_server = Server::new_async().await;
    let proxied = proxy_server
        .mock("GET", "/user")
        .expect(0)
        .create_async()
        .await;
    let mut api_server = Server::new_async().await;
    let user = mock_user(&mut api_server, "", 200).await;

    let proxy = ProxyConfig {
        url: proxy_server.url(),
        username: None,
        password: None,
        no_proxy: vec!["127.0.0.1".to_string()],
    };
    let credentials = lookup();
    let provider = GitHubProvider::new(&credentials, Some(&proxy));
    provider
        .connect(Some("dummy"), Some(api_server.url().as_str()))
        .await
        .unwrap();

    user.assert_async().await;
    proxied.assert_async().await;
}
