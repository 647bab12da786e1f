use log::{debug, info, warn};

use crate::auth::CredentialLookup;
use crate::config::ProxyConfig;
use crate::error::{ConfigError, NotifyError, Result};
use crate::notification::NotificationRequest;
use crate::output::PhaseProgress;

use super::client::{GitHubClient, DEFAULT_API_URL};
use super::types::{GitHubCommit, GitHubCommitStatus, GitHubRepository, NewCommitStatus};

/// Sends commit statuses to GitHub using credentials from the scoped stores.
pub struct GitHubProvider<'a> {
    /// Credential stores visible from the job, nearest scope first
    credentials: &'a CredentialLookup,
    /// Outbound HTTP proxy
    proxy: Option<&'a ProxyConfig>,
}

impl<'a> GitHubProvider<'a> {
    pub fn new(credentials: &'a CredentialLookup, proxy: Option<&'a ProxyConfig>) -> Self {
        Self { credentials, proxy }
    }

    /// Build a client for the endpoint and check that the credentials log in.
    ///
    /// # Arguments
    ///
    /// * `credentials_id` - Id of a username/password credential
    /// * `api_url` - Enterprise API base URL, public GitHub when `None`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The credentials id is empty or matches no username/password credential
    /// - The API or proxy URL is malformed
    /// - The endpoint rejects the credentials
    pub async fn connect(
        &self,
        credentials_id: Option<&str>,
        api_url: Option<&str>,
    ) -> Result<GitHubClient> {
        let credentials_id = credentials_id
            .filter(|id| !id.is_empty())
            .ok_or(ConfigError::EmptyCredentialsId)?;

        let credentials = self
            .credentials
            .find_username_password(credentials_id)
            .ok_or(ConfigError::CredentialsNotFound)?;

        let mut builder = GitHubClient::builder()
            .with_oauth_token(credentials.clone())
            .with_proxy(self.proxy.cloned());

        if let Some(api_url) = api_url.filter(|url| !url.is_empty()) {
            builder = builder.with_endpoint(api_url);
        }

        let client = builder.build()?;

        if client.is_credential_valid().await {
            Ok(client)
        } else {
            Err(NotifyError::Auth)
        }
    }

    /// Fetch the repository or fail with [`NotifyError::RepoNotFound`].
    pub async fn repository(
        &self,
        client: &GitHubClient,
        account: &str,
        repo: &str,
    ) -> Result<GitHubRepository> {
        client
            .get_repository(account, repo)
            .await?
            .ok_or(NotifyError::RepoNotFound)
    }

    /// Fetch the commit or fail with [`NotifyError::CommitNotFound`].
    ///
    /// Lookup failures are reported as a missing commit as well.
    pub async fn commit(
        &self,
        client: &GitHubClient,
        repository: &GitHubRepository,
        sha: &str,
    ) -> Result<GitHubCommit> {
        match client
            .get_commit(&repository.owner.login, &repository.name, sha)
            .await
        {
            Ok(Some(commit)) => Ok(commit),
            Ok(None) => Err(NotifyError::CommitNotFound(None)),
            Err(e) => {
                warn!("Commit lookup for {sha} in {} failed: {e}", repository.full_name);
                Err(NotifyError::CommitNotFound(Some(Box::new(e))))
            }
        }
    }

    /// Authenticate, validate the target and create the commit status.
    ///
    /// Every call issues its own status creation request; nothing is deduplicated.
    pub async fn notify(&self, request: &NotificationRequest) -> Result<GitHubCommitStatus> {
        let full_name = request.full_name();
        info!(
            "Sending {} status for {}@{}",
            request.status, full_name, request.commit_sha
        );

        let progress = PhaseProgress::start_authentication(
            request.api_url.as_deref().unwrap_or(DEFAULT_API_URL),
        );
        let client = self
            .connect(Some(request.credentials_id.as_str()), request.api_url.as_deref())
            .await
            .inspect_err(|e| progress.fail(e))?;

        let progress = progress.finish_authentication_start_validation(&full_name);
        let repository = self
            .repository(&client, &request.repo_owner, &request.repo_name)
            .await
            .inspect_err(|e| progress.fail(e))?;
        let commit = self
            .commit(&client, &repository, &request.commit_sha)
            .await
            .inspect_err(|e| progress.fail(e))?;

        let progress = progress.finish_validation_start_dispatch(&commit.sha);
        if request.target_url.is_none() {
            warn!("No target URL given or inferable, the status will not link anywhere");
        }

        let new_status = NewCommitStatus {
            state: request.status,
            target_url: request.target_url.as_deref(),
            description: &request.description,
            context: &request.context,
        };
        let status = client
            .create_commit_status(
                &repository.owner.login,
                &repository.name,
                &commit.sha,
                &new_status,
            )
            .await
            .inspect_err(|e| progress.fail(e))?;

        progress.finish_dispatch();
        debug!("Created status {} with context {}", status.id, request.context);
        info!("Commit status {} sent to {}@{}", status.state, full_name, commit.sha);

        Ok(status)
    }
}
