use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::UsernamePassword;
use crate::config::ProxyConfig;
use crate::error::{ConfigError, NotifyError, Result};

use super::types::{
    GitHubCommit, GitHubCommitStatus, GitHubRepository, GitHubUser, NewCommitStatus,
};

/// Public GitHub API endpoint, used when no enterprise URL is given.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("githubnotify/", env!("CARGO_PKG_VERSION"));

/// GitHub REST API client bound to one endpoint and one set of credentials.
#[derive(Clone)]
pub struct GitHubClient {
    /// HTTP client
    client: reqwest::Client,
    /// Base URL for the API, without trailing slash
    api_url: String,
    /// Parsed base URL that request paths are appended to
    base: Url,
    /// Credentials sent with every request
    credentials: Option<UsernamePassword>,
}

/// Builder for [`GitHubClient`].
#[derive(Default)]
pub struct GitHubClientBuilder {
    endpoint: Option<String>,
    proxy: Option<ProxyConfig>,
    credentials: Option<UsernamePassword>,
}

impl GitHubClientBuilder {
    /// Authenticate with the secret of a username/password credential.
    pub fn with_oauth_token(mut self, credentials: UsernamePassword) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Point the client at a GitHub Enterprise API instead of the public one.
    pub fn with_endpoint(mut self, api_url: impl Into<String>) -> Self {
        self.endpoint = Some(api_url.into());
        self
    }

    pub fn with_proxy(mut self, proxy: Option<ProxyConfig>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn build(self) -> Result<GitHubClient> {
        let api_url = self
            .endpoint
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let base = Url::parse(&api_url).map_err(|e| ConfigError::InvalidUrl {
            url: api_url.clone(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl {
                url: api_url,
                reason: "not a hierarchical URL".to_string(),
            }
            .into());
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );

        let builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers);

        // Only the configured proxy is honored, never the process environment.
        let builder = match &self.proxy {
            Some(proxy) => builder.proxy(proxy.to_reqwest()?),
            None => builder.no_proxy(),
        };

        let client = builder
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        Ok(GitHubClient {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            base,
            credentials: self.credentials,
        })
    }
}

impl GitHubClient {
    pub fn builder() -> GitHubClientBuilder {
        GitHubClientBuilder::default()
    }

    /// Base URL this client talks to.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Checks the credentials against the endpoint.
    ///
    /// Any failure, authentication or transport, counts as invalid.
    pub async fn is_credential_valid(&self) -> bool {
        match self.current_user().await {
            Ok(user) => {
                debug!("Authenticated against {} as {}", self.api_url, user.login);
                true
            }
            Err(e) => {
                debug!("Credential check against {} failed: {e}", self.api_url);
                false
            }
        }
    }

    pub async fn current_user(&self) -> Result<GitHubUser> {
        let response = self.get(self.endpoint(&["user"])?).send().await?;
        parse(response).await
    }

    /// Fetch a repository, `None` when the account has no such repository.
    ///
    /// A `null` body is treated the same as a 404.
    pub async fn get_repository(&self, owner: &str, repo: &str) -> Result<Option<GitHubRepository>> {
        let response = self
            .get(self.endpoint(&["repos", owner, repo])?)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        parse(response).await
    }

    /// Fetch a commit by SHA, `None` when the repository does not contain it.
    pub async fn get_commit(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> Result<Option<GitHubCommit>> {
        let response = self
            .get(self.endpoint(&["repos", owner, repo, "commits", sha])?)
            .send()
            .await?;

        // 422 is what GitHub answers for refs that are not even valid SHAs.
        if matches!(
            response.status(),
            StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY
        ) {
            return Ok(None);
        }

        parse(response).await
    }

    pub async fn create_commit_status(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
        status: &NewCommitStatus<'_>,
    ) -> Result<GitHubCommitStatus> {
        let url = self.endpoint(&["repos", owner, repo, "statuses", sha])?;
        debug!("POST {url}");

        let response = self
            .auth_request(self.client.post(url))
            .json(status)
            .send()
            .await?;

        parse(response).await
    }

    /// Append path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ConfigError::InvalidUrl {
                url: self.api_url.clone(),
                reason: "not a hierarchical URL".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get(&self, url: Url) -> RequestBuilder {
        debug!("GET {url}");
        self.auth_request(self.client.get(url))
    }

    fn auth_request(&self, request: RequestBuilder) -> RequestBuilder {
        if let Some(credentials) = &self.credentials {
            request.bearer_auth(credentials.password.as_str())
        } else {
            request
        }
    }
}

async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();

    if !status.is_success() {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        return Err(NotifyError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.json().await?)
}
