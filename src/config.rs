use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::auth::{Credential, CredentialLookup, CredentialStore, Token};
use crate::error::{ConfigError, NotifyError};
use crate::notification::DEFAULT_CONTEXT;
use crate::source::SourceContext;

/// Configuration file structure for githubnotify.
///
/// Holds the credential stores, the outbound proxy and defaults for the
/// notification step. Files are looked up in the current directory, then in
/// the user's config directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// GitHub endpoint defaults
    #[serde(default)]
    pub github: GitHubConfig,

    /// Outbound HTTP proxy
    #[serde(default)]
    pub proxy: Option<ProxyConfig>,

    /// Global credential store
    #[serde(default)]
    pub credentials: Vec<Credential>,

    /// Folder-scoped credential stores
    #[serde(default)]
    pub folders: Vec<FolderConfig>,

    /// Default source context of the build
    #[serde(default)]
    pub job: SourceContext,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitHubConfig {
    /// Enterprise API base URL used when the step gives none
    pub api_url: Option<String>,

    /// Status label used when the step gives none
    #[serde(default = "default_context")]
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProxyConfig {
    /// Proxy URL, e.g. `http://proxy.internal:3128`
    pub url: String,

    pub username: Option<String>,

    pub password: Option<Token>,

    /// Hosts reached without the proxy
    #[serde(default)]
    pub no_proxy: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FolderConfig {
    /// Folder path, e.g. `org/team`
    pub path: String,

    #[serde(default)]
    pub credentials: Vec<Credential>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            context: default_context(),
        }
    }
}

fn default_context() -> String {
    DEFAULT_CONTEXT.to_string()
}

impl ProxyConfig {
    pub fn to_reqwest(&self) -> crate::error::Result<reqwest::Proxy> {
        let mut proxy = reqwest::Proxy::all(&self.url).map_err(|e| {
            NotifyError::Config(ConfigError::InvalidUrl {
                url: self.url.clone(),
                reason: e.to_string(),
            })
        })?;

        if let Some(username) = &self.username {
            let password = self.password.as_ref().map(Token::as_str).unwrap_or("");
            proxy = proxy.basic_auth(username, password);
        }

        if !self.no_proxy.is_empty() {
            proxy = proxy.no_proxy(reqwest::NoProxy::from_string(&self.no_proxy.join(",")));
        }

        Ok(proxy)
    }
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./githubnotify.toml
    /// 3. ./githubnotify.json
    /// 4. ./githubnotify.yaml
    /// 5. ./githubnotify.yml
    /// 6. `<config dir>/githubnotify/config.toml`
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let candidates = [
            "githubnotify.toml",
            "githubnotify.json",
            "githubnotify.yaml",
            "githubnotify.yml",
        ];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        if let Some(path) = user_config_path().filter(|path| path.exists()) {
            return Self::load_from_path(&path);
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        load_document(path, "config")
    }

    /// Credential stores visible from `job`, nearest folder first, global last.
    pub fn credential_lookup(&self, job: Option<&str>) -> CredentialLookup {
        let mut folders: Vec<&FolderConfig> = self
            .folders
            .iter()
            .filter(|folder| job.is_some_and(|job| is_ancestor(&folder.path, job)))
            .collect();
        folders.sort_by_key(|folder| std::cmp::Reverse(folder_depth(&folder.path)));

        let lookup = folders.into_iter().fold(CredentialLookup::new(), |lookup, folder| {
            lookup.with_provider(CredentialStore::new(
                format!("folder:{}", folder.path.trim_matches('/')),
                folder.credentials.clone(),
            ))
        });

        lookup.with_provider(CredentialStore::new("global", self.credentials.clone()))
    }
}

/// Read a TOML, JSON or YAML document, choosing the format by extension.
pub fn load_document<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {what} file: {}", path.display()))?;

    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

    match extension {
        "toml" => toml::from_str(&contents)
            .with_context(|| format!("Failed to parse TOML {what}: {}", path.display())),
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse JSON {what}: {}", path.display())),
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML {what}: {}", path.display())),
        _ => {
            // Try TOML first, then JSON, then YAML
            toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse {what} file: {}", path.display()))
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("githubnotify").join("config.toml"))
}

fn folder_depth(path: &str) -> usize {
    path.split('/').filter(|part| !part.is_empty()).count()
}

/// Whether `folder` contains `job` (strictly: a job is not its own folder).
fn is_ancestor(folder: &str, job: &str) -> bool {
    let folder: Vec<&str> = folder.split('/').filter(|part| !part.is_empty()).collect();
    let job: Vec<&str> = job.split('/').filter(|part| !part.is_empty()).collect();
    !folder.is_empty() && folder.len() < job.len() && job.starts_with(&folder)
}
