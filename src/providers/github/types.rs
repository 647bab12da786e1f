use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// State of a commit status, as understood by the Statuses API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CommitState {
    #[default]
    #[serde(alias = "PENDING")]
    Pending,
    #[serde(alias = "SUCCESS")]
    Success,
    #[serde(alias = "ERROR")]
    Error,
    #[serde(alias = "FAILURE")]
    Failure,
}

impl CommitState {
    pub const ALL: [CommitState; 4] = [
        CommitState::Pending,
        CommitState::Success,
        CommitState::Error,
        CommitState::Failure,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CommitState::Pending => "PENDING",
            CommitState::Success => "SUCCESS",
            CommitState::Error => "ERROR",
            CommitState::Failure => "FAILURE",
        }
    }
}

impl fmt::Display for CommitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Authenticated user returned by `GET /user`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubUser {
    pub login: String,
}

/// Repository returned by `GET /repos/{owner}/{repo}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRepository {
    pub name: String,
    pub full_name: String,
    pub owner: GitHubUser,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Commit returned by `GET /repos/{owner}/{repo}/commits/{ref}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubCommit {
    /// Full SHA, even when looked up through an abbreviated ref
    pub sha: String,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Body of `POST /repos/{owner}/{repo}/statuses/{sha}`.
#[derive(Debug, Clone, Serialize)]
pub struct NewCommitStatus<'a> {
    pub state: CommitState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_url: Option<&'a str>,
    pub description: &'a str,
    pub context: &'a str,
}

/// Status record created by GitHub.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubCommitStatus {
    pub id: u64,
    pub state: CommitState,
    #[serde(default)]
    pub target_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
}
