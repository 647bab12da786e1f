use serde::{Deserialize, Serialize};

use crate::providers::github::CommitState;

pub const DEFAULT_CONTEXT: &str = "jenkins/githubnotify";

/// Raw inputs of one notification step, as given by the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepParameters {
    pub status: CommitState,
    pub description: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub credentials_id: Option<String>,
    #[serde(default)]
    pub git_api_url: Option<String>,
    #[serde(default)]
    pub target_url: Option<String>,
}

impl StepParameters {
    pub fn new(status: CommitState, description: impl Into<String>) -> Self {
        Self {
            status,
            description: description.into(),
            ..Default::default()
        }
    }

    /// Treats blank optional values as unset.
    pub fn normalized(self) -> Self {
        let Self {
            status,
            description,
            context,
            repo,
            account,
            sha,
            credentials_id,
            git_api_url,
            target_url,
        } = self;

        Self {
            status,
            description,
            context: fix_empty(context),
            repo: fix_empty(repo),
            account: fix_empty(account),
            sha: fix_empty(sha),
            credentials_id: fix_empty(credentials_id),
            git_api_url: fix_empty(git_api_url),
            target_url: fix_empty(target_url),
        }
    }
}

/// A fully resolved status notification, ready to be dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub status: CommitState,
    pub description: String,
    pub context: String,
    pub repo_owner: String,
    pub repo_name: String,
    pub commit_sha: String,
    pub credentials_id: String,
    /// `None` targets the public GitHub API.
    pub api_url: Option<String>,
    pub target_url: Option<String>,
}

impl NotificationRequest {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.repo_owner, self.repo_name)
    }
}

pub(crate) fn fix_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
