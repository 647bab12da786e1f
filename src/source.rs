use serde::{Deserialize, Serialize};

/// Source-control metadata of the build being reported on.
///
/// Built fresh for every invocation from the config file, the
/// `--source-context` file and the CI environment; never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SourceContext {
    /// Full job path, e.g. `org/team/project/main`. Scopes credential lookup.
    #[serde(default)]
    pub job: Option<String>,

    /// Display URL of the build, used as the default status target URL.
    #[serde(default)]
    pub build_url: Option<String>,

    /// Sources configured on the job's parent. `None` when the parent is not
    /// a multi-source container at all.
    #[serde(default)]
    pub sources: Option<Vec<ScmSource>>,

    /// Revision the build ran against.
    #[serde(default)]
    pub revision: Option<ScmRevision>,
}

impl SourceContext {
    /// The first GitHub source configured on the parent, if any.
    pub fn github_source(&self) -> Option<&GitHubSource> {
        self.sources.as_deref()?.iter().find_map(|source| match source {
            ScmSource::Github(github) => Some(github),
            ScmSource::Other => None,
        })
    }

    /// Commit hash recorded by the revision, for the revision kinds that carry one.
    pub fn revision_hash(&self) -> Option<&str> {
        match self.revision.as_ref()? {
            ScmRevision::Branch(branch) => Some(&branch.hash),
            ScmRevision::PullRequest(pr) => Some(&pr.pull_hash),
            ScmRevision::Unsupported => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ScmSource {
    Github(GitHubSource),
    /// Plain git, Bitbucket, ... Present but useless for inference.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitHubSource {
    pub repo_owner: String,
    pub repository: String,
    #[serde(default)]
    pub scan_credentials_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ScmRevision {
    Branch(BranchRevision),
    PullRequest(PullRequestRevision),
    /// Any revision kind without a usable commit hash (tags, change requests
    /// of other providers...).
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BranchRevision {
    #[serde(default)]
    pub head: Option<String>,
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PullRequestRevision {
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(default)]
    pub base_hash: Option<String>,
    pub pull_hash: String,
}
