use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("{0}")]
    MissingData(MissingData),

    #[error("{0}")]
    Config(ConfigError),

    #[error("The supplied credentials are invalid to login")]
    Auth,

    #[error("The specified repository does not exists for the specified account")]
    RepoNotFound,

    /// Also raised when the commit lookup itself fails; the cause is kept as source.
    #[error("The specified commit does not exists in the specified repository")]
    CommitNotFound(#[source] Option<Box<NotifyError>>),

    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A required notification field that was neither supplied nor inferable.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingData {
    #[error("Unable to infer git data, please specify repo, credentialsId, account and sha values")]
    Repository,

    #[error("Could not infer exact commit to use, please specify one")]
    Commit,

    #[error("Can not infer exact credentialsId to use, please specify one")]
    Credentials,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Credentials ID is null or empty")]
    EmptyCredentialsId,

    #[error("The credentialsId does not seem to exist, please check it")]
    CredentialsNotFound,

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

impl From<MissingData> for NotifyError {
    fn from(missing: MissingData) -> Self {
        NotifyError::MissingData(missing)
    }
}

impl From<ConfigError> for NotifyError {
    fn from(error: ConfigError) -> Self {
        NotifyError::Config(error)
    }
}

pub type Result<T> = std::result::Result<T, NotifyError>;
