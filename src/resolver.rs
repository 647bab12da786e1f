use log::debug;

use crate::error::{MissingData, Result};
use crate::notification::{NotificationRequest, StepParameters, DEFAULT_CONTEXT};
use crate::source::SourceContext;

/// Fills the step parameters the pipeline left out from the build's source context.
pub struct ParameterResolver<'a> {
    context: &'a SourceContext,
    /// Endpoint used when the step names none
    default_api_url: Option<&'a str>,
    /// Status label used when the step names none
    default_context: &'a str,
}

impl<'a> ParameterResolver<'a> {
    pub fn new(context: &'a SourceContext) -> Self {
        Self {
            context,
            default_api_url: None,
            default_context: DEFAULT_CONTEXT,
        }
    }

    pub fn with_defaults(mut self, api_url: Option<&'a str>, context: &'a str) -> Self {
        self.default_api_url = api_url.filter(|url| !url.is_empty());
        self.default_context = context;
        self
    }

    /// Resolve every field of the notification, failing on the first one that
    /// is neither given nor inferable.
    ///
    /// Fields are resolved in this order: target URL, credentials, repository,
    /// account, commit.
    pub fn resolve(&self, params: StepParameters) -> Result<NotificationRequest> {
        let params = params.normalized();

        let target_url = self.target_url(&params);
        let credentials_id = self.credentials_id(&params)?;
        let repo_name = self.repo(&params)?;
        let repo_owner = self.account(&params)?;
        let commit_sha = self.sha(&params)?;

        Ok(NotificationRequest {
            status: params.status,
            description: params.description,
            context: params
                .context
                .unwrap_or_else(|| self.default_context.to_string()),
            repo_owner,
            repo_name,
            commit_sha,
            credentials_id,
            api_url: params
                .git_api_url
                .or_else(|| self.default_api_url.map(str::to_string)),
            target_url,
        })
    }

    fn target_url(&self, params: &StepParameters) -> Option<String> {
        params.target_url.clone().or_else(|| {
            debug!("No targetUrl given, using the build URL");
            self.context.build_url.clone()
        })
    }

    fn credentials_id(&self, params: &StepParameters) -> Result<String> {
        if let Some(id) = &params.credentials_id {
            return Ok(id.clone());
        }

        let inferred = self
            .context
            .github_source()
            .and_then(|source| source.scan_credentials_id.clone())
            .filter(|id| !id.is_empty())
            .ok_or(MissingData::Credentials)?;
        debug!("Inferred credentialsId {inferred} from the GitHub source");
        Ok(inferred)
    }

    fn repo(&self, params: &StepParameters) -> Result<String> {
        if let Some(repo) = &params.repo {
            return Ok(repo.clone());
        }

        let source = self.context.github_source().ok_or(MissingData::Repository)?;
        debug!("Inferred repo {} from the GitHub source", source.repository);
        Ok(source.repository.clone())
    }

    fn account(&self, params: &StepParameters) -> Result<String> {
        if let Some(account) = &params.account {
            return Ok(account.clone());
        }

        let source = self.context.github_source().ok_or(MissingData::Repository)?;
        debug!("Inferred account {} from the GitHub source", source.repo_owner);
        Ok(source.repo_owner.clone())
    }

    fn sha(&self, params: &StepParameters) -> Result<String> {
        if let Some(sha) = &params.sha {
            return Ok(sha.clone());
        }

        let sha = self.context.revision_hash().ok_or(MissingData::Commit)?;
        debug!("Inferred sha {sha} from the build revision");
        Ok(sha.to_string())
    }
}
