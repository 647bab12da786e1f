use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use crate::config::{load_document, Config};
use crate::notification::{fix_empty, StepParameters};
use crate::output::{print_success, render_credentials, render_states};
use crate::providers::github::{CommitState, GitHubProvider};
use crate::resolver::ParameterResolver;
use crate::source::SourceContext;

#[derive(Parser)]
#[command(name = "githubnotify")]
#[command(author, version, about = "Reports CI build statuses to GitHub commits", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file with credentials, proxy and defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// File describing the build's SCM sources and revision (TOML, JSON or YAML)
    #[arg(short, long, global = true)]
    source_context: Option<PathBuf>,

    /// Full path of the running job, scopes credential lookup
    #[arg(long, global = true, env = "JOB_NAME")]
    job: Option<String>,

    /// Display URL of the running build
    #[arg(long, global = true, env = "BUILD_URL")]
    build_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a commit status to GitHub
    Notify(NotifyArgs),

    /// Check that the credentials can log in to the endpoint
    TestConnection {
        #[command(flatten)]
        endpoint: EndpointArgs,
    },

    /// Check that the repository exists for the account
    CheckRepo {
        #[command(flatten)]
        endpoint: EndpointArgs,

        #[arg(short, long)]
        account: String,

        #[arg(short, long)]
        repo: String,
    },

    /// Check that the commit exists in the repository
    CheckSha {
        #[command(flatten)]
        endpoint: EndpointArgs,

        #[arg(short, long)]
        account: String,

        #[arg(short, long)]
        repo: String,

        #[arg(long)]
        sha: String,
    },

    /// List the username/password credentials visible from the job
    Credentials,

    /// List the accepted status values
    States,
}

#[derive(Args)]
struct NotifyArgs {
    #[arg(long, value_enum, ignore_case = true)]
    status: CommitState,

    #[arg(short, long)]
    description: String,

    /// Status label [default: jenkins/githubnotify]
    #[arg(long)]
    context: Option<String>,

    #[arg(short, long)]
    repo: Option<String>,

    #[arg(short, long)]
    account: Option<String>,

    #[arg(long)]
    sha: Option<String>,

    #[arg(long)]
    credentials_id: Option<String>,

    /// GitHub Enterprise API URL
    #[arg(long)]
    git_api_url: Option<String>,

    #[arg(long)]
    target_url: Option<String>,
}

#[derive(Args)]
struct EndpointArgs {
    #[arg(long)]
    credentials_id: Option<String>,

    /// GitHub Enterprise API URL
    #[arg(long)]
    git_api_url: Option<String>,
}

impl NotifyArgs {
    fn to_parameters(&self) -> StepParameters {
        StepParameters {
            status: self.status,
            description: self.description.clone(),
            context: self.context.clone(),
            repo: self.repo.clone(),
            account: self.account.clone(),
            sha: self.sha.clone(),
            credentials_id: self.credentials_id.clone(),
            git_api_url: self.git_api_url.clone(),
            target_url: self.target_url.clone(),
        }
    }
}

impl EndpointArgs {
    fn api_url<'a>(&'a self, config: &'a Config) -> Option<&'a str> {
        self.git_api_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .or(config.github.api_url.as_deref())
    }
}

impl Cli {
    /// Source context from `--source-context` (or the config's `[job]`),
    /// with job name and build URL taken from flags or the CI environment.
    fn source_context(&self, config: &Config) -> Result<SourceContext> {
        let mut context = match &self.source_context {
            Some(path) => load_document(path, "source context")?,
            None => config.job.clone(),
        };

        if let Some(job) = fix_empty(self.job.clone()) {
            context.job = Some(job);
        }
        if let Some(build_url) = fix_empty(self.build_url.clone()) {
            context.build_url = Some(build_url);
        }

        Ok(context)
    }

    async fn execute_notify(
        &self,
        args: &NotifyArgs,
        config: &Config,
        context: &SourceContext,
        provider: &GitHubProvider<'_>,
    ) -> Result<()> {
        let request = ParameterResolver::new(context)
            .with_defaults(config.github.api_url.as_deref(), &config.github.context)
            .resolve(args.to_parameters())?;

        info!(
            "Resolved notification for {} at {} using credentials {}",
            request.full_name(),
            request.commit_sha,
            request.credentials_id
        );

        let status = provider.notify(&request).await?;

        print_success(&format!(
            "{} status sent to {}@{}",
            status.state,
            request.full_name(),
            request.commit_sha
        ));

        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;
        let context = self.source_context(&config)?;
        let credentials = config.credential_lookup(context.job.as_deref());
        let provider = GitHubProvider::new(&credentials, config.proxy.as_ref());

        match &self.command {
            Commands::Notify(args) => {
                self.execute_notify(args, &config, &context, &provider)
                    .await
            }
            Commands::TestConnection { endpoint } => {
                provider
                    .connect(endpoint.credentials_id.as_deref(), endpoint.api_url(&config))
                    .await?;
                print_success("Success");
                Ok(())
            }
            Commands::CheckRepo {
                endpoint,
                account,
                repo,
            } => {
                let client = provider
                    .connect(endpoint.credentials_id.as_deref(), endpoint.api_url(&config))
                    .await?;
                provider.repository(&client, account, repo).await?;
                print_success("Success");
                Ok(())
            }
            Commands::CheckSha {
                endpoint,
                account,
                repo,
                sha,
            } => {
                let client = provider
                    .connect(endpoint.credentials_id.as_deref(), endpoint.api_url(&config))
                    .await?;
                let repository = provider.repository(&client, account, repo).await?;
                provider.commit(&client, &repository, sha).await?;
                print_success("Commit seems valid");
                Ok(())
            }
            Commands::Credentials => {
                println!("{}", render_credentials(credentials.username_passwords()));
                Ok(())
            }
            Commands::States => {
                println!("{}", render_states());
                Ok(())
            }
        }
    }
}
