mod auth;
mod cli;
mod config;
mod error;
mod notification;
mod output;
mod providers;
mod resolver;
mod source;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting githubnotify - GitHub commit status notifier");
    cli.execute().await?;

    Ok(())
}
