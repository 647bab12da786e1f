mod client;
mod provider;
mod types;

#[cfg(test)]
mod tests;

pub use client::{GitHubClient, DEFAULT_API_URL};
pub use provider::GitHubProvider;
pub use types::CommitState;
