//! Subcommand implementations.

pub mod login;
pub mod logout;
pub mod refresh_token;
pub mod request;
pub mod switch_company;
pub mod whoami;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use aether_core::ApiUrl;
use aether_http::{ApiClient, ClientConfig};

use crate::cli::{Cli, Commands};
use crate::output::ConsoleSink;
use crate::session::FileSessionStorage;

pub async fn handle(cli: Cli) -> Result<()> {
    let client = connect(&cli.api_url, cli.session_file.as_deref()).await?;

    match cli.command {
        Commands::Login(args) => login::run(&client, args).await,
        Commands::Logout(args) => logout::run(&client, args).await,
        Commands::Whoami(args) => whoami::run(&client, args).await,
        Commands::RefreshToken(args) => refresh_token::run(&client, args).await,
        Commands::SwitchCompany(args) => switch_company::run(&client, args).await,
        Commands::Request(args) => request::run(&client, args).await,
    }
}

/// Build a client backed by the session file.
async fn connect(api_url: &str, session_file: Option<&Path>) -> Result<ApiClient> {
    let base_url = ApiUrl::new(api_url).context("Invalid API URL")?;
    let storage = match session_file {
        Some(path) => FileSessionStorage::new(path),
        None => FileSessionStorage::default_location()?,
    };
    tracing::debug!(path = %storage.path().display(), "Using session file");

    let config = ClientConfig::new(base_url)
        .user_agent(format!("aether-cli/{}", env!("AETHER_VERSION")));

    ApiClient::builder(config)
        .storage(Arc::new(storage))
        .notifier(Arc::new(ConsoleSink))
        .build()
        .await
        .context("Failed to restore session")
}

/// Error context for commands that need a stored session.
pub(crate) const NO_SESSION: &str = "No active session. Run 'aether login' first.";
