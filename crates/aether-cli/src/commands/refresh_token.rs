//! Refresh token command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use aether_http::ApiClient;

use super::NO_SESSION;
use crate::output;

#[derive(Args, Debug)]
pub struct RefreshTokenArgs {}

pub async fn run(client: &ApiClient, _args: RefreshTokenArgs) -> Result<()> {
    client.credential().context(NO_SESSION)?;

    eprintln!("{}", "Refreshing session...".dimmed());

    client
        .refresh()
        .await
        .context("Failed to refresh session")?;

    output::success("Session refreshed successfully");

    Ok(())
}
