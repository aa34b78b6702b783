//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use aether_core::{Credentials, ScopeId};
use aether_http::ApiClient;

use crate::output;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long, env = "AETHER_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Company to make active after login
    #[arg(long)]
    pub company: Option<String>,
}

pub async fn run(client: &ApiClient, args: LoginArgs) -> Result<()> {
    let scope = args
        .company
        .as_deref()
        .map(ScopeId::new)
        .transpose()
        .context("Invalid company id")?;
    let credentials = Credentials::new(&args.email, &args.password);

    eprintln!("{}", "Logging in...".dimmed());

    let credential = client
        .login(&credentials, scope)
        .await
        .context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    output::field("Email", &args.email);
    output::field("API", client.config().base_url().as_str());
    if let Some(scope) = credential.scope() {
        output::field("Company", scope.as_str());
    }

    Ok(())
}
