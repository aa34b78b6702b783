//! Switch company command implementation.

use anyhow::{Context, Result};
use clap::Args;

use aether_core::ScopeId;
use aether_http::ApiClient;

use super::NO_SESSION;
use crate::output;

#[derive(Args, Debug)]
pub struct SwitchCompanyArgs {
    /// Company id to make active
    #[arg(required_unless_present = "clear")]
    pub company: Option<String>,

    /// Clear the active company instead
    #[arg(long, conflicts_with = "company")]
    pub clear: bool,
}

pub async fn run(client: &ApiClient, args: SwitchCompanyArgs) -> Result<()> {
    client.credential().context(NO_SESSION)?;

    let scope = match args.company.as_deref() {
        Some(company) => Some(ScopeId::new(company).context("Invalid company id")?),
        None => None,
    };

    client
        .switch_scope(scope.clone())
        .await
        .context("Failed to switch company")?;

    match scope {
        Some(scope) => output::success(&format!("Active company is now {scope}")),
        None => output::success("Active company cleared"),
    }

    Ok(())
}
