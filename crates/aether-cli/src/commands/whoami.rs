//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;

use aether_http::ApiClient;

use super::NO_SESSION;
use crate::output;

#[derive(Args, Debug)]
pub struct WhoamiArgs {}

pub async fn run(client: &ApiClient, _args: WhoamiArgs) -> Result<()> {
    let credential = client.credential().context(NO_SESSION)?;

    output::field("API", client.config().base_url().as_str());
    output::field(
        "Company",
        credential.scope().map(|s| s.as_str()).unwrap_or("(none)"),
    );
    output::field("Session", &format!("{:?}", client.session_phase()));

    Ok(())
}
