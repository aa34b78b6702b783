//! Logout command implementation.

use anyhow::Result;
use clap::Args;

use aether_http::ApiClient;

use crate::output;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(client: &ApiClient, _args: LogoutArgs) -> Result<()> {
    if client.credential().is_none() {
        output::success("No active session");
        return Ok(());
    }

    client.logout().await;
    output::success("Logged out");

    Ok(())
}
