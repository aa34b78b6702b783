//! Request command implementation.

use anyhow::{Context, Result};
use clap::Args;

use aether_core::ScopeId;
use aether_http::{ApiClient, Method, RequestDescriptor};

use crate::output;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE)
    pub method: String,

    /// Endpoint path relative to the API base URL, e.g. /transactions
    pub path: String,

    /// JSON request body
    #[arg(long)]
    pub data: Option<String>,

    /// Query parameter as key=value (repeatable)
    #[arg(long = "query", short = 'q', value_parser = parse_key_value)]
    pub query: Vec<(String, String)>,

    /// Send for this company instead of the active one
    #[arg(long)]
    pub company: Option<String>,
}

pub async fn run(client: &ApiClient, args: RequestArgs) -> Result<()> {
    let method: Method = args
        .method
        .to_ascii_uppercase()
        .parse()
        .with_context(|| format!("Invalid HTTP method: {}", args.method))?;

    let mut descriptor = RequestDescriptor::new(method, args.path);
    for (key, value) in args.query {
        descriptor = descriptor.query(key, value);
    }
    if let Some(data) = args.data.as_deref() {
        let body: serde_json::Value = serde_json::from_str(data).context("Invalid JSON body")?;
        descriptor = descriptor.json(&body)?;
    }
    if let Some(company) = args.company.as_deref() {
        descriptor = descriptor.scope(ScopeId::new(company).context("Invalid company id")?);
    }

    let response = client.dispatch(descriptor).await.context("Request failed")?;

    if response.body().is_empty() {
        output::success(&format!("HTTP {}", response.status()));
        return Ok(());
    }

    match response.json::<serde_json::Value>() {
        Ok(value) => output::json_pretty(&value)?,
        Err(_) => println!("{}", String::from_utf8_lossy(response.body())),
    }

    Ok(())
}

fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{s}`"))?;
    Ok((key.to_string(), value.to_string()))
}
