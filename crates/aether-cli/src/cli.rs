//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{login, logout, refresh_token, request, switch_company, whoami};

/// API base URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

/// Command-line client for the Aether accounting API.
#[derive(Parser, Debug)]
#[command(name = "aether")]
#[command(author, version = env!("AETHER_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// API base URL
    #[arg(long, env = "AETHER_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Session file (defaults to the platform data directory)
    #[arg(long, env = "AETHER_SESSION_FILE", global = true)]
    pub session_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in with email and password
    Login(login::LoginArgs),

    /// End the stored session
    Logout(logout::LogoutArgs),

    /// Display the stored session
    Whoami(whoami::WhoamiArgs),

    /// Renew the access token now
    RefreshToken(refresh_token::RefreshTokenArgs),

    /// Change the active company
    SwitchCompany(switch_company::SwitchCompanyArgs),

    /// Send an authenticated API request
    Request(request::RequestArgs),
}
