use std::path::Path;
use std::process::{Command, Output};

/// Run the CLI against `api_url` with an isolated session file.
pub fn run_cli_with_env(args: &[&str], session_file: &Path, api_url: &str) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_aether"));
    cmd.args(args);
    cmd.env("AETHER_API_URL", api_url);
    cmd.env("AETHER_SESSION_FILE", session_file);
    cmd.env_remove("AETHER_PASSWORD");
    cmd.env_remove("RUST_LOG");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI with an isolated session file and expect success.
pub fn run_cli_with_env_success(args: &[&str], session_file: &Path, api_url: &str) -> String {
    let output = run_cli_with_env(args, session_file, api_url);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI with an isolated session file and expect failure.
pub fn run_cli_with_env_failure(args: &[&str], session_file: &Path, api_url: &str) -> String {
    let output = run_cli_with_env(args, session_file, api_url);
    if output.status.success() {
        panic!("CLI command should have failed: {:?}", args);
    }
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Read the session file as JSON.
pub fn read_session(session_file: &Path) -> serde_json::Value {
    let json = std::fs::read_to_string(session_file).expect("session file should exist");
    serde_json::from_str(&json).expect("session file should be JSON")
}

/// Write a session file directly.
pub fn write_session(session_file: &Path, session: serde_json::Value) {
    std::fs::write(session_file, session.to_string()).expect("failed to write session file");
}
