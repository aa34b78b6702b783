//! CLI tests against a mock API server.
//!
//! Each test runs the built `aether` binary with its own session file, so
//! tests never touch the user's real session.

mod common;

use std::path::PathBuf;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{
    read_session, run_cli_with_env, run_cli_with_env_failure, run_cli_with_env_success,
    write_session,
};

fn api_url(server: &MockServer) -> String {
    format!("http://127.0.0.1:{}/api/v1", server.address().port())
}

fn session_file(dir: &TempDir) -> PathBuf {
    dir.path().join("session.json")
}

/// Run a blocking CLI invocation without stalling the mock server.
async fn cli<F, T>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_then_whoami() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(body_json(json!({
            "email": "ada@example.com",
            "password": "secret123"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "A1",
            "refresh_token": "R1",
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = session_file(&dir);
    let url = api_url(&server);

    let (f, u) = (file.clone(), url.clone());
    let stdout = cli(move || {
        run_cli_with_env_success(
            &[
                "login",
                "--email",
                "ada@example.com",
                "--password",
                "secret123",
                "--company",
                "42",
            ],
            &f,
            &u,
        )
    })
    .await;
    assert!(stdout.contains("Logged in successfully"));

    let saved = read_session(&file);
    assert_eq!(saved["access_token"], "A1");
    assert_eq!(saved["refresh_token"], "R1");
    assert_eq!(saved["current_company_id"], "42");

    let (f, u) = (file.clone(), url.clone());
    let stdout = cli(move || run_cli_with_env_success(&["whoami"], &f, &u)).await;
    assert!(stdout.contains("42"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_request_renews_expired_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/transactions"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "detail": "Token has expired" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/transactions"))
        .and(header("authorization", "Bearer A2"))
        .and(header("x-company-id", "42"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "description": "coffee" }
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .and(body_json(json!({ "refresh_token": "R1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "A2",
            "refresh_token": "R2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = session_file(&dir);
    write_session(
        &file,
        json!({
            "access_token": "A1",
            "refresh_token": "R1",
            "current_company_id": "42"
        }),
    );

    let (f, u) = (file.clone(), api_url(&server));
    let stdout = cli(move || {
        run_cli_with_env_success(&["request", "get", "/transactions", "-q", "limit=5"], &f, &u)
    })
    .await;
    assert!(stdout.contains("coffee"));

    let saved = read_session(&file);
    assert_eq!(saved["access_token"], "A2");
    assert_eq!(saved["refresh_token"], "R2");
    assert_eq!(saved["current_company_id"], "42");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_renewal_clears_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/accounts"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "detail": "Invalid refresh token" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = session_file(&dir);
    write_session(&file, json!({ "access_token": "A1", "refresh_token": "R1" }));

    let (f, u) = (file.clone(), api_url(&server));
    let stderr = cli(move || run_cli_with_env_failure(&["request", "GET", "/accounts"], &f, &u)).await;

    assert!(stderr.contains("session"));
    assert!(!file.exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_validation_errors_are_shown() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/transactions"))
        .and(body_json(json!({ "description": "coffee" })))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [
                { "loc": ["body", "amount"], "msg": "field required", "type": "missing" }
            ]
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = session_file(&dir);
    write_session(&file, json!({ "access_token": "A1", "refresh_token": "R1" }));

    let (f, u) = (file.clone(), api_url(&server));
    let stderr = cli(move || {
        run_cli_with_env_failure(
            &["request", "POST", "/transactions", "--data", r#"{"description":"coffee"}"#],
            &f,
            &u,
        )
    })
    .await;

    assert!(stderr.contains("amount: field required"));
    // A failed request leaves the session alone.
    assert_eq!(read_session(&file)["access_token"], "A1");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_switch_company_and_logout() {
    let server = MockServer::start().await;

    let dir = TempDir::new().unwrap();
    let file = session_file(&dir);
    write_session(
        &file,
        json!({ "access_token": "A1", "refresh_token": "R1", "current_company_id": "42" }),
    );
    let url = api_url(&server);

    let (f, u) = (file.clone(), url.clone());
    cli(move || run_cli_with_env_success(&["switch-company", "7"], &f, &u)).await;
    assert_eq!(read_session(&file)["current_company_id"], "7");

    let (f, u) = (file.clone(), url.clone());
    cli(move || run_cli_with_env_success(&["switch-company", "--clear"], &f, &u)).await;
    assert!(read_session(&file).get("current_company_id").is_none());

    let (f, u) = (file.clone(), url.clone());
    cli(move || run_cli_with_env_success(&["logout"], &f, &u)).await;
    assert!(!file.exists());

    let (f, u) = (file.clone(), url.clone());
    let stderr = cli(move || run_cli_with_env_failure(&["whoami"], &f, &u)).await;
    assert!(stderr.contains("aether login"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_api_url_is_rejected() {
    let dir = TempDir::new().unwrap();
    let file = session_file(&dir);

    let output = cli(move || run_cli_with_env(&["whoami"], &file, "ftp://example.com")).await;

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid API URL"));
}
