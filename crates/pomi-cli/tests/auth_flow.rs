//! End-to-end CLI auth flow against a mock Pomi API.
//!
//! Runs the `pomi` binary with POMI_HOME pointed at a temp directory and
//! POMI_BASE_URL pointed at a wiremock server.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a temp POMI_HOME directory for test isolation.
fn temp_pomi_home() -> TempDir {
    TempDir::new().expect("create temp pomi home")
}

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

fn auth_response_json() -> serde_json::Value {
    json!({
        "message": "ok",
        "user": { "id": "1", "email": "a@b.com", "username": "ab" },
        "tokens": { "accessToken": "AT1", "refreshToken": "RT1" }
    })
}

#[tokio::test]
async fn test_login_whoami_logout_roundtrip() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let pomi_home = temp_pomi_home();
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_response_json()))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", "Bearer AT1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "1", "email": "a@b.com", "username": "ab"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("pomi")
        .env("POMI_HOME", pomi_home.path())
        .env("POMI_BASE_URL", mock_server.uri())
        .args(["login", "--email", "a@b.com", "--password", "secret"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as ab"));

    assert!(pomi_home.path().join("tokens.json").exists());

    cargo_bin_cmd!("pomi")
        .env("POMI_HOME", pomi_home.path())
        .env("POMI_BASE_URL", mock_server.uri())
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("a@b.com"));

    cargo_bin_cmd!("pomi")
        .env("POMI_HOME", pomi_home.path())
        .env("POMI_BASE_URL", mock_server.uri())
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed out."));

    assert!(!pomi_home.path().join("tokens.json").exists());
}

#[tokio::test]
async fn test_login_failure_reports_server_message() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let pomi_home = temp_pomi_home();
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("pomi")
        .env("POMI_HOME", pomi_home.path())
        .env("POMI_BASE_URL", mock_server.uri())
        .args(["login", "--email", "a@b.com", "--password", "wrong"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid credentials"));

    assert!(!pomi_home.path().join("tokens.json").exists());
}

#[test]
fn test_whoami_without_session() {
    let pomi_home = temp_pomi_home();

    cargo_bin_cmd!("pomi")
        .env("POMI_HOME", pomi_home.path())
        .arg("whoami")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not signed in"));
}
