//! Smoke tests for CLI help output.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_lists_subcommands() {
    cargo_bin_cmd!("pomi")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("register"))
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("logout"))
        .stdout(predicate::str::contains("whoami"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_login_help_shows_flags() {
    cargo_bin_cmd!("pomi")
        .args(["login", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--email"))
        .stdout(predicate::str::contains("--password"));
}

#[test]
fn test_login_requires_email() {
    cargo_bin_cmd!("pomi")
        .args(["login", "--password", "secret"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--email"));
}
