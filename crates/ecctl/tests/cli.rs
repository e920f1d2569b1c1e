//! Binary-level tests: argument errors, configuration errors, and one full
//! round trip against the mock API.

use assert_cmd::Command;
use ece_client::testing::{MockApi, MockResponse};
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::json;
use tempfile::TempDir;

const EC_VARS: [&str; 9] = [
    "EC_CONFIG",
    "EC_HOST",
    "EC_API_KEY",
    "EC_USER",
    "EC_PASS",
    "EC_REGION",
    "EC_OUTPUT",
    "EC_INSECURE",
    "EC_TIMEOUT",
];

/// `ecctl` with no `EC_*` environment and `HOME` in `dir`.
fn bare(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ecctl").expect("ecctl binary");
    for var in EC_VARS {
        cmd.env_remove(var);
    }
    cmd.env("HOME", dir.path());
    cmd
}

/// [`bare`] with an empty config file.
fn cmd(dir: &TempDir) -> Command {
    let config = dir.path().join("config.json");
    std::fs::write(&config, "{}").expect("write config");
    let mut cmd = bare(dir);
    cmd.arg("--config").arg(config);
    cmd
}

#[test]
fn help_lists_command_groups() {
    let dir = TempDir::new().expect("temp dir");
    cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("comment").and(contains("deployment")).and(contains("platform")));
}

#[test]
fn missing_required_flag_fails_before_any_request() {
    let dir = TempDir::new().expect("temp dir");
    cmd(&dir)
        .args(["comment", "list", "--resource-type", "allocator"])
        .assert()
        .failure()
        .stderr(contains("--resource-id"));
}

#[test]
fn conflicting_flags_are_rejected() {
    let dir = TempDir::new().expect("temp dir");
    cmd(&dir)
        .args([
            "deployment",
            "elasticsearch",
            "keystore",
            "set",
            "d1",
            "setting",
            "--value",
            "v",
            "--file",
            "f",
        ])
        .assert()
        .failure()
        .stderr(contains("cannot be used with"));
}

#[test]
fn api_command_without_host_fails() {
    let dir = TempDir::new().expect("temp dir");
    cmd(&dir)
        .args(["deployment", "extension", "list"])
        .assert()
        .failure()
        .stderr(contains("Error: configuration error: no API host configured"));
}

#[test]
fn config_show_masks_credentials() {
    let dir = TempDir::new().expect("temp dir");
    cmd(&dir)
        .args(["--host", "https://ece:12443", "--api-key", "topsecret", "config", "show"])
        .assert()
        .success()
        .stdout(contains("Host:        https://ece:12443").and(contains("topsecret").not()));
}

#[test]
fn config_show_reads_toml_file() {
    let dir = TempDir::new().expect("temp dir");
    let config = dir.path().join("ecctl.toml");
    std::fs::write(&config, "host = \"https://from-toml:12443\"\nregion = \"ece-region\"\n").expect("write config");

    bare(&dir)
        .args(["--config", config.to_str().expect("utf8 path"), "-o", "json", "config", "show"])
        .assert()
        .success()
        .stdout(contains("https://from-toml:12443").and(contains("ece-region")));
}

#[tokio::test(flavor = "multi_thread")]
async fn api_errors_are_printed_verbatim() {
    let mock = MockApi::start([MockResponse::error(
        404,
        "deployments.extension_not_found",
        "Extension not found",
    )])
    .await
    .expect("mock");
    let host = mock.url();

    let assert = tokio::task::spawn_blocking(move || {
        let dir = TempDir::new().expect("temp dir");
        cmd(&dir)
            .args(["--host", host.as_str(), "deployment", "extension", "show", "missing"])
            .assert()
    })
    .await
    .expect("join");

    assert.failure().stderr(contains(
        "Error: api error (HTTP 404): deployments.extension_not_found: Extension not found",
    ));
    assert_eq!(mock.single_request().path, "/api/v1/deployments/extensions/missing");
}

#[tokio::test(flavor = "multi_thread")]
async fn comment_create_round_trip() {
    let mock = MockApi::start([MockResponse::json(
        201,
        json!({"id": "c1", "message": "disk replaced", "user_id": "admin"}),
    )])
    .await
    .expect("mock");
    let host = mock.url();

    let assert = tokio::task::spawn_blocking(move || {
        let dir = TempDir::new().expect("temp dir");
        cmd(&dir)
            .args([
                "--host",
                host.as_str(),
                "--api-key",
                "k",
                "--output",
                "json",
                "comment",
                "create",
                "disk replaced",
                "--resource-type",
                "allocator",
                "--resource-id",
                "a1",
            ])
            .assert()
    })
    .await
    .expect("join");

    assert.success().stdout(contains(r#""id": "c1""#));
    let request = mock.single_request();
    assert_eq!(request.path, "/api/v1/comments/allocator/a1");
    assert_eq!(request.header("authorization").as_deref(), Some("ApiKey k"));
}
