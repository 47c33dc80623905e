//! Integration tests for the `ruledns` CLI binary.
//!
//! Argument parsing, help output, offline conversion, and error handling
//! run without any network; the `dns` tests drive the binary against a
//! wiremock Cloudflare API.
#![allow(clippy::unwrap_used)]

use std::io::Write;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `ruledns` binary with env isolation.
///
/// Clears all `RULEDNS_*` env vars and points config and cache
/// directories into `home` so tests never touch the user's real files.
fn ruledns_cmd(home: &std::path::Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("ruledns");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_CACHE_HOME", home.join("cache"))
        .env("NO_COLOR", "1")
        .env_remove("RULEDNS_PROFILE")
        .env_remove("RULEDNS_API_URL")
        .env_remove("RULEDNS_API_TOKEN")
        .env_remove("RULEDNS_OUTPUT")
        .env_remove("RULEDNS_TIMEOUT");
    cmd
}

fn isolated() -> (tempfile::TempDir, assert_cmd::Command) {
    let home = tempfile::tempdir().unwrap();
    let cmd = ruledns_cmd(home.path());
    (home, cmd)
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn description_file(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let (_home, mut cmd) = isolated();
    let output = cmd.output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let (_home, mut cmd) = isolated();
    cmd.arg("--help").assert().success().stdout(
        predicate::str::contains("Page Rules")
            .and(predicate::str::contains("rules"))
            .and(predicate::str::contains("redirects"))
            .and(predicate::str::contains("dns")),
    );
}

#[test]
fn test_version_flag() {
    let (_home, mut cmd) = isolated();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ruledns"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    let (_home, mut cmd) = isolated();
    cmd.args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    let (_home, mut cmd) = isolated();
    cmd.args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Man pages ───────────────────────────────────────────────────────

#[test]
fn test_man_to_stdout() {
    let (_home, mut cmd) = isolated();
    cmd.arg("man")
        .assert()
        .success()
        .stdout(predicate::str::contains(".TH ruledns 1"))
        .stdout(predicate::str::contains("dns"));
}

#[test]
fn test_man_dir_writes_subcommand_pages() {
    let (home, mut cmd) = isolated();
    let out = home.path().join("man");

    cmd.args(["man", "--dir"]).arg(&out).assert().success();

    assert!(out.join("ruledns.1").is_file());
    assert!(out.join("ruledns-dns.1").is_file());
    assert!(out.join("ruledns-dns-fix.1").is_file());
    let page = std::fs::read_to_string(out.join("ruledns-dns-fix.1")).unwrap();
    assert!(page.contains(".TH ruledns-dns-fix 1"));
}

// ── Subcommand help discovery ───────────────────────────────────────

#[test]
fn test_dns_subcommands_exist() {
    let (_home, mut cmd) = isolated();
    cmd.args(["dns", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("check").and(predicate::str::contains("fix")));
}

#[test]
fn test_fix_lists_strategies() {
    let (_home, mut cmd) = isolated();
    cmd.args(["dns", "fix", "--help"]).assert().success().stdout(
        predicate::str::contains("required-only")
            .and(predicate::str::contains("replace-all"))
            .and(predicate::str::contains("skip")),
    );
}

// ── Offline conversion ──────────────────────────────────────────────

#[test]
fn test_convert_json_description() {
    let file = description_file(
        ".json",
        r#"{
            "domain": "example.com",
            "redirects": [
                { "from": "/old", "to": "https://example.com/new", "type": "forwarding" },
                { "from": "blog.example.com/*", "to": "https://example.org/$1" }
            ]
        }"#,
    );
    let (_home, mut cmd) = isolated();
    cmd.args(["-o", "plain", "redirects", "convert", "-f"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("example.com/old")
                .and(predicate::str::contains("blog.example.com/*")),
        );
}

#[test]
fn test_convert_yaml_description() {
    let file = description_file(
        ".yaml",
        "domain: example.com\nredirects:\n  - from: /docs\n    to: https://docs.example.net/\n    type: rewrite\n",
    );
    let (_home, mut cmd) = isolated();
    cmd.args(["-o", "json", "redirects", "convert", "-f"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("example.com/docs").and(predicate::str::contains("302")));
}

#[test]
fn test_convert_rejects_foreign_host() {
    let file = description_file(
        ".json",
        r#"{ "domain": "example.com", "redirects": [ { "from": "other.org/x", "to": "https://example.com/" } ] }"#,
    );
    let (_home, mut cmd) = isolated();
    let output = cmd
        .args(["redirects", "convert", "-f"])
        .arg(file.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("other.org"));
}

#[test]
fn test_convert_missing_file() {
    let (home, mut cmd) = isolated();
    cmd.args(["redirects", "convert", "-f"])
        .arg(home.path().join("absent.json"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Could not read"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let (_home, mut cmd) = isolated();
    let output = cmd.arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_invalid_output_format() {
    let (_home, mut cmd) = isolated();
    let output = cmd
        .args(["--output", "invalid", "dns", "check"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_dns_check_without_token() {
    let (_home, mut cmd) = isolated();
    cmd.args(["dns", "check", "--zone", "example.com"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("API token"));
}

#[test]
fn test_unknown_profile() {
    let (_home, mut cmd) = isolated();
    cmd.args(["--profile", "nope", "dns", "check", "--zone", "example.com"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("nope"));
}

#[test]
fn test_config_show_no_config() {
    // `config show` falls back to the default config when no file exists.
    let (_home, mut cmd) = isolated();
    cmd.args(["config", "show"]).assert().success();
}

// ── Against a mock Cloudflare API ───────────────────────────────────

fn ok(result: serde_json::Value) -> serde_json::Value {
    json!({ "success": true, "errors": [], "messages": [], "result": result })
}

async fn mock_zone(server: &MockServer, rules: serde_json::Value, records: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/zones"))
        .and(query_param("name", "example.com"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(ok(json!([{ "id": "zone-1", "name": "example.com" }]))),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/zones/zone-1/pagerules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(rules)))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/zones/zone-1/dns_records"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "errors": [],
            "result": records,
            "result_info": { "page": 1, "per_page": 100, "count": 1, "total_count": 1, "total_pages": 1 }
        })))
        .mount(server)
        .await;
}

fn www_forwarding_rule() -> serde_json::Value {
    json!([{
        "id": "rule-1",
        "targets": [{ "target": "url", "constraint": { "operator": "matches", "value": "www.example.com/*" } }],
        "actions": [{ "id": "forwarding_url", "value": { "url": "https://example.com/$1", "status_code": 301 } }],
        "priority": 1,
        "status": "active"
    }])
}

async fn run(server: &MockServer, args: &'static [&'static str]) -> std::process::Output {
    let uri = server.uri();
    tokio::task::spawn_blocking(move || {
        let home = tempfile::tempdir().unwrap();
        ruledns_cmd(home.path())
            .args(["--api-url", &uri, "--api-token", "test-token"])
            .args(args)
            .output()
            .unwrap()
    })
    .await
    .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dns_check_met() {
    let server = MockServer::start().await;
    mock_zone(
        &server,
        www_forwarding_rule(),
        json!([{ "id": "rec-1", "type": "CNAME", "name": "www.example.com", "content": "example.com", "ttl": 1, "proxied": true }]),
    )
    .await;

    let output = run(&server, &["-o", "plain", "dns", "check", "--zone", "example.com"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("satisfying\tCNAME\twww.example.com"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dns_check_unmet_exit_code() {
    let server = MockServer::start().await;
    mock_zone(
        &server,
        www_forwarding_rule(),
        json!([{ "id": "rec-1", "type": "CNAME", "name": "www.example.com", "content": "elsewhere.net", "ttl": 1, "proxied": false }]),
    )
    .await;

    let output = run(&server, &["-o", "plain", "dns", "check", "--zone", "example.com"]).await;
    assert_eq!(output.status.code(), Some(6), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("conflicting\tCNAME\twww.example.com"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dns_fix_dry_run_makes_no_changes() {
    let server = MockServer::start().await;
    mock_zone(&server, www_forwarding_rule(), json!([])).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let output = run(
        &server,
        &["-o", "plain", "dns", "fix", "--zone", "example.com", "--strategy", "required-only", "--dry-run"],
    )
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("create CNAME www.example.com"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dns_fix_creates_missing_record() {
    let server = MockServer::start().await;
    mock_zone(&server, www_forwarding_rule(), json!([])).await;
    Mock::given(method("POST"))
        .and(path("/zones/zone-1/dns_records"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(json!({
            "id": "rec-new", "type": "CNAME", "name": "www.example.com",
            "content": "example.com", "ttl": 1, "proxied": true
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(
        &server,
        &["--yes", "-o", "plain", "dns", "fix", "--zone", "example.com"],
    )
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("ok\tcreate CNAME www.example.com"));
}
