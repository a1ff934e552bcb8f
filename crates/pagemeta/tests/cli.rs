// ABOUTME: Integration tests for the pagemeta CLI binary.
// ABOUTME: Tests HTML file extraction, URL fetching, output options, and argument validation.

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo::CommandCargoExt;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
<title>Test Page</title>
<meta name="description" content="Described">
</head>
<body>
<h1>Hello there</h1>
<a href="/about">About</a>
</body>
</html>"#;

fn pagemeta_cmd() -> Command {
    let mut cmd = Command::cargo_bin("pagemeta").unwrap();
    cmd.env_remove("PAGEMETA_TIMEOUT_SECS")
        .env_remove("PAGEMETA_USER_AGENT")
        .env_remove("RUST_LOG");
    cmd
}

fn write_page(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("page.html");
    fs::write(&path, PAGE).unwrap();
    path
}

#[test]
fn extract_html_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = write_page(&temp_dir);

    let output = pagemeta_cmd()
        .arg("--html")
        .arg(&html_path)
        .arg("--url")
        .arg("https://example.com/docs/")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["title"], "Test Page");
    assert_eq!(json["headings"][0], "Hello there");
    assert_eq!(json["links"][0], "https://example.com/about");
    assert_eq!(json["meta"]["description"], "Described");
    assert_eq!(json["meta"]["keywords"], "Not found");
}

#[test]
fn minimal_preset_omits_extended_meta() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = write_page(&temp_dir);

    let output = pagemeta_cmd()
        .args(["--preset", "minimal", "--compact", "--url", "https://example.com/"])
        .arg("--html")
        .arg(&html_path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8(output).unwrap();
    assert_eq!(stdout.trim().lines().count(), 1);
    assert!(!stdout.contains("keywords"));
}

#[test]
fn rules_file_overrides_preset() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = write_page(&temp_dir);
    let rules_path = temp_dir.path().join("rules.json");
    fs::write(
        &rules_path,
        r#"{"title": {"selectors": ["h1"], "fallback": "none"}}"#,
    )
    .unwrap();

    pagemeta_cmd()
        .arg("--rules")
        .arg(&rules_path)
        .arg("--html")
        .arg(&html_path)
        .arg("--url")
        .arg("https://example.com/")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"title\": \"Hello there\""));
}

#[test]
fn markdown_format() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = write_page(&temp_dir);

    pagemeta_cmd()
        .arg("--html")
        .arg(&html_path)
        .arg("--url")
        .arg("https://example.com/")
        .arg("-f")
        .arg("md")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Test Page"))
        .stdout(predicate::str::contains("- <https://example.com/about>"));
}

#[test]
fn multiple_urls_output_json_array() {
    let server = MockServer::start();

    let mock1 = server.mock(|when, then| {
        when.method(GET).path("/page1");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body("<html><head><title>Page One</title></head><body></body></html>");
    });

    let mock2 = server.mock(|when, then| {
        when.method(GET).path("/page2");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body("<html><head><title>Page Two</title></head><body></body></html>");
    });

    let output = pagemeta_cmd()
        .arg(server.url("/page1"))
        .arg(server.url("/page2"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    mock1.assert();
    mock2.assert();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let items = json.as_array().expect("array for multiple URLs");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["title"], "Page One");
    assert_eq!(items[1]["title"], "Page Two");
}

#[test]
fn multiple_urls_stay_an_array_when_some_fail() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/ok");
        then.status(200)
            .header("content-type", "text/html")
            .body("<html><head><title>Survivor</title></head><body></body></html>");
    });
    server.mock(|when, then| {
        when.method(GET).path("/gone");
        then.status(404);
    });

    let output = pagemeta_cmd()
        .arg(server.url("/ok"))
        .arg(server.url("/gone"))
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let items = json.as_array().expect("array for multiple URLs");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Survivor");
}

#[test]
fn failed_fetch_exits_nonzero() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/missing");
        then.status(404);
    });

    pagemeta_cmd()
        .arg(server.url("/missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("fetch failed"))
        .stderr(predicate::str::contains("HTTP status 404"));
}

#[test]
fn invalid_url_exits_nonzero() {
    pagemeta_cmd()
        .arg("not-a-url")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid request"));
}

#[test]
fn timing_flag_prints_elapsed() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = write_page(&temp_dir);

    pagemeta_cmd()
        .arg("--html")
        .arg(&html_path)
        .arg("--url")
        .arg("https://example.com")
        .arg("--timing")
        .assert()
        .success()
        .stderr(predicate::str::contains("elapsed:"))
        .stderr(predicate::str::contains("ms"));
}

#[test]
fn output_to_file() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = write_page(&temp_dir);
    let output_path = temp_dir.path().join("output.json");

    pagemeta_cmd()
        .arg("--html")
        .arg(&html_path)
        .arg("--url")
        .arg("https://example.com")
        .arg("-o")
        .arg(&output_path)
        .assert()
        .success();

    let output_content = fs::read_to_string(&output_path).unwrap();
    assert!(
        output_content.contains("\"links\":"),
        "output file should contain JSON with links field"
    );
}

#[test]
fn missing_url_with_html_fails() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = write_page(&temp_dir);

    pagemeta_cmd()
        .arg("--html")
        .arg(&html_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--url is required"));
}

#[test]
fn unknown_preset_fails() {
    pagemeta_cmd()
        .args(["--preset", "huge", "https://example.com/"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown preset"));
}

#[test]
fn no_args_fails() {
    pagemeta_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one URL is required"));
}
