//! Smoke tests for the navegador CLI
//!
//! These tests exercise argument parsing and pre-launch validation.
//! Every failure here must exit 1 with the error on stderr, before any
//! browser is launched.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the navegador binary
fn navegador() -> Command {
    Command::cargo_bin("navegador").expect("navegador binary should exist")
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    navegador()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.4.1"));
}

#[test]
fn test_help_flag() {
    navegador()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("browser"))
        .stdout(predicate::str::contains("navigate"))
        .stdout(predicate::str::contains("screenshot"));
}

#[test]
fn test_no_args_is_an_error() {
    navegador().assert().failure().code(1);
}

#[test]
fn test_unknown_subcommand_is_an_error() {
    navegador().arg("teleport").assert().failure().code(1);
}

// ============================================================================
// Subcommand Help Tests
// ============================================================================

#[test]
fn test_navigate_subcommand_help() {
    navegador()
        .args(["navigate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Navigate to a URL"));
}

#[test]
fn test_click_subcommand_help() {
    navegador()
        .args(["click", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("click"))
        .stdout(predicate::str::contains("selector"));
}

#[test]
fn test_fill_form_subcommand_help() {
    navegador()
        .args(["fill-form", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("JSON object"));
}

#[test]
fn test_screenshot_subcommand_help() {
    navegador()
        .args(["screenshot", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("screenshot"))
        .stdout(predicate::str::contains("./tmp/navegar/screenshot.png"));
}

#[test]
fn test_pdf_subcommand_help() {
    navegador()
        .args(["pdf", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("./tmp/navegar/page.pdf"));
}

#[test]
fn test_handle_dialog_subcommand_help() {
    navegador()
        .args(["handle-dialog", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("accept"))
        .stdout(predicate::str::contains("dismiss"));
}

// ============================================================================
// Usage Error Tests (exit 1, stderr, no browser launch)
// ============================================================================

#[test]
fn test_navigate_without_url_exits_one() {
    navegador()
        .arg("navigate")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("URL").or(predicate::str::contains("url")));
}

#[test]
fn test_click_without_selector_exits_one() {
    navegador()
        .args(["click", "https://example.com"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_fill_form_with_invalid_json() {
    navegador()
        .args(["fill-form", "https://example.com", "{not json"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: Invalid JSON data"));
}

#[test]
fn test_fill_form_with_non_object_json() {
    navegador()
        .args(["fill-form", "https://example.com", "[1,2,3]"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: Invalid JSON data"));
}

#[test]
fn test_handle_dialog_with_unknown_action() {
    navegador()
        .args(["handle-dialog", "https://example.com", "maybe"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "Error: Action must be \"accept\" or \"dismiss\"",
        ));
}

#[test]
fn test_file_upload_with_missing_file() {
    navegador()
        .args([
            "file-upload",
            "https://example.com",
            "input[type=file]",
            "/nonexistent/upload.pdf",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "Error: File not found: /nonexistent/upload.pdf",
        ));
}

#[test]
fn test_file_upload_validation_sees_real_files() {
    // An existing file passes validation; the command then fails later
    // (no browser in the test environment) but never with the
    // file-not-found message.
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("upload.txt");
    fs::write(&path, "payload").expect("write upload file");

    navegador()
        .args([
            "file-upload",
            "https://example.com",
            "input[type=file]",
            path.to_str().expect("utf-8 path"),
        ])
        .env("NAVEGADOR_BROWSER_PATH", "/nonexistent/chromium")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("File not found").not());
}

#[test]
fn test_press_key_with_unknown_key() {
    navegador()
        .args(["press-key", "https://example.com", "SuperJump"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unknown key"));
}

#[test]
fn test_resize_with_zero_width_exits_one() {
    navegador()
        .args(["resize", "https://example.com", "0", "600"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_resize_with_non_numeric_width_exits_one() {
    navegador()
        .args(["resize", "https://example.com", "wide", "600"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_headless_conflicts_with_headed() {
    navegador()
        .args(["--headless", "--headed", "navigate", "https://example.com"])
        .assert()
        .failure()
        .code(1);
}
