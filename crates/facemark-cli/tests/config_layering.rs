//! Integration tests for configuration layering.
//!
//! Tests the full priority chain: hardcoded defaults < XDG config < project config < CLI args

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

mod common;

use common::Workspace;
use predicates::prelude::*;

#[test]
fn test_project_config_limits_attempts() {
    let ws = Workspace::new();
    ws.photo("face.png");
    ws.empty_models("empty");
    ws.write(
        ".facemark.toml",
        r"
[detector]
max_attempts = 1
backoff_secs = 0.0

[models]
dir = 'empty'
",
    );

    ws.facemark()
        .arg("face.png")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("rechecking").not());
}

#[test]
fn test_cli_attempts_override_project_config() {
    let ws = Workspace::new();
    ws.photo("face.png");
    ws.empty_models("empty");
    ws.write(
        ".facemark.toml",
        r"
[detector]
max_attempts = 1
backoff_secs = 0.0

[models]
dir = 'empty'
",
    );

    ws.facemark()
        .args(["face.png", "--max-attempts", "2"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("rechecking"));
}

#[test]
fn test_project_config_enables_report() {
    let ws = Workspace::new();
    ws.photo("face.png");
    ws.models("weights");
    ws.write(
        ".facemark.toml",
        r"
[models]
dir = 'weights'

[output]
report = true
",
    );

    ws.facemark()
        .arg("face.png")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"faces\":[]"));
}

#[test]
fn test_project_config_overrides_xdg() {
    let ws = Workspace::new();
    ws.photo("face.png");
    ws.models("weights");
    ws.write(
        "xdg-config/facemark/config.toml",
        r"
[models]
dir = 'weights'

[output]
report = true
",
    );
    ws.write(
        ".facemark.toml",
        r"
[output]
report = false
",
    );

    ws.facemark()
        .arg("face.png")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_xdg_config_alone_applies() {
    let ws = Workspace::new();
    ws.photo("face.png");
    ws.models("weights");
    ws.write(
        "xdg-config/facemark/config.toml",
        r"
[models]
dir = 'weights'

[output]
report = true
",
    );

    ws.facemark()
        .arg("face.png")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"dimensions\""));
}

#[test]
fn test_invalid_config_value_warns() {
    let ws = Workspace::new();
    ws.write(
        ".facemark.toml",
        r"
[detector]
min_confidence = 3.0
",
    );

    ws.facemark()
        .args(["models", "path"])
        .assert()
        .success()
        .stderr(predicate::str::contains("warning: detector.min_confidence"));
}

#[test]
fn test_malformed_config_is_ignored() {
    let ws = Workspace::new();
    ws.write(".facemark.toml", "[detector\nmax_attempts = ");

    ws.facemark()
        .args(["models", "path"])
        .assert()
        .success();
}
