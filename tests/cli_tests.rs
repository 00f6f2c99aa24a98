//! Binary tests: config handling and a full run against a mock server

mod common;

use assert_cmd::Command;
use common::fixtures::WorkDir;
use mockito::{Matcher, Server};
use predicates::prelude::*;
use serde_json::json;

fn balrogscript() -> Command {
    let mut cmd = Command::cargo_bin("balrogscript").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_missing_config_exits_5() {
    let dir = tempfile::tempdir().unwrap();

    balrogscript()
        .arg(dir.path().join("nope.json"))
        .assert()
        .code(5)
        .stderr(predicate::str::contains("Can't read config file"));
}

#[test]
fn test_invalid_config_exits_5() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    balrogscript().arg(&path).assert().code(5);
}

#[test]
fn test_missing_argument_is_usage_error() {
    balrogscript().assert().failure().code(2);
}

#[test]
fn test_unknown_server_fails() {
    let work = WorkDir::with_task(&json!({
        "scopes": ["project:releng:balrog:server:release"],
        "action": "schedule",
        "payload": {},
    }));
    let config = work.write_config("https://balrog.example.com/api", json!({}));

    balrogscript()
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("release"));
}

#[test]
fn test_schedule_run_against_server() {
    let mut server = Server::new();
    let _csrf = server
        .mock("HEAD", "/api/csrf_token")
        .with_status(200)
        .with_header("X-CSRF-Token", "tok")
        .create();
    let _rule = server
        .mock("GET", "/api/rules/42")
        .with_status(200)
        .with_body(json!({"rule_id": 42, "data_version": 2}).to_string())
        .create();
    let post = server
        .mock("POST", "/api/scheduled_changes/rules")
        .match_body(Matcher::PartialJson(json!({
            "rule_id": 42,
            "mapping": "Devedition-101.0b3-build1-dummy",
            "change_type": "update",
        })))
        .with_status(200)
        .expect(1)
        .create();

    let work = WorkDir::with_task(&json!({
        "scopes": [
            "project:releng:balrog:action:schedule",
            "project:releng:balrog:server:beta",
        ],
        "payload": {
            "product": "devedition",
            "version": "101.0b3",
            "build_number": 1,
            "publish_rules": [42],
            "release_eta": "",
        },
    }));
    let config = work.write_config(
        "https://unused.example.com/api",
        json!({
            "dummy": true,
            "server_config": {
                "beta": {
                    "api_root": format!("{}/api", server.url()),
                    "balrog_username": "balrogadmin",
                    "balrog_password": "secret",
                },
            },
        }),
    );

    balrogscript()
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("schedule complete"));

    post.assert();
}

#[test]
fn test_locale_run_reads_manifest_from_work_dir() {
    let mut server = Server::new();
    let path = "/api/releases/Firefox-100.0-build2/builds/linux64/de";
    let _csrf = server
        .mock("HEAD", "/api/csrf_token")
        .with_status(200)
        .with_header("X-CSRF-Token", "tok")
        .create();
    let _missing = server.mock("GET", path).with_status(404).create();
    let put = server
        .mock("PUT", path)
        .match_body(Matcher::PartialJson(json!({"product": "Firefox"})))
        .with_status(201)
        .expect(1)
        .create();

    let work = WorkDir::with_task(&json!({
        "payload": {
            "upstreamArtifacts": [{
                "taskId": "abc123",
                "taskType": "beetmover",
                "paths": ["public/manifest.json"],
            }],
        },
    }));
    work.write_manifest(
        "abc123",
        "public/manifest.json",
        &json!([common::fixtures::release_entry_json("linux64", "de")]),
    );
    let config = work.write_config(&format!("{}/api", server.url()), json!({}));

    balrogscript()
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("submit-locale complete: 1 registry call"));

    put.assert();
}
