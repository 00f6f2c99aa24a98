//! Test data factories for tasks, manifests and work directories
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use balrog_submit::error::Result;
use balrog_submit::task::{ManifestLoader, Task, UpstreamArtifact};
use balrog_submit::types::ManifestEntry;
use serde_json::{Value, json};
use std::path::Path;
use tempfile::TempDir;

/// Build a task from its JSON form
pub fn make_task(value: Value) -> Task {
    serde_json::from_value(value).expect("fixture task is valid")
}

/// Release-style manifest entry as JSON
pub fn release_entry_json(platform: &str, locale: &str) -> Value {
    json!({
        "tc_release": true,
        "platform": platform,
        "appName": "Firefox",
        "appVersion": "100.0",
        "version": "100.0",
        "build_number": 2,
        "locale": locale,
        "hashType": "sha512",
        "extVersion": "100.0",
        "buildid": "20220501000000",
        "completeInfo": [{
            "size": 123,
            "hash": "abcd",
            "url": format!("https://archive.example.com/{platform}/{locale}/firefox-100.0.complete.mar"),
        }],
    })
}

/// Nightly-style manifest entry as JSON
pub fn nightly_entry_json(platform: &str, locale: &str) -> Value {
    json!({
        "tc_nightly": true,
        "platform": platform,
        "appName": "Firefox",
        "appVersion": "101.0a1",
        "branch": "mozilla-central",
        "locale": locale,
        "hashType": "sha512",
        "extVersion": "101.0a1",
        "buildid": 20_220_501_093_000_u64,
        "completeInfo": [{
            "size": 456,
            "hash": "ef01",
            "url": format!("https://archive.example.com/nightly/{platform}/{locale}.complete.mar"),
        }],
    })
}

/// Deserialize a manifest entry from JSON
pub fn make_entry(value: Value) -> ManifestEntry {
    serde_json::from_value(value).expect("fixture manifest entry is valid")
}

/// Locale submission task over one upstream artifact
pub fn locale_task(suffixes: Value) -> Task {
    make_task(json!({
        "scopes": ["project:releng:balrog:action:submit-locale"],
        "payload": {
            "upstreamArtifacts": [{
                "taskId": "upstream1",
                "taskType": "beetmover",
                "paths": ["public/manifest.json"],
            }],
            "suffixes": suffixes,
        },
    }))
}

/// Top-level submission task with the given payload overrides merged in
pub fn toplevel_task(overrides: Value) -> Task {
    let mut payload = json!({
        "product": "firefox",
        "app_version": "100.0",
        "version": "100.0",
        "build_number": 2,
        "channel_names": ["release", "release-localtest", "release-cdntest"],
        "archive_domain": "archive.example.com",
        "download_domain": "download.example.com",
        "platforms": ["linux64", "win64"],
        "require_mirrors": true,
        "rules_to_update": [10, 11],
        "partial_versions": "99.0build1, 98.0build3",
    });
    merge(&mut payload, overrides);
    make_task(json!({
        "action": "submit-toplevel",
        "payload": payload,
    }))
}

/// Scheduling task with the given release ETA value
pub fn schedule_task(release_eta: Value) -> Task {
    make_task(json!({
        "action": "schedule",
        "payload": {
            "product": "firefox",
            "version": "100.0",
            "build_number": 2,
            "publish_rules": [10],
            "release_eta": release_eta,
        },
    }))
}

fn merge(target: &mut Value, overrides: Value) {
    if let (Some(target), Value::Object(overrides)) = (target.as_object_mut(), overrides) {
        for (key, value) in overrides {
            target.insert(key, value);
        }
    }
}

/// In-memory manifest loader that ignores artifact paths
pub struct StaticManifest(pub Vec<ManifestEntry>);

impl ManifestLoader for StaticManifest {
    fn load_manifest(&self, _artifacts: &[UpstreamArtifact]) -> Result<Vec<ManifestEntry>> {
        Ok(self.0.clone())
    }
}

/// Write a JSON file, creating parent directories
pub fn write_json(path: &Path, value: &Value) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// Work directory holding `task.json` plus a script config pointing at it
pub struct WorkDir {
    /// Temporary directory; removed on drop
    pub dir: TempDir,
}

impl WorkDir {
    /// Create a work directory with `task` written to `task.json`
    pub fn with_task(task: &Value) -> Self {
        let dir = TempDir::new().unwrap();
        write_json(&dir.path().join("task.json"), task);
        Self { dir }
    }

    /// Path of the work directory
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a manifest under `cot/<task_id>/<rel>`
    pub fn write_manifest(&self, task_id: &str, rel: &str, entries: &Value) {
        write_json(&self.path().join("cot").join(task_id).join(rel), entries);
    }

    /// Write a script config for `api_root` and return its path
    pub fn write_config(&self, api_root: &str, extra: Value) -> std::path::PathBuf {
        let mut config = json!({
            "work_dir": self.path(),
            "server_config": {
                "default": {
                    "api_root": api_root,
                    "balrog_username": "balrogadmin",
                    "balrog_password": "secret",
                },
            },
            "retry": { "attempts": 1, "sleeptime_secs": 0 },
        });
        merge(&mut config, extra);
        let path = self.path().join("config.json");
        write_json(&path, &config);
        path
    }
}
