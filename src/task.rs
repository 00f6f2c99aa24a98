//! Task definition, payload validation and upstream manifest loading

use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::ManifestEntry;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Task file name inside the work directory
pub const TASK_FILE: &str = "task.json";

/// Directory under the work directory holding upstream artifacts
pub const ARTIFACTS_DIR: &str = "cot";

/// A build task as handed to the script
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Task {
    /// Explicit action tag (`submit-toplevel`, `schedule`, ...)
    #[serde(default)]
    pub action: Option<String>,
    /// Scopes granted to the task
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Action-specific payload
    #[serde(default)]
    pub payload: Value,
}

/// Artifacts produced by an upstream task
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpstreamArtifact {
    /// Upstream task ID
    #[serde(rename = "taskId")]
    pub task_id: String,
    /// Upstream task kind (e.g. `beetmover`)
    #[serde(rename = "taskType")]
    pub task_type: String,
    /// Artifact paths relative to the upstream task's directory
    pub paths: Vec<String>,
}

/// Payload of a locale submission task
#[derive(Debug, Clone, Deserialize)]
pub struct LocalePayload {
    /// Upstream tasks whose manifests are submitted
    #[serde(rename = "upstreamArtifacts", default)]
    pub upstream_artifacts: Vec<UpstreamArtifact>,
    /// Blob suffixes each entry is submitted under; never empty
    #[serde(default = "default_suffixes", deserialize_with = "non_empty_suffixes")]
    pub suffixes: Vec<String>,
}

/// Payload of a top-level submission task
#[derive(Debug, Clone, Deserialize)]
pub struct TopLevelPayload {
    /// Product name, lower case (e.g. `firefox`)
    pub product: String,
    /// Application version
    pub app_version: String,
    /// Release version
    pub version: String,
    /// Release build number
    pub build_number: u64,
    /// Channels the release is offered on
    pub channel_names: Vec<String>,
    /// Archive host serving candidate builds
    pub archive_domain: String,
    /// Download redirector host
    pub download_domain: String,
    /// Platforms the en-US build exists for
    pub platforms: Vec<String>,
    /// Whether downloads must wait for mirrors
    pub require_mirrors: bool,
    /// Rules to point at the new release
    pub rules_to_update: Vec<u64>,
    /// Comma-separated `<version>build<N>` list
    #[serde(default, deserialize_with = "empty_as_none")]
    pub partial_versions: Option<String>,
    /// Update lines keyed by blob suffix, in task order
    #[serde(default)]
    pub update_line: IndexMap<String, Value>,
    /// Base blob suffix
    #[serde(default)]
    pub blob_suffix: String,
    /// Override for the complete MAR file name (`{product}`/`{version}` placeholders)
    #[serde(default)]
    pub complete_mar_filename_pattern: Option<String>,
    /// Override for the complete MAR bouncer product (`{product}`/`{version}` placeholders)
    #[serde(default)]
    pub complete_mar_bouncer_product_pattern: Option<String>,
}

/// Payload of a scheduling task
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulePayload {
    /// Product name, lower case
    pub product: String,
    /// Release version
    pub version: String,
    /// Release build number
    pub build_number: u64,
    /// Rules to change when the release ships
    pub publish_rules: Vec<u64>,
    /// RFC 3339 ship time; `""` and `null` mean no ETA
    #[serde(deserialize_with = "empty_as_none")]
    pub release_eta: Option<String>,
    /// Blob suffix
    #[serde(default)]
    pub blob_suffix: String,
}

fn default_suffixes() -> Vec<String> {
    vec![String::new()]
}

fn non_empty_suffixes<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let suffixes = Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(if suffixes.is_empty() {
        default_suffixes()
    } else {
        suffixes
    })
}

fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.is_empty()))
}

impl Task {
    fn scoped_values<'a>(&'a self, prefixes: &'a [String], kind: &'a str) -> impl Iterator<Item = &'a str> {
        self.scopes.iter().filter_map(move |scope| {
            prefixes
                .iter()
                .find_map(|prefix| scope.strip_prefix(prefix.as_str()))
                .and_then(|rest| rest.strip_prefix(kind))
                .and_then(|rest| rest.strip_prefix(':'))
        })
    }

    /// Action tag: the explicit `action` field, else an `<prefix>action:<name>` scope
    pub fn action_tag(&self, prefixes: &[String]) -> Option<String> {
        self.action.clone().or_else(|| {
            self.scoped_values(prefixes, "action")
                .next()
                .map(ToString::to_string)
        })
    }

    fn payload_as<T: DeserializeOwned>(&self, kind: &str) -> Result<T> {
        serde_json::from_value(self.payload.clone())
            .map_err(|e| Error::Configuration(format!("invalid {kind} task payload: {e}")))
    }

    /// Validate and extract a locale submission payload
    pub fn locale_payload(&self) -> Result<LocalePayload> {
        self.payload_as("submit-locale")
    }

    /// Validate and extract a top-level submission payload
    pub fn toplevel_payload(&self) -> Result<TopLevelPayload> {
        self.payload_as("submit-toplevel")
    }

    /// Validate and extract a scheduling payload
    pub fn schedule_payload(&self) -> Result<SchedulePayload> {
        self.payload_as("schedule")
    }
}

/// Read `task.json` from the configured work directory
pub fn get_task(config: &Config) -> Result<Task> {
    let path = config.work_dir.join(TASK_FILE);
    let raw = std::fs::read_to_string(&path).map_err(|source| Error::Io {
        path: path.clone(),
        source,
    })?;
    let task: Task = serde_json::from_str(&raw)
        .map_err(|e| Error::Configuration(format!("invalid task definition {}: {e}", path.display())))?;
    debug!(path = %path.display(), scopes = ?task.scopes, "loaded task");
    Ok(task)
}

/// Registry server named by the task's `<prefix>server:<name>` scope
///
/// Tasks without a server scope use `default`.
pub fn get_task_server(task: &Task, config: &Config) -> Result<String> {
    let mut servers: Vec<&str> = task
        .scoped_values(&config.taskcluster_scope_prefixes, "server")
        .collect();
    servers.sort_unstable();
    servers.dedup();

    match servers.as_slice() {
        [] => Ok("default".to_string()),
        [server] => Ok((*server).to_string()),
        many => Err(Error::Configuration(format!(
            "task has more than one server scope: {}",
            many.join(", ")
        ))),
    }
}

/// Upstream artifacts listed in a locale submission payload
pub fn get_upstream_artifacts(payload: &LocalePayload) -> Result<&[UpstreamArtifact]> {
    if payload.upstream_artifacts.is_empty() {
        return Err(Error::Configuration(
            "locale submission needs at least one upstream artifact".to_string(),
        ));
    }
    Ok(&payload.upstream_artifacts)
}

/// Source of the locale manifest for a submission
pub trait ManifestLoader: Send + Sync {
    /// Load the ordered manifest entries for `artifacts`
    fn load_manifest(&self, artifacts: &[UpstreamArtifact]) -> Result<Vec<ManifestEntry>>;
}

/// Reads manifests downloaded into `<work_dir>/cot/<taskId>/<path>`
#[derive(Debug, Clone)]
pub struct DiskManifestLoader {
    work_dir: PathBuf,
}

impl DiskManifestLoader {
    /// Create a loader rooted at `work_dir`
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    fn read_manifest(path: &Path) -> Result<Vec<ManifestEntry>> {
        let raw = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            Error::Configuration(format!("invalid manifest {}: {e}", path.display()))
        })
    }
}

impl ManifestLoader for DiskManifestLoader {
    fn load_manifest(&self, artifacts: &[UpstreamArtifact]) -> Result<Vec<ManifestEntry>> {
        let mut entries = Vec::new();
        for artifact in artifacts {
            for rel in &artifact.paths {
                let path = self.work_dir.join(ARTIFACTS_DIR).join(&artifact.task_id).join(rel);
                let manifest = Self::read_manifest(&path)?;
                info!(path = %path.display(), entries = manifest.len(), "loaded manifest");
                entries.extend(manifest);
            }
        }
        Ok(entries)
    }
}
