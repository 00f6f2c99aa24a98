//! Script configuration
//!
//! The config file is JSON and carries one entry per registry server; a task
//! picks the server through its scopes (see [`crate::task::get_task_server`]).

use crate::error::{Error, Result};
use crate::retry::RetryPolicy;
use crate::types::{Auth, RegistryConfig};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Scope prefix used when the config does not list any
pub const DEFAULT_SCOPE_PREFIX: &str = "project:releng:balrog:";

/// Connection details for one registry server
#[derive(Clone, Deserialize)]
pub struct ServerConfig {
    /// Root URL of the registry API
    pub api_root: String,
    /// Registry user name
    pub balrog_username: String,
    /// Registry password
    pub balrog_password: String,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("api_root", &self.api_root)
            .field("balrog_username", &self.balrog_username)
            .finish_non_exhaustive()
    }
}

/// Retry settings as written in the config file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total attempts per remote call
    pub attempts: u32,
    /// Delay after the first failure
    pub sleeptime_secs: f64,
    /// Multiplier applied to the delay after each failure
    pub sleepscale: f64,
    /// Upper bound for any single delay
    pub max_sleeptime_secs: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            attempts: policy.max_attempts,
            sleeptime_secs: policy.initial_delay.as_secs_f64(),
            sleepscale: policy.backoff_factor,
            max_sleeptime_secs: policy.max_delay.as_secs_f64(),
        }
    }
}

impl RetrySettings {
    /// Convert to a [`RetryPolicy`], rejecting nonsensical values
    pub fn to_policy(&self) -> Result<RetryPolicy> {
        if self.attempts == 0 {
            return Err(Error::Configuration(
                "retry.attempts must be at least 1".to_string(),
            ));
        }
        let secs = |name: &str, value: f64| {
            Duration::try_from_secs_f64(value).map_err(|_| {
                Error::Configuration(format!("retry.{name} must be a non-negative number"))
            })
        };
        Ok(RetryPolicy {
            max_attempts: self.attempts,
            initial_delay: secs("sleeptime_secs", self.sleeptime_secs)?,
            backoff_factor: self.sleepscale.max(1.0),
            max_delay: secs("max_sleeptime_secs", self.max_sleeptime_secs)?,
        })
    }
}

/// Top-level script configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory holding `task.json` and upstream artifacts under `cot/`
    pub work_dir: PathBuf,
    /// Enable debug logging
    #[serde(default)]
    pub verbose: bool,
    /// Write blobs under `-dummy` names instead of the real ones
    #[serde(default)]
    pub dummy: bool,
    /// Prefixes recognized on task scopes
    #[serde(default = "default_scope_prefixes")]
    pub taskcluster_scope_prefixes: Vec<String>,
    /// Registry servers by name
    pub server_config: HashMap<String, ServerConfig>,
    /// Retry settings for remote calls
    #[serde(default)]
    pub retry: RetrySettings,
}

fn default_scope_prefixes() -> Vec<String> {
    vec![DEFAULT_SCOPE_PREFIX.to_string()]
}

impl Config {
    /// Resolve credentials and connection settings for `server`
    pub fn resolve_server(&self, server: &str) -> Result<(Auth, RegistryConfig)> {
        let entry = self.server_config.get(server).ok_or_else(|| {
            Error::Configuration(format!("no server_config entry for server {server:?}"))
        })?;

        url::Url::parse(&entry.api_root).map_err(|e| {
            Error::Configuration(format!("invalid api_root {:?}: {e}", entry.api_root))
        })?;

        let auth = Auth {
            username: entry.balrog_username.clone(),
            password: entry.balrog_password.clone(),
        };
        let registry = RegistryConfig {
            api_root: entry.api_root.trim_end_matches('/').to_string(),
            dummy: self.dummy,
        };
        Ok((auth, registry))
    }
}

/// Load the config file at `path`
pub fn load_config(path: &Path) -> Result<Config> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}
