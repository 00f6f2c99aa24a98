//! Core types for balrog-submit

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Submission flow requested by a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Create top-level release blobs and point rules at them
    SubmitToplevel,
    /// Schedule a rule change to ship a release
    Schedule,
    /// Submit per-locale release metadata from the upstream manifest
    SubmitLocale,
}

impl Action {
    /// Map an action tag to an action. Unknown or missing tags mean locale submission.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("submit-toplevel") => Self::SubmitToplevel,
            Some("schedule") => Self::Schedule,
            _ => Self::SubmitLocale,
        }
    }

    /// Tag string for this action
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SubmitToplevel => "submit-toplevel",
            Self::Schedule => "schedule",
            Self::SubmitLocale => "submit-locale",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registry credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Auth {
    /// Registry user name
    pub username: String,
    /// Registry password
    pub password: String,
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Registry connection settings resolved for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Root URL of the registry API
    pub api_root: String,
    /// Dry-run mode: blobs are written under `-dummy` names
    pub dummy: bool,
}

/// Size, hash and location of one update MAR
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarInfo {
    /// File size in bytes
    pub size: u64,
    /// Hash of the file, using the entry's hash function
    pub hash: String,
    /// Download location, when the producer knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Build ID a partial update applies from (nightlies)
    #[serde(
        rename = "from_buildid",
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub from_build_id: Option<String>,
    /// Version a partial update applies from (releases)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_version: Option<String>,
    /// Build number of `previous_version`
    #[serde(
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub previous_build_number: Option<String>,
}

/// One locale's release metadata from the upstream manifest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManifestEntry {
    /// Build platform (e.g. `linux64`)
    pub platform: String,
    /// Product name as shipped (e.g. `Firefox`)
    #[serde(rename = "appName")]
    pub app_name: String,
    /// Application version
    #[serde(rename = "appVersion")]
    pub app_version: String,
    /// Display version (release style only)
    #[serde(default)]
    pub version: Option<String>,
    /// Build number (release style only)
    #[serde(default)]
    pub build_number: Option<u64>,
    /// Locale code
    pub locale: String,
    /// Hash function used for MAR hashes
    #[serde(rename = "hashType")]
    pub hash_type: String,
    /// Platform (Gecko) version
    #[serde(rename = "extVersion")]
    pub ext_version: String,
    /// Build ID
    #[serde(rename = "buildid", deserialize_with = "string_or_number")]
    pub build_id: String,
    /// Repository branch (nightly style only)
    #[serde(default)]
    pub branch: Option<String>,
    /// Complete update MARs
    #[serde(rename = "completeInfo")]
    pub complete_info: Vec<MarInfo>,
    /// Partial update MARs
    #[serde(rename = "partialInfo", default)]
    pub partial_info: Option<Vec<MarInfo>>,
    /// Suffix namespacing the blob this entry lands in
    #[serde(default)]
    pub blob_suffix: Option<String>,
    /// `[from, to]` rewrites applied to nightly file URLs
    #[serde(default)]
    pub url_replacements: Vec<(String, String)>,
    /// Release style marker
    #[serde(default, deserialize_with = "present")]
    pub tc_release: Option<Value>,
    /// Nightly style marker
    #[serde(default, deserialize_with = "present")]
    pub tc_nightly: Option<Value>,
}

/// Which locale submitter handles a manifest entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStyle {
    /// Versioned release blobs (`<Product>-<version>-build<N>`)
    Release,
    /// Nightly blobs keyed by build ID
    Nightly,
}

impl fmt::Display for SubmissionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Release => write!(f, "Release"),
            Self::Nightly => write!(f, "Nightly"),
        }
    }
}

/// Locale submission for a release-style entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseLocaleRequest {
    /// Blob name suffix (entry suffix + configured suffix)
    #[serde(skip)]
    pub suffix: String,
    /// Build platform
    pub platform: String,
    /// Product name (manifest `appName`)
    pub product_name: String,
    /// Application version
    pub app_version: String,
    /// Release version
    pub version: String,
    /// Release build number
    pub build_number: u64,
    /// Locale code
    pub locale: String,
    /// Hash function used for MAR hashes
    pub hash_function: String,
    /// Platform (Gecko) version
    pub ext_version: String,
    /// Build ID
    #[serde(rename = "buildID")]
    pub build_id: String,
    /// Complete update MARs
    pub complete_info: Vec<MarInfo>,
    /// Partial update MARs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_info: Option<Vec<MarInfo>>,
}

/// Locale submission for a nightly-style entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NightlyLocaleRequest {
    /// URL rewrites handed to the submitter, not part of the payload
    #[serde(skip)]
    pub url_replacements: Vec<(String, String)>,
    /// Build platform
    pub platform: String,
    /// Build ID
    #[serde(rename = "buildID")]
    pub build_id: String,
    /// Product name (manifest `appName`)
    pub product_name: String,
    /// Repository branch
    pub branch: String,
    /// Application version
    pub app_version: String,
    /// Locale code
    pub locale: String,
    /// Hash function used for MAR hashes
    pub hash_function: String,
    /// Platform (Gecko) version
    pub ext_version: String,
    /// Complete update MARs
    pub complete_info: Vec<MarInfo>,
    /// Partial update MARs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_info: Option<Vec<MarInfo>>,
}

/// A single locale submission, tagged by style
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LocaleSubmission {
    /// Release-style submission
    Release(ReleaseLocaleRequest),
    /// Nightly-style submission
    Nightly(NightlyLocaleRequest),
}

impl LocaleSubmission {
    /// Style of this submission
    pub const fn style(&self) -> SubmissionStyle {
        match self {
            Self::Release(_) => SubmissionStyle::Release,
            Self::Nightly(_) => SubmissionStyle::Nightly,
        }
    }

    /// Short human-readable label (`platform/locale`)
    pub fn label(&self) -> String {
        match self {
            Self::Release(r) => format!("{}/{}", r.platform, r.locale),
            Self::Nightly(n) => format!("{}/{}", n.platform, n.locale),
        }
    }
}

/// Build number of a partial update's source version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialUpdate {
    /// Build number, as written in the task
    #[serde(rename = "buildNumber")]
    pub build_number: String,
}

/// Partial updates keyed by source version
pub type PartialUpdates = BTreeMap<String, PartialUpdate>;

/// Request to create (or update) a top-level release blob
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseCreation {
    /// Blob name suffix (task blob suffix + update line suffix)
    #[serde(skip)]
    pub suffix: String,
    /// Override for the complete MAR file name
    #[serde(skip)]
    pub complete_mar_filename_pattern: Option<String>,
    /// Override for the complete MAR bouncer product
    #[serde(skip)]
    pub complete_mar_bouncer_product_pattern: Option<String>,
    /// Application version
    pub app_version: String,
    /// Capitalized product name
    pub product_name: String,
    /// Release version
    pub version: String,
    /// Release build number
    pub build_number: u64,
    /// Channels the release is offered on
    pub update_channels: Vec<String>,
    /// Archive host serving candidate builds
    pub ftp_server: String,
    /// Download redirector host
    pub bouncer_server: String,
    /// Platforms the en-US build exists for
    #[serde(rename = "enUSPlatforms")]
    pub en_us_platforms: Vec<String>,
    /// Hash function used for MAR hashes
    pub hash_function: String,
    /// Partial updates offered to older versions
    pub partial_updates: PartialUpdates,
    /// Whether downloads must wait for mirrors
    pub requires_mirrors: bool,
    /// Update line override for this suffix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_line: Option<Value>,
}

/// Request to point rules at a freshly created release
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleasePush {
    /// Blob name suffix
    #[serde(skip)]
    pub suffix: String,
    /// Capitalized product name
    pub product_name: String,
    /// Release version
    pub version: String,
    /// Release build number
    pub build_number: u64,
    /// Rules to point at the release
    pub rule_ids: Vec<u64>,
}

/// Request to schedule rule changes for a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseSchedule {
    /// Blob name suffix
    #[serde(skip)]
    pub suffix: String,
    /// Capitalized product name
    pub product: String,
    /// Release version
    pub version: String,
    /// Release build number
    pub build_number: u64,
    /// Rules to change when the release ships
    pub publish_rules: Vec<u64>,
    /// `None` ships as soon as the registry allows
    pub release_eta: Option<String>,
}

/// Capitalize a product name: first character upper-cased, the rest untouched
pub fn capitalize(product: &str) -> String {
    let mut chars = product.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Treat a present key as `Some`, even when its value is `null`
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
