//! Balrog HTTP client implementation

use crate::error::{Error, Result};
use crate::registry::RegistryClient;
use crate::registry::blob::{locale_blob, nightly_name, release_name, toplevel_blob};
use crate::submit::parse_release_eta;
use crate::types::{
    Auth, LocaleSubmission, RegistryConfig, ReleaseCreation, ReleasePush, ReleaseSchedule,
};
use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::{Value, json};
use tracing::{debug, info};

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Schema of per-locale release blobs
const RELEASE_SCHEMA_VERSION: u32 = 9;

/// Schema of per-locale nightly blobs
const NIGHTLY_SCHEMA_VERSION: u32 = 4;

/// Delay applied to scheduled changes that carry no release ETA
const UNSCHEDULED_DELAY_SECS: i64 = 5;

const CSRF_HEADER: &str = "X-CSRF-Token";
const DATA_VERSION_HEADER: &str = "X-Data-Version";

/// Registry client speaking the Balrog admin API
pub struct BalrogClient {
    client: Client,
    api_root: String,
    auth: Auth,
    dummy: bool,
}

impl BalrogClient {
    /// Create a new client for the given server
    pub fn new(auth: Auth, config: &RegistryConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_root: config.api_root.trim_end_matches('/').to_string(),
            auth,
            dummy: config.dummy,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_root, path)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.api_url(path))
            .basic_auth(&self.auth.username, Some(&self.auth.password))
    }

    /// Map non-success responses to [`Error::Registry`]
    async fn check(method: &Method, path: &str, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::Registry(format!("{method} {path} returned {status}: {body}")))
    }

    async fn csrf_token(&self) -> Result<String> {
        let path = "/csrf_token";
        let response = self.request(Method::HEAD, path).send().await?;
        let response = Self::check(&Method::HEAD, path, response).await?;
        response
            .headers()
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
            .ok_or_else(|| Error::Registry(format!("{path} response carries no {CSRF_HEADER}")))
    }

    /// Current data version of a resource, `None` when it does not exist yet
    async fn data_version(&self, path: &str) -> Result<Option<u64>> {
        let response = self.request(Method::GET, path).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::check(&Method::GET, path, response).await?;
        Ok(response
            .headers()
            .get(DATA_VERSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok()))
    }

    async fn get_rule(&self, rule_id: u64) -> Result<Value> {
        let path = format!("/rules/{rule_id}");
        let response = self.request(Method::GET, &path).send().await?;
        let response = Self::check(&Method::GET, &path, response).await?;
        Ok(response.json().await?)
    }

    /// Send a write request, attaching a fresh CSRF token
    async fn send(&self, method: Method, path: &str, mut body: Value) -> Result<()> {
        body["csrf_token"] = Value::String(self.csrf_token().await?);
        debug!(%method, path, "sending registry request");
        let response = self
            .request(method.clone(), path)
            .json(&body)
            .send()
            .await?;
        Self::check(&method, path, response).await?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn put_build(
        &self,
        name: &str,
        platform: &str,
        locale: &str,
        product: &str,
        hash_function: &str,
        schema_version: u32,
        blob: &Value,
    ) -> Result<()> {
        let path = format!(
            "/releases/{}/builds/{}/{}",
            urlencoding::encode(name),
            urlencoding::encode(platform),
            urlencoding::encode(locale)
        );

        let mut body = json!({
            "product": product,
            "hashFunction": hash_function,
            "schema_version": schema_version,
            "data": serde_json::to_string(blob)?,
        });
        if let Some(version) = self.data_version(&path).await? {
            body["data_version"] = json!(version);
        }

        info!(release = name, platform, locale, "submitting locale build");
        self.send(Method::PUT, &path, body).await
    }

    fn release_name(&self, product: &str, version: &str, build_number: u64, suffix: &str) -> String {
        release_name(product, version, build_number, suffix, self.dummy)
    }
}

#[async_trait]
impl RegistryClient for BalrogClient {
    async fn submit_locale(&self, request: &LocaleSubmission) -> Result<()> {
        let blob = locale_blob(request);
        match request {
            LocaleSubmission::Release(r) => {
                let name = self.release_name(&r.product_name, &r.version, r.build_number, &r.suffix);
                self.put_build(
                    &name,
                    &r.platform,
                    &r.locale,
                    &r.product_name,
                    &r.hash_function,
                    RELEASE_SCHEMA_VERSION,
                    &blob,
                )
                .await
            }
            LocaleSubmission::Nightly(n) => {
                for build in [n.build_id.as_str(), "latest"] {
                    let name = nightly_name(&n.product_name, &n.branch, build, "", self.dummy);
                    self.put_build(
                        &name,
                        &n.platform,
                        &n.locale,
                        &n.product_name,
                        &n.hash_function,
                        NIGHTLY_SCHEMA_VERSION,
                        &blob,
                    )
                    .await?;
                }
                Ok(())
            }
        }
    }

    async fn create_release(&self, request: &ReleaseCreation) -> Result<()> {
        let name = self.release_name(
            &request.product_name,
            &request.version,
            request.build_number,
            &request.suffix,
        );
        let path = format!("/releases/{}", urlencoding::encode(&name));
        let blob = toplevel_blob(request, &name);

        let mut body = json!({
            "name": name,
            "product": request.product_name,
            "hashFunction": request.hash_function,
            "schema_version": RELEASE_SCHEMA_VERSION,
            "blob": serde_json::to_string(&blob)?,
        });
        if let Some(version) = self.data_version(&path).await? {
            body["data_version"] = json!(version);
        }

        info!(release = %name, "creating top-level release");
        self.send(Method::PUT, &path, body).await
    }

    async fn push_release(&self, request: &ReleasePush) -> Result<()> {
        let name = self.release_name(
            &request.product_name,
            &request.version,
            request.build_number,
            &request.suffix,
        );

        for rule_id in &request.rule_ids {
            let rule = self.get_rule(*rule_id).await?;
            let body = json!({
                "mapping": name,
                "data_version": rule["data_version"],
            });
            info!(rule_id, release = %name, "pointing rule at release");
            self.send(Method::POST, &format!("/rules/{rule_id}"), body)
                .await?;
        }
        Ok(())
    }

    async fn schedule_release(&self, request: &ReleaseSchedule) -> Result<()> {
        let name = self.release_name(
            &request.product,
            &request.version,
            request.build_number,
            &request.suffix,
        );
        let when = match request.release_eta.as_deref() {
            Some(eta) => parse_release_eta(eta)?,
            None => Utc::now() + TimeDelta::seconds(UNSCHEDULED_DELAY_SECS),
        };

        for rule_id in &request.publish_rules {
            let mut body = self.get_rule(*rule_id).await?;
            if !body.is_object() {
                return Err(Error::Registry(format!(
                    "/rules/{rule_id} did not return an object"
                )));
            }
            body["rule_id"] = json!(rule_id);
            body["mapping"] = json!(name);
            body["change_type"] = json!("update");
            body["when"] = json!(when.timestamp_millis());

            info!(rule_id, release = %name, when = %when, "scheduling rule change");
            self.send(Method::POST, "/scheduled_changes/rules", body)
                .await?;
        }
        Ok(())
    }
}
