//! Registry client capability
//!
//! One method per remote operation. The submission engine only talks to this
//! trait, so tests can swap in a recording mock for the HTTP client.

mod balrog;
mod blob;

pub use balrog::BalrogClient;

use crate::error::Result;
use crate::types::{Auth, LocaleSubmission, RegistryConfig, ReleaseCreation, ReleasePush, ReleaseSchedule};
use async_trait::async_trait;

/// Registry operations used by the submission flows
///
/// Every call must be an idempotent upsert: the caller retries on any error.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Submit one locale's metadata (release or nightly style)
    async fn submit_locale(&self, request: &LocaleSubmission) -> Result<()>;

    /// Create or update a top-level release blob
    async fn create_release(&self, request: &ReleaseCreation) -> Result<()>;

    /// Point rules at a release
    async fn push_release(&self, request: &ReleasePush) -> Result<()>;

    /// Schedule rule changes for a release
    async fn schedule_release(&self, request: &ReleaseSchedule) -> Result<()>;
}

/// Create the HTTP registry client for resolved settings
pub fn create_registry_client(
    auth: Auth,
    config: &RegistryConfig,
) -> Result<Box<dyn RegistryClient>> {
    Ok(Box::new(BalrogClient::new(auth, config)?))
}
