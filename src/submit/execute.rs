//! Submission execution
//!
//! Resolves the task's action, builds every request for it up front, then
//! runs the registry calls one at a time. The first call that still fails
//! after retries aborts the run; calls already made are left in place.

use crate::config::DEFAULT_SCOPE_PREFIX;
use crate::error::Result;
use crate::registry::RegistryClient;
use crate::retry::RetryPolicy;
use crate::submit::locale::plan_locale_submissions;
use crate::submit::schedule::build_schedule_request;
use crate::submit::toplevel::plan_toplevel_submission;
use crate::submit::{CallStatus, Phase, ProgressCallback, resolve_action};
use crate::task::{ManifestLoader, Task, get_upstream_artifacts};
use crate::types::Action;
use std::future::Future;
use tracing::info;

/// Outcome of a completed submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionResult {
    /// Action that was run
    pub action: Action,
    /// Registry calls that succeeded
    pub calls: usize,
}

/// Runs submission flows against a registry
pub struct Submitter<'a> {
    registry: &'a dyn RegistryClient,
    retry: RetryPolicy,
    progress: &'a dyn ProgressCallback,
    scope_prefixes: Vec<String>,
}

impl<'a> Submitter<'a> {
    /// Create a submitter using the default scope prefix
    pub fn new(
        registry: &'a dyn RegistryClient,
        retry: RetryPolicy,
        progress: &'a dyn ProgressCallback,
    ) -> Self {
        Self {
            registry,
            retry,
            progress,
            scope_prefixes: vec![DEFAULT_SCOPE_PREFIX.to_string()],
        }
    }

    /// Recognize action scopes under these prefixes instead
    #[must_use]
    pub fn with_scope_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.scope_prefixes = prefixes;
        self
    }

    /// Run whatever action `task` asks for
    pub async fn run(&self, task: &Task, manifest: &dyn ManifestLoader) -> Result<SubmissionResult> {
        self.progress.on_phase(Phase::Resolving).await;
        let action = resolve_action(task, &self.scope_prefixes);
        info!(%action, "resolved task action");

        let outcome = match action {
            Action::SubmitLocale => self.submit_locale(task, manifest).await,
            Action::SubmitToplevel => self.submit_toplevel(task).await,
            Action::Schedule => self.schedule(task).await,
        };

        match outcome {
            Ok(calls) => {
                self.progress.on_phase(Phase::Complete).await;
                Ok(SubmissionResult { action, calls })
            }
            Err(e) => {
                self.progress.on_error(&e).await;
                Err(e)
            }
        }
    }

    /// Submit every manifest entry under every configured suffix
    pub async fn submit_locale(&self, task: &Task, manifest: &dyn ManifestLoader) -> Result<usize> {
        let payload = task.locale_payload()?;
        let artifacts = get_upstream_artifacts(&payload)?;
        let entries = manifest.load_manifest(artifacts)?;
        let submissions = plan_locale_submissions(&entries, &payload.suffixes)?;

        self.progress.on_phase(Phase::SubmittingLocales).await;
        self.progress
            .on_message(&format!(
                "{} manifest entries x {} suffixes",
                entries.len(),
                payload.suffixes.len()
            ))
            .await;

        for submission in &submissions {
            info!("Taskcluster {} style Balrog submission", submission.style());
            let operation = format!("submit {} {}", submission.style(), submission.label());
            self.call(&operation, || self.registry.submit_locale(submission))
                .await?;
        }
        Ok(submissions.len())
    }

    /// Create one top-level release per update line, then push rules once
    pub async fn submit_toplevel(&self, task: &Task) -> Result<usize> {
        let payload = task.toplevel_payload()?;
        let plan = plan_toplevel_submission(&payload)?;

        self.progress.on_phase(Phase::CreatingReleases).await;
        for creation in &plan.creations {
            let operation = format!(
                "create {}-{}-build{}{}",
                creation.product_name, creation.version, creation.build_number, creation.suffix
            );
            self.call(&operation, || self.registry.create_release(creation))
                .await?;
        }

        self.progress.on_phase(Phase::PushingRelease).await;
        let operation = format!("push rules {:?}", plan.push.rule_ids);
        self.call(&operation, || self.registry.push_release(&plan.push))
            .await?;

        Ok(plan.creations.len() + 1)
    }

    /// Schedule the release on its publish rules
    pub async fn schedule(&self, task: &Task) -> Result<usize> {
        let payload = task.schedule_payload()?;
        let request = build_schedule_request(&payload)?;

        self.progress.on_phase(Phase::Scheduling).await;
        let operation = format!(
            "schedule rules {:?} at {}",
            request.publish_rules,
            request.release_eta.as_deref().unwrap_or("the next opportunity")
        );
        self.call(&operation, || self.registry.schedule_release(&request))
            .await?;
        Ok(1)
    }

    /// One retry-wrapped registry call, reported to the progress callback
    async fn call<F, Fut>(&self, operation: &str, call: F) -> Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        self.progress.on_call(operation, CallStatus::Started).await;
        match self.retry.run(operation, call).await {
            Ok(()) => {
                self.progress.on_call(operation, CallStatus::Success).await;
                Ok(())
            }
            Err(e) => {
                self.progress
                    .on_call(operation, CallStatus::Failed(e.to_string()))
                    .await;
                Err(e)
            }
        }
    }
}
