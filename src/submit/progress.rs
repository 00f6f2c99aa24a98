//! Progress callback trait for interface-agnostic updates
//!
//! The submitter reports phases and individual registry calls through this
//! trait, so the CLI and tests can observe a run without a global logger.

use crate::error::Error;
use async_trait::async_trait;
use std::fmt;

/// Submission phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Working out which action the task asks for
    Resolving,
    /// Submitting per-locale metadata
    SubmittingLocales,
    /// Creating top-level release blobs
    CreatingReleases,
    /// Pointing rules at the new release
    PushingRelease,
    /// Scheduling rule changes
    Scheduling,
    /// Submission complete
    Complete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Resolving => "Resolving action",
            Self::SubmittingLocales => "Submitting locales",
            Self::CreatingReleases => "Creating releases",
            Self::PushingRelease => "Pushing release",
            Self::Scheduling => "Scheduling release",
            Self::Complete => "Done",
        };
        f.write_str(text)
    }
}

/// Status of a single registry call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallStatus {
    /// Call started
    Started,
    /// Call succeeded, possibly after retries
    Success,
    /// Call failed after exhausting retries
    Failed(String),
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => write!(f, "started"),
            Self::Success => write!(f, "done"),
            Self::Failed(msg) => write!(f, "failed: {msg}"),
        }
    }
}

/// Progress callback trait
///
/// Implement this trait to receive progress updates during submission.
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Called when entering a new phase
    async fn on_phase(&self, phase: Phase);

    /// Called when a registry call changes status
    async fn on_call(&self, operation: &str, status: CallStatus);

    /// Called when the run aborts with an error
    async fn on_error(&self, error: &Error);

    /// Called with a general status message
    async fn on_message(&self, message: &str);
}

/// No-op progress callback for testing or when progress isn't needed
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_phase(&self, _phase: Phase) {}
    async fn on_call(&self, _operation: &str, _status: CallStatus) {}
    async fn on_error(&self, _error: &Error) {}
    async fn on_message(&self, _message: &str) {}
}
