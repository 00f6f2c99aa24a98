//! Submission engine
//!
//! Handles the three submission flows:
//! 1. Locale - per-locale metadata from the upstream manifest
//! 2. Top-level - release blobs per update line, then a rule push
//! 3. Schedule - scheduled rule changes for a release

mod action;
mod execute;
mod locale;
mod partials;
mod progress;
mod schedule;
mod toplevel;

pub use action::resolve_action;
pub use execute::{SubmissionResult, Submitter};
pub use locale::build_locale_submission;
pub use progress::{CallStatus, NoopProgress, Phase, ProgressCallback};
pub use schedule::{build_schedule_request, parse_release_eta};
pub use toplevel::{ToplevelPlan, plan_toplevel_submission};
