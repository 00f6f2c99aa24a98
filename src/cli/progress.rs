//! CLI progress callback with styled output

use crate::cli::style::{Stylize, arrow, check, cross};
use anstream::{eprintln, println};
use async_trait::async_trait;
use balrog_submit::error::Error;
use balrog_submit::submit::{CallStatus, Phase, ProgressCallback};

/// CLI progress callback that prints to stdout with styled output
pub struct CliProgress;

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_phase(&self, phase: Phase) {
        match phase {
            Phase::Resolving => {}
            Phase::Complete => println!("{}", phase.to_string().success()),
            _ => println!("{}...", phase.to_string().emphasis()),
        }
    }

    async fn on_call(&self, operation: &str, status: CallStatus) {
        match &status {
            CallStatus::Started => println!("  {} {}", arrow(), operation.accent()),
            CallStatus::Success => println!("  {} {}", check(), operation),
            CallStatus::Failed(_) => eprintln!(
                "  {} {}: {}",
                cross(),
                operation.accent().for_stderr(),
                status.to_string().error()
            ),
        }
    }

    async fn on_error(&self, err: &Error) {
        eprintln!("{}: {}", "error".error(), err);
    }

    async fn on_message(&self, message: &str) {
        println!("  {}", message.muted());
    }
}
