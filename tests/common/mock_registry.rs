//! Mock registry client for testing
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use balrog_submit::error::{Error, Result};
use balrog_submit::registry::RegistryClient;
use balrog_submit::types::{LocaleSubmission, ReleaseCreation, ReleasePush, ReleaseSchedule};
use std::sync::Mutex;

/// One recorded registry call, in the order it was made
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryCall {
    /// `submit_locale`
    SubmitLocale(LocaleSubmission),
    /// `create_release`
    CreateRelease(ReleaseCreation),
    /// `push_release`
    PushRelease(ReleasePush),
    /// `schedule_release`
    ScheduleRelease(ReleaseSchedule),
}

/// Which calls should fail
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Failure {
    #[default]
    None,
    /// Every call fails
    All,
    /// The Nth call (1-based, counted across all methods) fails
    Nth(usize),
    /// The first N calls fail, later ones succeed
    FirstN(usize),
    /// The Nth call and every call after it fail
    From(usize),
}

/// Recording mock registry
///
/// This manually implements `RegistryClient` and records each attempted
/// call, including ones that were made to fail.
///
/// Features:
/// - Call tracking in order across every method
/// - Error injection for failure path testing
#[derive(Default)]
pub struct MockRegistry {
    calls: Mutex<Vec<RegistryCall>>,
    failure: Mutex<Failure>,
}

impl MockRegistry {
    /// Create a mock where every call succeeds
    pub fn new() -> Self {
        Self::default()
    }

    // === Error injection methods ===

    /// Make every call fail
    pub fn fail_all(&self) {
        *self.failure.lock().unwrap() = Failure::All;
    }

    /// Make the `n`th call (1-based) fail
    pub fn fail_nth(&self, n: usize) {
        *self.failure.lock().unwrap() = Failure::Nth(n);
    }

    /// Make the first `n` calls fail, then succeed
    pub fn fail_first(&self, n: usize) {
        *self.failure.lock().unwrap() = Failure::FirstN(n);
    }

    /// Make the `n`th call (1-based) and all later calls fail
    pub fn fail_from(&self, n: usize) {
        *self.failure.lock().unwrap() = Failure::From(n);
    }

    // === Call verification methods ===

    /// Every attempted call, in order
    pub fn calls(&self) -> Vec<RegistryCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of attempted calls
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Locale submissions, in order
    pub fn locale_calls(&self) -> Vec<LocaleSubmission> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RegistryCall::SubmitLocale(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    /// Release creations, in order
    pub fn create_calls(&self) -> Vec<ReleaseCreation> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RegistryCall::CreateRelease(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    /// Rule pushes, in order
    pub fn push_calls(&self) -> Vec<ReleasePush> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RegistryCall::PushRelease(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    /// Scheduling calls, in order
    pub fn schedule_calls(&self) -> Vec<ReleaseSchedule> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RegistryCall::ScheduleRelease(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: RegistryCall) -> Result<()> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(call);
        let n = calls.len();
        let fail = match *self.failure.lock().unwrap() {
            Failure::None => false,
            Failure::All => true,
            Failure::Nth(target) => n == target,
            Failure::FirstN(count) => n <= count,
            Failure::From(start) => n >= start,
        };
        if fail {
            Err(Error::Registry(format!("injected failure on call {n}")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RegistryClient for MockRegistry {
    async fn submit_locale(&self, request: &LocaleSubmission) -> Result<()> {
        self.record(RegistryCall::SubmitLocale(request.clone()))
    }

    async fn create_release(&self, request: &ReleaseCreation) -> Result<()> {
        self.record(RegistryCall::CreateRelease(request.clone()))
    }

    async fn push_release(&self, request: &ReleasePush) -> Result<()> {
        self.record(RegistryCall::PushRelease(request.clone()))
    }

    async fn schedule_release(&self, request: &ReleaseSchedule) -> Result<()> {
        self.record(RegistryCall::ScheduleRelease(request.clone()))
    }
}
