//! balrog-submit - release metadata submission for build pipelines
//!
//! Takes a build task, decides which submission flow it asks for, turns the
//! task payload (and, for locale submissions, the upstream manifest) into
//! typed registry requests, and executes them in order with bounded retry.

pub mod config;
pub mod error;
pub mod registry;
pub mod retry;
pub mod submit;
pub mod task;
pub mod types;
