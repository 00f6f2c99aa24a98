//! Release scheduling request

use crate::error::{Error, Result};
use crate::task::SchedulePayload;
use crate::types::{ReleaseSchedule, capitalize};
use chrono::{DateTime, Utc};

/// Parse an RFC 3339 release ETA
pub fn parse_release_eta(eta: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(eta)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Configuration(format!("invalid release_eta {eta:?}: {e}")))
}

/// Build the scheduling request for a task payload
pub fn build_schedule_request(payload: &SchedulePayload) -> Result<ReleaseSchedule> {
    if let Some(eta) = payload.release_eta.as_deref() {
        parse_release_eta(eta)?;
    }

    Ok(ReleaseSchedule {
        suffix: payload.blob_suffix.clone(),
        product: capitalize(&payload.product),
        version: payload.version.clone(),
        build_number: payload.build_number,
        publish_rules: payload.publish_rules.clone(),
        release_eta: payload.release_eta.clone(),
    })
}
