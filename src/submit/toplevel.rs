//! Top-level release creation and rule push requests

use crate::error::Result;
use crate::submit::partials::parse_partial_versions;
use crate::task::TopLevelPayload;
use crate::types::{PartialUpdates, ReleaseCreation, ReleasePush, capitalize};

/// Hash function for every top-level release blob
const TOPLEVEL_HASH_FUNCTION: &str = "sha512";

/// Requests for a top-level submission, in execution order
#[derive(Debug, Clone, PartialEq)]
pub struct ToplevelPlan {
    /// One creation per update line suffix
    pub creations: Vec<ReleaseCreation>,
    /// Rule push, run once after every creation succeeded
    pub push: ReleasePush,
}

/// Build the creation and push requests for a top-level submission
pub fn plan_toplevel_submission(payload: &TopLevelPayload) -> Result<ToplevelPlan> {
    let partials: PartialUpdates = match payload.partial_versions.as_deref() {
        Some(raw) => parse_partial_versions(raw)?,
        None => PartialUpdates::new(),
    };
    let product_name = capitalize(&payload.product);

    let suffixes: Vec<&str> = if payload.update_line.is_empty() {
        vec![""]
    } else {
        payload.update_line.keys().map(String::as_str).collect()
    };

    let creations = suffixes
        .into_iter()
        .map(|suffix| ReleaseCreation {
            suffix: format!("{}{suffix}", payload.blob_suffix),
            complete_mar_filename_pattern: payload.complete_mar_filename_pattern.clone(),
            complete_mar_bouncer_product_pattern: payload
                .complete_mar_bouncer_product_pattern
                .clone(),
            app_version: payload.app_version.clone(),
            product_name: product_name.clone(),
            version: payload.version.clone(),
            build_number: payload.build_number,
            update_channels: payload.channel_names.clone(),
            ftp_server: payload.archive_domain.clone(),
            bouncer_server: payload.download_domain.clone(),
            en_us_platforms: payload.platforms.clone(),
            hash_function: TOPLEVEL_HASH_FUNCTION.to_string(),
            partial_updates: partials.clone(),
            requires_mirrors: payload.require_mirrors,
            update_line: payload.update_line.get(suffix).cloned(),
        })
        .collect();

    let push = ReleasePush {
        suffix: payload.blob_suffix.clone(),
        product_name,
        version: payload.version.clone(),
        build_number: payload.build_number,
        rule_ids: payload.rules_to_update.clone(),
    };

    Ok(ToplevelPlan { creations, push })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::task::Task;
    use serde_json::json;

    fn payload(extra: serde_json::Value) -> TopLevelPayload {
        let mut payload = json!({
            "product": "firefox",
            "app_version": "100.0",
            "version": "100.0",
            "build_number": 1,
            "channel_names": ["release"],
            "archive_domain": "a",
            "download_domain": "b",
            "platforms": ["win64"],
            "require_mirrors": true,
            "rules_to_update": [12],
        });
        for (k, v) in extra.as_object().unwrap() {
            payload[k] = v.clone();
        }
        Task {
            payload,
            ..Task::default()
        }
        .toplevel_payload()
        .unwrap()
    }

    #[test]
    fn test_single_creation_without_update_line() {
        let plan = plan_toplevel_submission(&payload(json!({"partial_versions": "99.0build3"}))).unwrap();
        assert_eq!(plan.creations.len(), 1);

        let creation = serde_json::to_value(&plan.creations[0]).unwrap();
        assert_eq!(creation["productName"], "Firefox");
        assert_eq!(creation["hashFunction"], "sha512");
        assert_eq!(creation["partialUpdates"], json!({"99.0": {"buildNumber": "3"}}));
        assert_eq!(creation["updateChannels"], json!(["release"]));
        assert_eq!(creation["ftpServer"], "a");
        assert_eq!(creation["bouncerServer"], "b");
        assert_eq!(creation["enUSPlatforms"], json!(["win64"]));
        assert_eq!(creation["requiresMirrors"], true);
        assert!(creation.get("updateLine").is_none());

        assert_eq!(plan.push.rule_ids, vec![12]);
        assert_eq!(plan.push.product_name, "Firefox");
        assert_eq!(plan.push.suffix, "");
    }

    #[test]
    fn test_one_creation_per_update_line() {
        let plan = plan_toplevel_submission(&payload(json!({
            "blob_suffix": "-x",
            "update_line": {
                "-a": {"for": {"versions": ["<99.0"]}},
                "-b": {"for": {}},
            },
        })))
        .unwrap();

        let suffixes: Vec<&str> = plan.creations.iter().map(|c| c.suffix.as_str()).collect();
        assert_eq!(suffixes, vec!["-x-a", "-x-b"]);
        assert_eq!(
            plan.creations[0].update_line,
            Some(json!({"for": {"versions": ["<99.0"]}}))
        );
        assert_eq!(plan.push.suffix, "-x");
    }

    #[test]
    fn test_no_partials_without_partial_versions() {
        let plan = plan_toplevel_submission(&payload(json!({}))).unwrap();
        assert!(plan.creations[0].partial_updates.is_empty());
    }

    #[test]
    fn test_malformed_partials_fail_before_any_request() {
        let err = plan_toplevel_submission(&payload(json!({"partial_versions": "99.0"}))).unwrap_err();
        assert!(matches!(err, Error::PartialVersionFormat(_)));
    }
}
