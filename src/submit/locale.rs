//! Locale submission requests built from manifest entries

use crate::error::{Error, Result};
use crate::types::{
    LocaleSubmission, ManifestEntry, MarInfo, NightlyLocaleRequest, ReleaseLocaleRequest,
    SubmissionStyle,
};

fn entry_label(entry: &ManifestEntry) -> String {
    format!("{}/{}", entry.platform, entry.locale)
}

fn require<T: Clone>(value: Option<&T>, field: &str, entry: &ManifestEntry) -> Result<T> {
    value.cloned().ok_or_else(|| {
        Error::Configuration(format!(
            "manifest entry {} is missing {field}",
            entry_label(entry)
        ))
    })
}

/// Style of a manifest entry, from its `tc_release` / `tc_nightly` marker
pub fn submission_style(entry: &ManifestEntry) -> Result<SubmissionStyle> {
    match (entry.tc_release.is_some(), entry.tc_nightly.is_some()) {
        (true, false) => Ok(SubmissionStyle::Release),
        (false, true) => Ok(SubmissionStyle::Nightly),
        (true, true) => Err(Error::UnknownSubmissionStyle(format!(
            "{} carries both tc_release and tc_nightly",
            entry_label(entry)
        ))),
        (false, false) => Err(Error::UnknownSubmissionStyle(format!(
            "{} carries neither tc_release nor tc_nightly",
            entry_label(entry)
        ))),
    }
}

fn check_partials(
    entry: &ManifestEntry,
    has_source: impl Fn(&MarInfo) -> bool,
    needs: &str,
) -> Result<()> {
    match entry.partial_info.iter().flatten().find(|info| !has_source(info)) {
        Some(info) => Err(Error::Configuration(format!(
            "partial MAR {} for {} is missing {needs}",
            info.hash,
            entry_label(entry)
        ))),
        None => Ok(()),
    }
}

/// Build the submission for one manifest entry under `extra_suffix`
pub fn build_locale_submission(entry: &ManifestEntry, extra_suffix: &str) -> Result<LocaleSubmission> {
    match submission_style(entry)? {
        SubmissionStyle::Release => {
            check_partials(
                entry,
                |info| info.previous_version.is_some() && info.previous_build_number.is_some(),
                "previousVersion/previousBuildNumber",
            )?;
            let suffix = format!(
                "{}{extra_suffix}",
                entry.blob_suffix.as_deref().unwrap_or_default()
            );

            Ok(LocaleSubmission::Release(ReleaseLocaleRequest {
                suffix,
                platform: entry.platform.clone(),
                product_name: entry.app_name.clone(),
                app_version: entry.app_version.clone(),
                version: require(entry.version.as_ref(), "version", entry)?,
                build_number: require(entry.build_number.as_ref(), "build_number", entry)?,
                locale: entry.locale.clone(),
                hash_function: entry.hash_type.clone(),
                ext_version: entry.ext_version.clone(),
                build_id: entry.build_id.clone(),
                complete_info: entry.complete_info.clone(),
                partial_info: entry.partial_info.clone(),
            }))
        }
        SubmissionStyle::Nightly => {
            check_partials(entry, |info| info.from_build_id.is_some(), "from_buildid")?;

            Ok(LocaleSubmission::Nightly(NightlyLocaleRequest {
                url_replacements: entry.url_replacements.clone(),
                platform: entry.platform.clone(),
                build_id: entry.build_id.clone(),
                product_name: entry.app_name.clone(),
                branch: require(entry.branch.as_ref(), "branch", entry)?,
                app_version: entry.app_version.clone(),
                locale: entry.locale.clone(),
                hash_function: entry.hash_type.clone(),
                ext_version: entry.ext_version.clone(),
                complete_info: entry.complete_info.clone(),
                partial_info: entry.partial_info.clone(),
            }))
        }
    }
}

/// Build every submission for `entries` x `suffixes`, in manifest then suffix order.
///
/// All entries are validated before anything is returned, so a malformed entry
/// stops the run before the first remote call.
pub fn plan_locale_submissions(
    entries: &[ManifestEntry],
    suffixes: &[String],
) -> Result<Vec<LocaleSubmission>> {
    entries
        .iter()
        .flat_map(|entry| {
            suffixes
                .iter()
                .map(move |suffix| build_locale_submission(entry, suffix))
        })
        .collect()
}
