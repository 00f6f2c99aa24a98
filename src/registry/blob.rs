//! Release names and blob bodies sent to the registry

use crate::types::{LocaleSubmission, MarInfo, ReleaseCreation};
use serde_json::{Map, Value, json};

/// Name of a versioned release blob
pub fn release_name(product: &str, version: &str, build_number: u64, suffix: &str, dummy: bool) -> String {
    let mut name = format!("{product}-{version}-build{build_number}{suffix}");
    if dummy {
        name.push_str("-dummy");
    }
    name
}

/// Name of a nightly blob; `build_id` is either a build ID or `latest`
pub fn nightly_name(product: &str, branch: &str, build_id: &str, suffix: &str, dummy: bool) -> String {
    let mut name = format!("{product}-{branch}-nightly-{build_id}{suffix}");
    if dummy {
        name.push_str("-dummy");
    }
    name
}

fn apply_replacements(url: &str, replacements: &[(String, String)]) -> String {
    replacements
        .iter()
        .fold(url.to_string(), |acc, (from, to)| acc.replace(from.as_str(), to.as_str()))
}

fn mar_entry(from: String, info: &MarInfo, file_url: Option<String>) -> Value {
    let mut entry = json!({
        "from": from,
        "filesize": info.size,
        "hashValue": info.hash,
    });
    if let Some(url) = file_url {
        entry["fileUrl"] = Value::String(url);
    }
    entry
}

/// Blob body for a single platform/locale build
pub fn locale_blob(request: &LocaleSubmission) -> Value {
    match request {
        LocaleSubmission::Release(r) => {
            let completes: Vec<Value> = r
                .complete_info
                .iter()
                .map(|info| mar_entry("*".to_string(), info, None))
                .collect();
            let partials: Vec<Value> = r
                .partial_info
                .iter()
                .flatten()
                .filter_map(|info| {
                    let version = info.previous_version.as_deref()?;
                    let build = info.previous_build_number.as_deref()?;
                    Some(mar_entry(
                        format!("{}-{version}-build{build}", r.product_name),
                        info,
                        None,
                    ))
                })
                .collect();

            let mut blob = json!({
                "buildID": r.build_id,
                "appVersion": r.app_version,
                "displayVersion": r.version,
                "platformVersion": r.ext_version,
                "completes": completes,
            });
            if !partials.is_empty() {
                blob["partials"] = Value::Array(partials);
            }
            blob
        }
        LocaleSubmission::Nightly(n) => {
            let file_url = |info: &MarInfo| {
                info.url
                    .as_deref()
                    .map(|url| apply_replacements(url, &n.url_replacements))
            };
            let completes: Vec<Value> = n
                .complete_info
                .iter()
                .map(|info| mar_entry("*".to_string(), info, file_url(info)))
                .collect();
            let partials: Vec<Value> = n
                .partial_info
                .iter()
                .flatten()
                .filter_map(|info| {
                    let from = info.from_build_id.as_deref()?;
                    Some(mar_entry(
                        nightly_name(&n.product_name, &n.branch, from, "", false),
                        info,
                        file_url(info),
                    ))
                })
                .collect();

            let mut blob = json!({
                "buildID": n.build_id,
                "appVersion": n.app_version,
                "displayVersion": n.app_version,
                "platformVersion": n.ext_version,
                "completes": completes,
            });
            if !partials.is_empty() {
                blob["partials"] = Value::Array(partials);
            }
            blob
        }
    }
}

const LOCALTEST_SUFFIX: &str = "-localtest";

/// Bouncer product suffix for releases served straight from the CDN
const NO_MIRRORS_SUFFIX: &str = "-ssl";

fn fill_pattern(pattern: &str, product: &str, version: &str) -> String {
    pattern.replace("{product}", product).replace("{version}", version)
}

/// Top-level release blob with per-channel download locations
pub fn toplevel_blob(request: &ReleaseCreation, name: &str) -> Value {
    let product = request.product_name.to_lowercase();
    let version = &request.version;
    let build = request.build_number;

    let complete_filename = request.complete_mar_filename_pattern.as_deref().map_or_else(
        || format!("{product}-{version}.complete.mar"),
        |p| fill_pattern(p, &product, version),
    );
    let complete_bouncer_product = request
        .complete_mar_bouncer_product_pattern
        .as_deref()
        .map_or_else(
            || format!("{product}-{version}-complete"),
            |p| fill_pattern(p, &product, version),
        );

    let localtest_base = format!(
        "https://{}/pub/{product}/candidates/{version}-candidates/build{build}/update/%OS_FTP%/%LOCALE%",
        request.ftp_server
    );
    let mirrors = if request.requires_mirrors { "" } else { NO_MIRRORS_SUFFIX };
    let bouncer_base = format!(
        "https://{}/?os=%OS_BOUNCER%&lang=%LOCALE%",
        request.bouncer_server
    );

    let mut file_urls = Map::new();
    for channel in &request.update_channels {
        let localtest = channel.ends_with(LOCALTEST_SUFFIX);
        let complete_url = if localtest {
            format!("{localtest_base}/{complete_filename}")
        } else {
            format!("{bouncer_base}&product={complete_bouncer_product}{mirrors}")
        };

        let partials: Map<String, Value> = request
            .partial_updates
            .iter()
            .map(|(from_version, partial)| {
                let url = if localtest {
                    format!("{localtest_base}/{product}-{from_version}-{version}.partial.mar")
                } else {
                    format!("{bouncer_base}&product={product}-{version}-partial-{from_version}{mirrors}")
                };
                (
                    format!("{}-{from_version}-build{}", request.product_name, partial.build_number),
                    Value::String(url),
                )
            })
            .collect();

        file_urls.insert(
            channel.clone(),
            json!({ "completes": { "*": complete_url }, "partials": partials }),
        );
    }

    let mut blob = json!({
        "name": name,
        "schema_version": 9,
        "hashFunction": request.hash_function,
        "appVersion": request.app_version,
        "displayVersion": version,
        "fileUrls": file_urls,
    });
    if let Some(update_line) = &request.update_line {
        blob["updateLine"] = update_line.clone();
    }
    blob
}
