//! Partial update version list parsing

use crate::error::{Error, Result};
use crate::types::{PartialUpdate, PartialUpdates};

const BUILD_SEPARATOR: &str = "build";

/// Parse a comma-separated `<version>build<N>` list, e.g. `"56.0build1, 57.0build2"`.
///
/// Empty input yields no partials. A token must contain `build` exactly once;
/// the halves around it are trimmed and kept even when empty.
pub fn parse_partial_versions(raw: &str) -> Result<PartialUpdates> {
    let mut partials = PartialUpdates::new();
    if raw.is_empty() {
        return Ok(partials);
    }

    for token in raw.split(',') {
        let token = token.trim();
        let mut parts = token.split(BUILD_SEPARATOR);
        let (Some(version), Some(build_number), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::PartialVersionFormat(token.to_string()));
        };

        partials.insert(
            version.trim().to_string(),
            PartialUpdate {
                build_number: build_number.trim().to_string(),
            },
        );
    }

    Ok(partials)
}
