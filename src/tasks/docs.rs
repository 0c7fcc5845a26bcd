//! Keeps versioned URLs in the documentation in step with the package version

use crate::core::config::DocsConfig;
use anyhow::{Context, Result};
use regex::{NoExpand, Regex};
use semver::Version;
use std::sync::LazyLock;
use tracing::{debug, info};

/// A `/v1.2.3/` path segment
static VERSION_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/v[\d.]+/").expect("version segment pattern is valid"));

/// Rewrite the first `/v<digits and dots>/` segment of each eligible line
///
/// A line is eligible when it contains `marker`, or always when no marker is
/// given. Every other byte, line endings included, is left untouched.
pub fn rewrite_version_references(content: &str, version: &Version, marker: Option<&str>) -> String {
    let replacement = format!("/v{}/", version);

    content
        .split('\n')
        .map(|line| {
            let eligible = marker.map_or(true, |m| line.contains(m));
            if eligible {
                VERSION_SEGMENT.replace(line, NoExpand(&replacement))
            } else {
                line.into()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Apply the rewrite to the configured documentation file
///
/// Returns whether the file changed; an unchanged file is not rewritten.
pub fn update_version_references(docs: &DocsConfig, version: &Version) -> Result<bool> {
    let content = std::fs::read_to_string(&docs.file)
        .with_context(|| format!("Failed to read {}", docs.file.display()))?;

    let updated = rewrite_version_references(&content, version, docs.url_marker.as_deref());
    if updated == content {
        debug!("{} already references v{}", docs.file.display(), version);
        return Ok(false);
    }

    std::fs::write(&docs.file, updated)
        .with_context(|| format!("Failed to write {}", docs.file.display()))?;
    info!("Updated version references in {} to v{}", docs.file.display(), version);
    Ok(true)
}
