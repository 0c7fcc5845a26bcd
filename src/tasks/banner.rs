//! Header comment prepended to the distributable bundle

use crate::core::PackageManifest;
use chrono::{DateTime, Utc};

/// Render the bundle banner for `manifest`, stamped with `generated_at`
pub fn render_banner(manifest: &PackageManifest, generated_at: DateTime<Utc>) -> String {
    let mut copyright = manifest.license.clone();
    if !manifest.author.is_empty() {
        copyright.push_str(&format!(" (c) {}", manifest.author));
    }

    [
        "/**!".to_string(),
        format!(" * {} - v{}", manifest.unscoped_name(), manifest.version),
        format!(" * {}", manifest.description),
        format!(" * {}", manifest.homepage),
        " *".to_string(),
        format!(" * {}", generated_at.to_rfc2822()),
        format!(" * {}", copyright),
        "*/".to_string(),
        String::new(),
    ]
    .join("\n")
}

/// Prepend the banner to bundle content
pub fn inject_banner(banner: &str, content: &str) -> String {
    let mut out = String::with_capacity(banner.len() + content.len());
    out.push_str(banner);
    out.push_str(content);
    out
}
