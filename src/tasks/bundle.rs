//! Bundle task - concatenate, optionally minify, then stamp the banner

use crate::{
    core::{config::BundleConfig, PackageManifest, Stage},
    execution::{CommandRunner, StageExecutor},
    tasks::banner::{inject_banner, render_banner},
};
use anyhow::{Context, Result};
use chrono::Utc;
use std::path::PathBuf;
use tracing::info;

/// Build the distributable bundle and return its path
///
/// The minifier runs as an ordinary stage on the concatenated file, so the
/// banner is added afterwards and survives minification.
pub async fn build_bundle<R: CommandRunner>(
    config: &BundleConfig,
    manifest: &PackageManifest,
    executor: &StageExecutor<R>,
) -> Result<PathBuf> {
    let mut combined = String::new();
    for source in &config.sources {
        let content = tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("Failed to read bundle source {}", source.display()))?;
        if !combined.is_empty() {
            combined.push('\n');
        }
        combined.push_str(&content);
    }

    if let Some(parent) = config.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    write(&config.output, &combined).await?;
    info!(
        "Concatenated {} source(s) into {}",
        config.sources.len(),
        config.output.display()
    );

    if let Some(minify) = &config.minify {
        let stage = Stage::new("minify")
            .with_label("Minify bundle")
            .commands(minify.to_commands()?);
        executor.execute(&stage).await?;
    }

    let body = tokio::fs::read_to_string(&config.output)
        .await
        .with_context(|| format!("Failed to read {}", config.output.display()))?;
    let banner = render_banner(manifest, Utc::now());
    write(&config.output, &inject_banner(&banner, &body)).await?;

    info!("Bundle written to {}", config.output.display());
    Ok(config.output.clone())
}

async fn write(path: &std::path::Path, content: &str) -> Result<()> {
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}
