//! The release pipeline
//!
//! Stage order matters: the bundle commit and tag must exist on the
//! development branch before the main branch is fast-forwarded to it, and
//! the package is published only once both branches are pushed.

use crate::{
    core::{config::ProjectConfig, Command, PackageManifest, Pipeline, Stage},
    tasks::{SelfInvocation, TaskName},
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Component, Path};

pub const SYNC_REPOSITORY: &str = "sync-repository";
pub const BUMP_VERSION_AND_BUNDLE: &str = "bump-version-and-bundle";
pub const GENERATE_AND_PUBLISH_REPORTS: &str = "generate-and-publish-reports";
pub const MERGE_TO_MAIN_BRANCH: &str = "fast-forward-merge-to-main-branch";
pub const PUSH_DEVELOPMENT_BRANCH: &str = "push-development-branch";
pub const PUBLISH_PACKAGE: &str = "publish-package";

/// Build the release pipeline for the manifest's current version
pub fn release_pipeline(
    config: &ProjectConfig,
    manifest: &PackageManifest,
    relay: &SelfInvocation,
    now: DateTime<Utc>,
) -> Result<Pipeline> {
    let release = &config.release;
    let remote = release.remote.as_str();
    let dev = release.development_branch.as_str();
    let main = release.main_branch.as_str();
    let tag = manifest.tag();

    let sync = Stage::new(SYNC_REPOSITORY)
        .with_label("Sync repository")
        .command(git(["pull", remote, dev, "--force"]));

    let commit_message = release
        .commit_message
        .replace("{version}", &manifest.version.to_string());
    let bump = Stage::new(BUMP_VERSION_AND_BUNDLE)
        .with_label(format!("Create new version {}", tag))
        .command(relay.command(TaskName::UpdateVersionReferences))
        .command(relay.command(TaskName::Bundle))
        .command(git(["add", "."]))
        .command(git(["commit", "-m", commit_message.as_str()]))
        .command(git(["tag", "-f", tag.as_str()]));

    let mut reports = Stage::new(GENERATE_AND_PUBLISH_REPORTS)
        .with_label("Generate reports")
        .command(relay.command(TaskName::Report));
    if let Some(target) = &release.reports {
        let workdir = target.workdir.as_path();
        let workdir_arg = workdir
            .to_str()
            .context("Reports workdir must be valid UTF-8")?;
        let root = path_to_root(workdir)?;
        let copy = Command::new("cp")
            .arg("-R")
            .args(target.artifacts.iter().map(|a| format!("{}/{}", root, a)))
            .arg("./")
            .current_dir(workdir);
        let message = format!("Update reports at {}", now.to_rfc2822());

        reports = reports
            .command(Command::new("rm").args(["-rf", workdir_arg]))
            .command(Command::new("mkdir").args(["-p", workdir_arg]))
            .command(git(["clone", target.repository.as_str(), "./"]).current_dir(workdir))
            .command(copy)
            .command(git(["add", "-A"]).current_dir(workdir))
            .command(git(["commit", "-m", message.as_str()]).current_dir(workdir))
            .command(git(["push", remote, target.branch.as_str()]).current_dir(workdir))
            .command(Command::new("rm").args(["-rf", workdir_arg]));
    }

    let merge = Stage::new(MERGE_TO_MAIN_BRANCH)
        .with_label(format!("Update {} branch", main))
        .command(git(["checkout", main]))
        .command(git(["merge", "--ff-only", dev]))
        .command(git(["push", remote, main, "--tags"]));

    let push_dev = Stage::new(PUSH_DEVELOPMENT_BRANCH)
        .with_label(format!("Update {} branch", dev))
        .command(git(["checkout", dev]))
        .command(git(["push", remote, dev, "--tags"]));

    let publish = Stage::new(PUBLISH_PACKAGE)
        .with_label("Publish package")
        .commands(
            release
                .publish
                .to_commands()
                .context("Invalid release.publish")?,
        );

    Ok(Pipeline::new("release")
        .stage(sync)
        .stage(bump)
        .stage(reports)
        .stage(merge)
        .stage(push_dev)
        .stage(publish))
}

/// Relative path from `workdir` back to the project root (`build/reports` -> `../..`)
fn path_to_root(workdir: &Path) -> Result<String> {
    let mut hops = Vec::new();
    for component in workdir.components() {
        match component {
            Component::Normal(_) => hops.push(".."),
            Component::CurDir => {}
            _ => anyhow::bail!(
                "Reports workdir {} must be a relative path inside the project",
                workdir.display()
            ),
        }
    }
    if hops.is_empty() {
        anyhow::bail!("Reports workdir must not be the project root");
    }
    Ok(hops.join("/"))
}

fn git<'a>(args: impl IntoIterator<Item = &'a str>) -> Command {
    Command::new("git").args(args)
}
