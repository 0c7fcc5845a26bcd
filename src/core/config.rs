//! Project configuration from YAML

use crate::core::{Command, CommandParseError};
use crate::tasks::TaskName;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "relay.yaml";

/// Top-level project configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProjectConfig {
    /// Path to the package manifest holding name/version/license
    pub manifest: PathBuf,

    /// External commands behind the lint/test/report tasks
    pub tasks: TasksConfig,

    /// Bundle task settings
    pub bundle: BundleConfig,

    /// Documentation file whose versioned URLs track the release
    pub docs: DocsConfig,

    /// Development watch loop
    pub watch: WatchConfig,

    /// Release sequence
    pub release: ReleaseConfig,
}

/// One command, either as a shell-like line or with extra options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CommandSpec {
    Line(String),
    Detailed {
        run: String,
        #[serde(default)]
        cwd: Option<PathBuf>,
        #[serde(default)]
        allow_failure: bool,
    },
}

impl CommandSpec {
    pub fn to_command(&self) -> Result<Command, CommandParseError> {
        match self {
            CommandSpec::Line(line) => Command::parse(line),
            CommandSpec::Detailed {
                run,
                cwd,
                allow_failure,
            } => {
                let mut command = Command::parse(run)?.allow_failure(*allow_failure);
                if let Some(cwd) = cwd {
                    command = command.current_dir(cwd);
                }
                Ok(command)
            }
        }
    }
}

/// A task body: one command or an ordered list of them
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum TaskSpec {
    Single(CommandSpec),
    Sequence(Vec<CommandSpec>),
}

impl TaskSpec {
    pub fn line(line: &str) -> Self {
        TaskSpec::Single(CommandSpec::Line(line.to_string()))
    }

    pub fn to_commands(&self) -> Result<Vec<Command>, CommandParseError> {
        match self {
            TaskSpec::Single(spec) => Ok(vec![spec.to_command()?]),
            TaskSpec::Sequence(specs) => specs.iter().map(CommandSpec::to_command).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TasksConfig {
    pub lint: TaskSpec,
    pub test: TaskSpec,
    pub report: TaskSpec,
}

impl TasksConfig {
    /// External commands behind `task`; `None` for tasks built into relay
    pub fn spec(&self, task: TaskName) -> Option<&TaskSpec> {
        match task {
            TaskName::Lint => Some(&self.lint),
            TaskName::Test => Some(&self.test),
            TaskName::Report => Some(&self.report),
            TaskName::Bundle | TaskName::UpdateVersionReferences => None,
        }
    }
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            lint: TaskSpec::line("npm run lint"),
            test: TaskSpec::line("npm test"),
            report: TaskSpec::line("npm run report"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BundleConfig {
    /// Source files concatenated into the bundle, in order
    pub sources: Vec<PathBuf>,

    /// Distributable output file
    pub output: PathBuf,

    /// Optional minifier, run on the concatenated output before the banner
    pub minify: Option<TaskSpec>,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            sources: vec![PathBuf::from("src/index.js")],
            output: PathBuf::from("dist/bundle.min.js"),
            minify: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DocsConfig {
    pub file: PathBuf,

    /// Only lines containing this text are rewritten; all lines when unset
    pub url_marker: Option<String>,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("README.md"),
            url_marker: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WatchConfig {
    /// Glob patterns, relative to the project root
    pub patterns: Vec<String>,

    /// Tasks re-run on every matching change, in order
    pub stages: Vec<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            patterns: vec!["src/**/*".to_string(), "test/**/*".to_string()],
            stages: vec!["test".to_string(), "lint".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReleaseConfig {
    pub remote: String,
    pub development_branch: String,
    pub main_branch: String,

    /// Commit message for the bundle commit; `{version}` is substituted
    pub commit_message: String,

    /// Where generated reports are published (skipped when unset)
    pub reports: Option<ReportsConfig>,

    /// Package registry publish command
    pub publish: TaskSpec,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            development_branch: "dev".to_string(),
            main_branch: "main".to_string(),
            commit_message: "Release {version}".to_string(),
            reports: None,
            publish: TaskSpec::line("npm publish"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportsConfig {
    /// Repository the reports are pushed to
    pub repository: String,

    #[serde(default = "default_reports_branch")]
    pub branch: String,

    /// Directories copied into the reports checkout
    #[serde(default = "default_report_artifacts")]
    pub artifacts: Vec<String>,

    /// Scratch checkout directory, removed before and after publishing
    #[serde(default = "default_reports_workdir")]
    pub workdir: PathBuf,
}

fn default_reports_branch() -> String {
    "gh-pages".to_string()
}

fn default_report_artifacts() -> Vec<String> {
    vec!["coverage".to_string(), "plato".to_string()]
}

fn default_reports_workdir() -> PathBuf {
    PathBuf::from(".tmp")
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from("package.json"),
            tasks: TasksConfig::default(),
            bundle: BundleConfig::default(),
            docs: DocsConfig::default(),
            watch: WatchConfig::default(),
            release: ReleaseConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Load project configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse project configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // serde_yaml rejects an empty document, but an empty file means "all defaults"
        let config: ProjectConfig = if yaml.trim().is_empty() {
            ProjectConfig::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the project configuration
    pub fn validate(&self) -> Result<()> {
        let tasks = [
            ("tasks.lint", &self.tasks.lint),
            ("tasks.test", &self.tasks.test),
            ("tasks.report", &self.tasks.report),
            ("release.publish", &self.release.publish),
        ];
        for (key, spec) in tasks {
            let commands = spec.to_commands().with_context(|| format!("Invalid {}", key))?;
            if commands.is_empty() {
                anyhow::bail!("'{}' must contain at least one command", key);
            }
        }

        if let Some(minify) = &self.bundle.minify {
            minify.to_commands().context("Invalid bundle.minify")?;
        }

        if self.bundle.sources.is_empty() {
            anyhow::bail!("'bundle.sources' must list at least one file");
        }

        if self.watch.patterns.is_empty() {
            anyhow::bail!("'watch.patterns' must list at least one glob pattern");
        }
        if self.watch.stages.is_empty() {
            anyhow::bail!("'watch.stages' must list at least one task");
        }
        for stage in &self.watch.stages {
            stage
                .parse::<TaskName>()
                .map_err(|e| anyhow::anyhow!("Invalid watch stage: {}", e))?;
        }

        let release = &self.release;
        for (key, value) in [
            ("release.remote", &release.remote),
            ("release.development_branch", &release.development_branch),
            ("release.main_branch", &release.main_branch),
        ] {
            if value.trim().is_empty() {
                anyhow::bail!("'{}' must not be empty", key);
            }
        }
        if release.development_branch == release.main_branch {
            anyhow::bail!(
                "Development and main branch are both '{}'",
                release.main_branch
            );
        }

        if let Some(reports) = &release.reports {
            if reports.artifacts.is_empty() {
                anyhow::bail!("'release.reports.artifacts' must list at least one directory");
            }
            let workdir = &reports.workdir;
            if workdir.is_absolute()
                || workdir.components().any(|c| matches!(c, Component::ParentDir))
            {
                anyhow::bail!(
                    "'release.reports.workdir' must be a relative path inside the project, got {}",
                    workdir.display()
                );
            }
            if !workdir.components().any(|c| matches!(c, Component::Normal(_))) {
                anyhow::bail!("'release.reports.workdir' must be a dedicated directory");
            }
        }

        Ok(())
    }

    /// Watch stages as task names (valid after `validate`)
    pub fn watch_tasks(&self) -> Vec<TaskName> {
        self.watch
            .stages
            .iter()
            .filter_map(|stage| stage.parse().ok())
            .collect()
    }
}
