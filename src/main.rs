use anyhow::{Context, Result};
use chrono::Utc;
use relay::cli::output::*;
use relay::cli::{Cli, Command};
use relay::core::config::{ProjectConfig, DEFAULT_CONFIG_FILE};
use relay::core::{PackageManifest, Pipeline};
use relay::execution::{CommandRunner, DryRunRunner, ExecutionEngine, ProcessRunner};
use relay::tasks::{self, SelfInvocation};
use relay::watch::{PipelineTrigger, WatchRule, WatchTrigger};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

type Engine = ExecutionEngine<Arc<dyn CommandRunner>>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    let config = load_config(&cli.config)?;
    let relay = SelfInvocation::current(cli.config.clone())?;

    let runner: Arc<dyn CommandRunner> = if cli.dry_run {
        Arc::new(DryRunRunner)
    } else {
        Arc::new(ProcessRunner::new())
    };
    let mut engine = ExecutionEngine::new(runner);
    let verbose = cli.verbose;
    engine.add_event_handler(move |event| {
        if let Some(line) = format_execution_event(event, verbose) {
            println!("{}", line);
        }
    });
    let engine = Arc::new(engine);

    let code = match cli.command() {
        Command::Bundle => {
            bundle(&config, &engine, cli.dry_run).await?;
            0
        }
        Command::UpdateVersionReferences => {
            update_version_references(&config, cli.dry_run)?;
            0
        }
        Command::Release => {
            let manifest = load_manifest(&config)?;
            println!(
                "{} Releasing {} {}",
                INFO,
                style(&manifest.name).bold(),
                style(manifest.tag()).cyan()
            );
            let pipeline = tasks::release_pipeline(&config, &manifest, &relay, Utc::now())?;
            run_pipeline(&engine, &pipeline).await
        }
        Command::Watch | Command::RunAll => watch(engine, &config, &relay).await?,
        command => {
            let task = command
                .task()
                .context("Command does not name a task")?;
            let pipeline = tasks::task_pipeline(task, &config, &relay)?;
            run_pipeline(&engine, &pipeline).await
        }
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Load the project configuration, falling back to defaults only when the
/// default file is absent
fn load_config(path: &Path) -> Result<ProjectConfig> {
    if !path.exists() && path == Path::new(DEFAULT_CONFIG_FILE) {
        warn!("{} not found, using default configuration", path.display());
        return Ok(ProjectConfig::default());
    }
    ProjectConfig::from_file(path).context("Failed to load project config")
}

fn load_manifest(config: &ProjectConfig) -> Result<PackageManifest> {
    PackageManifest::from_file(&config.manifest).context("Failed to load package manifest")
}

async fn run_pipeline(engine: &Engine, pipeline: &Pipeline) -> i32 {
    let run = engine.execute(pipeline).await;
    if let Some(failure) = &run.failure {
        println!("{} {}", CROSS, style(failure).red());
    }
    run.exit_code()
}

async fn bundle(config: &ProjectConfig, engine: &Engine, dry_run: bool) -> Result<()> {
    let manifest = load_manifest(config)?;
    if dry_run {
        info!(
            "[dry-run] would bundle {} source(s) into {}",
            config.bundle.sources.len(),
            config.bundle.output.display()
        );
        return Ok(());
    }

    let output = tasks::build_bundle(&config.bundle, &manifest, engine.executor()).await?;
    println!(
        "{} Bundled {} {}",
        CHECK,
        style(manifest.tag()).cyan(),
        style(output.display()).bold()
    );
    Ok(())
}

fn update_version_references(config: &ProjectConfig, dry_run: bool) -> Result<()> {
    let manifest = load_manifest(config)?;
    if dry_run {
        info!(
            "[dry-run] would update version references in {} to {}",
            config.docs.file.display(),
            manifest.tag()
        );
        return Ok(());
    }

    if tasks::update_version_references(&config.docs, &manifest.version)? {
        println!(
            "{} {} now references {}",
            CHECK,
            style(config.docs.file.display()).bold(),
            style(manifest.tag()).cyan()
        );
    } else {
        println!(
            "{} {} already up to date",
            INFO,
            style(config.docs.file.display()).bold()
        );
    }
    Ok(())
}

/// Run the watch pipeline once, then again on every matching change
///
/// The observer is live before the first run starts, so saves made during
/// it queue a follow-up run.
async fn watch(engine: Arc<Engine>, config: &ProjectConfig, relay: &SelfInvocation) -> Result<i32> {
    let pipeline = tasks::watch_pipeline(config, relay)?;

    let root = std::env::current_dir().context("Cannot determine the project root")?;
    let trigger =
        WatchTrigger::new(root, WatchRule::from_config(&config.watch)).with_initial_run();
    let stages = pipeline.stage_names();
    println!(
        "\n{} Watching {} (runs {}; Ctrl-C to stop)",
        EYES,
        style(trigger.rule().patterns.join(", ")).cyan(),
        style(stages.join(" -> ")).bold()
    );

    let handler = Arc::new(PipelineTrigger::new(engine, pipeline));
    tokio::select! {
        summary = trigger.watch(handler) => {
            summary?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            println!("\n{} Stopped watching", INFO);
        }
    }
    Ok(0)
}
