//! CLI output formatting

use crate::{core::ExecutionStatus, execution::ExecutionEvent};
use console::Emoji;
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");
pub static EYES: Emoji<'_, '_> = Emoji("👀 ", "* ");

/// Horizontal rule spanning the terminal width (80 columns when unknown)
pub fn separator() -> String {
    let width = term_size::dimensions_stdout()
        .map(|(w, _)| w)
        .unwrap_or(80);
    "─".repeat(width)
}

/// Format an execution status for display
pub fn format_status(status: ExecutionStatus) -> String {
    match status {
        ExecutionStatus::Running => style("RUNNING").yellow().to_string(),
        ExecutionStatus::Completed => style("COMPLETED").green().to_string(),
        ExecutionStatus::Failed => style("FAILED").red().to_string(),
    }
}

/// Format an execution event for display
///
/// Returns `None` for events that are only interesting in the logs.
pub fn format_execution_event(event: &ExecutionEvent, verbose: bool) -> Option<String> {
    let line = match event {
        ExecutionEvent::PipelineStarted {
            execution_id,
            pipeline_name,
            total_stages,
        } => format!(
            "{} Starting {} ({} stages, {})",
            ROCKET,
            style(pipeline_name).bold(),
            total_stages,
            style(&execution_id.to_string()[..8]).dim()
        ),
        ExecutionEvent::StageStarted {
            label,
            position,
            total,
            ..
        } => format!(
            "\n{}\n[{}/{}] {}...",
            style(separator()).dim(),
            style(position).cyan(),
            style(total).dim(),
            style(label).bold()
        ),
        ExecutionEvent::CommandStarted { command, .. } => {
            if !verbose {
                return None;
            }
            format!("  {} {}", style("$").dim(), style(command).dim())
        }
        ExecutionEvent::CommandTolerated { command, code, .. } => format!(
            "{} {} exited with {} (ignored)",
            WARN,
            style(command).yellow(),
            code.map_or_else(|| "a signal".to_string(), |c| format!("status {}", c))
        ),
        ExecutionEvent::StageCompleted { stage } => {
            format!("{} {}", CHECK, style(stage).green())
        }
        ExecutionEvent::StageFailed {
            stage,
            command_index,
            error,
        } => format!(
            "{} {} (command #{}): {}",
            CROSS,
            style(stage).red(),
            command_index,
            style(error).dim()
        ),
        ExecutionEvent::PipelineCompleted {
            pipeline_name,
            status,
            elapsed,
            ..
        } => match status {
            ExecutionStatus::Completed => format!(
                "\n{} {} completed {} {}",
                CHECK,
                style(pipeline_name).bold(),
                style("successfully").green(),
                style(format_duration(*elapsed)).dim()
            ),
            other => format!(
                "\n{} {} {} {}",
                CROSS,
                style(pipeline_name).bold(),
                format_status(*other),
                style(format_duration(*elapsed)).dim()
            ),
        },
    };
    Some(line)
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
