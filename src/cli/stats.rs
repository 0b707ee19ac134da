//! flow stats command implementation.

use std::path::PathBuf;

use chrono::Local;

use crate::cli::load_context;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::view::{self, TaskStats};

pub struct StatsOptions {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct StatsOutput {
    stats: TaskStats,
    overdue: usize,
}

pub async fn run(options: StatsOptions) -> Result<()> {
    let ctx = load_context(options.config, options.data_dir)?;
    let tasks = ctx.tasks.get_all().await?;

    let stats = view::compute_stats(&tasks);
    let today = Local::now().date_naive();
    let overdue = tasks
        .iter()
        .filter(|task| view::is_overdue_on(task, today))
        .count();

    let mut human = HumanOutput::new("Task statistics");
    human.push_summary("Total", stats.total.to_string());
    human.push_summary("Completed", stats.completed.to_string());
    human.push_summary("Pending", stats.pending.to_string());
    human.push_summary("Completion", format!("{}%", stats.completion_rate));
    human.push_summary("High priority pending", stats.high_priority_pending.to_string());
    human.push_summary("Overdue", overdue.to_string());
    if stats.high_priority_pending > 0 {
        human.push_next_step("flow task list --status pending --priority high".to_string());
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "stats",
        &StatsOutput { stats, overdue },
        Some(&human),
    )
}
