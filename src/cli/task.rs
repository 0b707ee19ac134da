//! flow task command implementations.

use std::path::PathBuf;

use chrono::Local;

use crate::cli::{load_context, reconcile_counts, AppContext};
use crate::dates;
use crate::error::{Error, Result};
use crate::generate::DescriptionClient;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::task::{NewTask, Task, TaskPatch, MAX_DESCRIPTION_LEN};
use crate::view::{self, TaskFilter};

pub struct AddOptions {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub due: Option<String>,
    pub describe: bool,
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ListOptions {
    pub status: String,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub limit: usize,
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ShowOptions {
    pub id: u32,
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct EditOptions {
    pub id: u32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub due: Option<String>,
    pub clear_due: bool,
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct DoneOptions {
    pub id: u32,
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct RmOptions {
    pub id: u32,
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ImportOptions {
    pub file: PathBuf,
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct TaskOutput {
    task: Task,
}

#[derive(serde::Serialize)]
struct TaskListOutput {
    total: usize,
    tasks: Vec<Task>,
}

#[derive(serde::Serialize)]
struct TaskDeleteOutput {
    id: u32,
}

pub async fn run_add(options: AddOptions) -> Result<()> {
    let ctx = load_context(options.config, options.data_dir)?;

    let mut data = NewTask {
        title: options.title,
        description: options.description,
        priority: options.priority.as_deref().map(str::parse).transpose()?,
        category: options.category,
        due_date: options.due.as_deref().map(dates::parse_due_date).transpose()?,
    };
    data.validate()?;

    let mut warnings = Vec::new();
    if options.describe && data.description.is_none() {
        // Best effort: neither a failed generation nor an unusable result
        // blocks task creation.
        match generate_description(&ctx, &data.title).await {
            Ok(description) if description.chars().count() <= MAX_DESCRIPTION_LEN => {
                data.description = Some(description);
            }
            Ok(_) => warnings.push(format!(
                "generated description exceeds {MAX_DESCRIPTION_LEN} characters; task created without one"
            )),
            Err(err) => warnings.push(format!("description generation failed: {err}")),
        }
    }

    let task = ctx.tasks.create(data).await?;
    if let Some(warning) = reconcile_counts(&ctx).await {
        warnings.push(warning);
    }

    let mut human = HumanOutput::new("Task created");
    for warning in &warnings {
        human.push_warning(warning.clone());
    }
    human.push_summary("ID", task.id.to_string());
    human.push_summary("Title", task.title.clone());
    human.push_summary("Priority", task.priority.to_string());
    human.push_summary("Category", task.category.clone());
    if let Some(due) = task.due_date {
        human.push_summary("Due", dates::format_due_date(due));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task add",
        &TaskOutput { task },
        Some(&human),
    )
}

async fn generate_description(ctx: &AppContext, title: &str) -> Result<String> {
    let endpoint = ctx.config.generator_endpoint()?;
    DescriptionClient::new(endpoint).generate(title).await
}

pub async fn run_list(options: ListOptions) -> Result<()> {
    let ctx = load_context(options.config, options.data_dir)?;
    if options.limit == 0 {
        return Err(Error::InvalidArgument("limit must be >= 1".to_string()));
    }

    let filter = TaskFilter {
        status: options.status.parse()?,
        priority: options.priority.as_deref().map(str::parse).transpose()?,
        category: options.category,
    };

    let all = ctx.tasks.get_all().await?;
    let mut tasks = view::filter_tasks(&all, &filter);
    view::sort_tasks(&mut tasks);
    // Total counts every match; the list below is capped at --limit.
    let total = tasks.len();
    if tasks.len() > options.limit {
        tasks.truncate(options.limit);
    }

    let today = Local::now().date_naive();
    let output = TaskListOutput {
        total,
        tasks: tasks.clone(),
    };

    let mut human = HumanOutput::new("Tasks");
    human.push_summary("Total", total.to_string());
    if tasks.len() < total {
        human.push_summary("Showing", tasks.len().to_string());
    }
    for task in &tasks {
        human.push_detail(format_task_line(task, today));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task list",
        &output,
        Some(&human),
    )
}

fn format_task_line(task: &Task, today: chrono::NaiveDate) -> String {
    let check = if task.completed { "x" } else { " " };
    let mut line = format!(
        "[{check}][{}] {} {} ({})",
        task.priority, task.id, task.title, task.category
    );
    if let Some(due) = task.due_date {
        line.push_str(&format!(" due {}", dates::format_due_date_on(due, today)));
        if view::is_overdue_on(task, today) {
            line.push_str(" OVERDUE");
        }
    }
    line
}

pub async fn run_show(options: ShowOptions) -> Result<()> {
    let ctx = load_context(options.config, options.data_dir)?;
    let task = ctx.tasks.get_by_id(options.id).await?;

    let mut human = HumanOutput::new(format!("Task {}", task.id));
    human.push_summary("Title", task.title.clone());
    if !task.description.is_empty() {
        human.push_summary("Description", task.description.clone());
    }
    human.push_summary("Priority", task.priority.to_string());
    human.push_summary("Category", task.category.clone());
    let status = if task.completed { "completed" } else { "pending" };
    human.push_summary("Status", status);
    human.push_summary("Created", task.created_at.to_rfc3339());
    if let Some(due) = task.due_date {
        human.push_summary("Due", dates::format_due_date(due));
        if view::is_overdue(&task) {
            human.push_warning("task is overdue".to_string());
        }
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task show",
        &TaskOutput { task },
        Some(&human),
    )
}

pub async fn run_edit(options: EditOptions) -> Result<()> {
    let ctx = load_context(options.config, options.data_dir)?;

    let due_date = match (options.due.as_deref(), options.clear_due) {
        (Some(due), _) => Some(Some(dates::parse_due_date(due)?)),
        (None, true) => Some(None),
        (None, false) => None,
    };
    let patch = TaskPatch {
        title: options.title,
        description: options.description,
        priority: options.priority.as_deref().map(str::parse).transpose()?,
        category: options.category,
        completed: None,
        due_date,
    };
    if patch.is_empty() {
        return Err(Error::InvalidArgument(
            "task edit requires at least one field to change".to_string(),
        ));
    }
    patch.validate()?;

    let category_changed = patch.category.is_some();
    let task = ctx.tasks.update(options.id, patch).await?;

    let mut human = HumanOutput::new("Task updated");
    if category_changed {
        if let Some(warning) = reconcile_counts(&ctx).await {
            human.push_warning(warning);
        }
    }
    human.push_summary("ID", task.id.to_string());
    human.push_summary("Title", task.title.clone());
    human.push_summary("Priority", task.priority.to_string());
    human.push_summary("Category", task.category.clone());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task edit",
        &TaskOutput { task },
        Some(&human),
    )
}

pub async fn run_done(options: DoneOptions) -> Result<()> {
    let ctx = load_context(options.config, options.data_dir)?;
    let task = ctx.tasks.toggle(options.id).await?;

    let header = if task.completed {
        "Task completed"
    } else {
        "Task reopened"
    };
    let mut human = HumanOutput::new(header);
    human.push_summary("ID", task.id.to_string());
    human.push_summary("Title", task.title.clone());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task done",
        &TaskOutput { task },
        Some(&human),
    )
}

pub async fn run_rm(options: RmOptions) -> Result<()> {
    let ctx = load_context(options.config, options.data_dir)?;
    ctx.tasks.delete(options.id).await?;

    let mut human = HumanOutput::new("Task deleted");
    if let Some(warning) = reconcile_counts(&ctx).await {
        human.push_warning(warning);
    }
    human.push_summary("ID", options.id.to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task rm",
        &TaskDeleteOutput { id: options.id },
        Some(&human),
    )
}

#[derive(serde::Serialize)]
struct TaskImportOutput {
    created: usize,
    failed: usize,
    tasks: Vec<Task>,
    failures: Vec<crate::service::BatchFailure>,
}

pub async fn run_import(options: ImportOptions) -> Result<()> {
    let ctx = load_context(options.config, options.data_dir)?;

    let contents = std::fs::read_to_string(&options.file)?;
    let records: Vec<NewTask> = serde_json::from_str(&contents)?;
    if records.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "no task records in {}",
            options.file.display()
        )));
    }
    for (index, record) in records.iter().enumerate() {
        record
            .validate()
            .map_err(|err| Error::Validation(format!("record {index}: {err}")))?;
    }

    let total = records.len();
    let outcome = ctx.tasks.create_many(records).await?;
    if outcome.succeeded.is_empty() {
        return Err(Error::PartialBatch {
            failed: outcome.failed.len(),
            total,
        });
    }

    let mut human = HumanOutput::new("Tasks imported");
    if let Some(warning) = reconcile_counts(&ctx).await {
        human.push_warning(warning);
    }
    human.push_summary("Created", outcome.succeeded.len().to_string());
    human.push_summary("Failed", outcome.failed.len().to_string());
    for task in &outcome.succeeded {
        human.push_detail(format!("created {} {}", task.id, task.title));
    }
    for failure in &outcome.failed {
        human.push_warning(format!("record {}: {}", failure.index, failure.message));
    }

    let output = TaskImportOutput {
        created: outcome.succeeded.len(),
        failed: outcome.failed.len(),
        tasks: outcome.succeeded,
        failures: outcome.failed,
    };

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "task import",
        &output,
        Some(&human),
    )
}
