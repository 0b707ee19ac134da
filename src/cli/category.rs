//! flow category command implementations.

use std::path::PathBuf;

use crate::category::{Category, CategoryPatch, NewCategory};
use crate::cli::load_context;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};

pub struct AddOptions {
    pub name: String,
    pub color: Option<String>,
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ListOptions {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct EditOptions {
    pub id: u32,
    pub name: Option<String>,
    pub color: Option<String>,
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

pub struct RecountOptions {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct CategoryOutput {
    category: Category,
}

#[derive(serde::Serialize)]
struct CategoryListOutput {
    total: usize,
    categories: Vec<Category>,
}

#[derive(serde::Serialize)]
struct CategoryDeleteOutput {
    id: u32,
}

pub async fn run_add(options: AddOptions) -> Result<()> {
    let ctx = load_context(options.config, options.data_dir)?;

    let data = NewCategory {
        name: options.name,
        color: options.color,
    };
    data.validate()?;
    let category = ctx.categories.create(data).await?;

    let mut human = HumanOutput::new("Category created");
    human.push_summary("ID", category.id.to_string());
    human.push_summary("Name", category.name.clone());
    human.push_summary("Color", category.color.clone());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "category add",
        &CategoryOutput { category },
        Some(&human),
    )
}

pub async fn run_list(options: ListOptions) -> Result<()> {
    let ctx = load_context(options.config, options.data_dir)?;
    let categories = ctx.categories.get_all().await?;

    let mut human = HumanOutput::new("Categories");
    human.push_summary("Total", categories.len().to_string());
    for category in &categories {
        human.push_detail(format!(
            "[{}] {} {} ({} tasks)",
            category.id, category.name, category.color, category.task_count
        ));
    }

    let output = CategoryListOutput {
        total: categories.len(),
        categories,
    };

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "category list",
        &output,
        Some(&human),
    )
}

pub async fn run_edit(options: EditOptions) -> Result<()> {
    let ctx = load_context(options.config, options.data_dir)?;

    let patch = CategoryPatch {
        name: options.name,
        color: options.color,
    };
    if patch.name.is_none() && patch.color.is_none() {
        return Err(Error::InvalidArgument(
            "category edit requires --name or --color".to_string(),
        ));
    }
    patch.validate()?;

    let renamed = patch.name.is_some();
    let category = ctx.categories.update(options.id, patch).await?;

    let mut human = HumanOutput::new("Category updated");
    if renamed {
        human.push_warning(
            "existing tasks keep the old category name; edit them individually to move them"
                .to_string(),
        );
    }
    human.push_summary("ID", category.id.to_string());
    human.push_summary("Name", category.name.clone());
    human.push_summary("Color", category.color.clone());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "category edit",
        &CategoryOutput { category },
        Some(&human),
    )
}

pub async fn run_rm(options: RmOptions) -> Result<()> {
    let ctx = load_context(options.config, options.data_dir)?;
    ctx.categories.delete(options.id).await?;

    let mut human = HumanOutput::new("Category deleted");
    human.push_summary("ID", options.id.to_string());
    human.push_detail("tasks in this category were left unchanged".to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "category rm",
        &CategoryDeleteOutput { id: options.id },
        Some(&human),
    )
}

pub async fn run_recount(options: RecountOptions) -> Result<()> {
    let ctx = load_context(options.config, options.data_dir)?;

    let tasks = ctx.tasks.get_all().await?;
    let categories = ctx.categories.reconcile_task_counts(&tasks).await?;

    let mut human = HumanOutput::new("Task counts reconciled");
    human.push_summary("Categories", categories.len().to_string());
    for category in &categories {
        human.push_detail(format!("{}: {} tasks", category.name, category.task_count));
    }

    let output = CategoryListOutput {
        total: categories.len(),
        categories,
    };

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "category recount",
        &output,
        Some(&human),
    )
}
