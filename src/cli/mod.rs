//! Command-line interface for flow
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is defined in its own submodule.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::category::CategoryRepo;
use crate::config::{Backend, Config};
use crate::error::Result;
use crate::remote::{RemoteCategoryRepo, RemoteClient, RemoteTaskRepo};
use crate::service::{CategoryService, TaskService};
use crate::storage::{CollectionStore, JsonFileStore, Latency};
use crate::task::TaskRepo;

mod category;
mod describe;
mod init;
mod stats;
mod task;

/// flow - Focus Flow
///
/// A personal task manager: create and organize tasks by category and
/// priority, track completion, and view aggregate statistics.
#[derive(Parser, Debug)]
#[command(name = "flow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file (defaults to the platform config dir)
    #[arg(long, global = true, env = "FLOW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Data directory for local storage
    #[arg(long, global = true, env = "FLOW_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize storage and write a default config
    Init,

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Category management
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Show aggregate task statistics
    Stats,

    /// Generate a task description from a title
    Describe {
        /// Task title to describe
        title: String,
    },
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a task
    Add {
        /// Task title (max 100 characters)
        title: String,

        /// Task description (max 500 characters)
        #[arg(long)]
        description: Option<String>,

        /// Priority: low, medium, high
        #[arg(long)]
        priority: Option<String>,

        /// Category name
        #[arg(long)]
        category: Option<String>,

        /// Due date (YYYY-MM-DD, end of day)
        #[arg(long)]
        due: Option<String>,

        /// Generate a description from the title (best effort)
        #[arg(long)]
        describe: bool,
    },

    /// List tasks
    List {
        /// Status filter: all, pending, completed
        #[arg(long, default_value = "all")]
        status: String,

        /// Filter by priority: low, medium, high
        #[arg(long)]
        priority: Option<String>,

        /// Filter by category name (case-insensitive)
        #[arg(long)]
        category: Option<String>,

        /// Maximum tasks to show
        #[arg(long, default_value = "50")]
        limit: usize,
    },

    /// Show one task
    Show {
        /// Task id
        id: u32,
    },

    /// Edit a task
    Edit {
        /// Task id
        id: u32,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// New priority: low, medium, high
        #[arg(long)]
        priority: Option<String>,

        /// New category name
        #[arg(long)]
        category: Option<String>,

        /// New due date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,

        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
    },

    /// Toggle a task's completion state
    Done {
        /// Task id
        id: u32,
    },

    /// Delete a task
    Rm {
        /// Task id
        id: u32,
    },

    /// Import tasks from a JSON file (batched; per-record results)
    Import {
        /// Path to a JSON array of task records
        file: PathBuf,
    },
}

/// Category subcommands
#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// Create a category
    Add {
        /// Category name
        name: String,

        /// Display color token (e.g. "#2563eb")
        #[arg(long)]
        color: Option<String>,
    },

    /// List categories with task counts
    List,

    /// Edit a category
    Edit {
        /// Category id
        id: u32,

        /// New name (existing tasks keep the old name)
        #[arg(long)]
        name: Option<String>,

        /// New color token
        #[arg(long)]
        color: Option<String>,
    },

    /// Delete a category (tasks are not touched)
    Rm {
        /// Category id
        id: u32,
    },

    /// Recompute task counts from the task collection
    Recount,
}

/// Services resolved from config: local repositories or the remote
/// record API, behind the same trait surface.
pub(crate) struct AppContext {
    pub config: Config,
    pub tasks: Arc<dyn TaskService>,
    pub categories: Arc<dyn CategoryService>,
}

pub(crate) fn load_context(
    config_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
) -> Result<AppContext> {
    let config = Config::load(config_path.as_deref())?;
    let (tasks, categories): (Arc<dyn TaskService>, Arc<dyn CategoryService>) =
        match config.backend {
            Backend::Local => {
                let latency = if config.storage.simulate_latency {
                    Latency::on()
                } else {
                    Latency::off()
                };
                let store: Arc<dyn CollectionStore> =
                    Arc::new(JsonFileStore::new(config.data_dir(data_dir.as_deref())?));
                (
                    Arc::new(TaskRepo::new(Arc::clone(&store), latency)),
                    Arc::new(CategoryRepo::new(store, latency)),
                )
            }
            Backend::Remote => {
                let client = RemoteClient::new(&config.remote)?;
                (
                    Arc::new(RemoteTaskRepo::new(client.clone())),
                    Arc::new(RemoteCategoryRepo::new(client)),
                )
            }
        };
    Ok(AppContext {
        config,
        tasks,
        categories,
    })
}

/// Best-effort task-count reconciliation after a task mutation. Returns a
/// warning line instead of failing the surrounding command.
pub(crate) async fn reconcile_counts(ctx: &AppContext) -> Option<String> {
    let tasks = match ctx.tasks.get_all().await {
        Ok(tasks) => tasks,
        Err(err) => return Some(format!("task count reconcile skipped: {err}")),
    };
    match ctx.categories.reconcile_task_counts(&tasks).await {
        Ok(_) => None,
        Err(err) => Some(format!("task count reconcile failed: {err}")),
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => init::run(init::InitOptions {
                config: self.config,
                data_dir: self.data_dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Task(cmd) => match cmd {
                TaskCommands::Add {
                    title,
                    description,
                    priority,
                    category,
                    due,
                    describe,
                } => {
                    task::run_add(task::AddOptions {
                        title,
                        description,
                        priority,
                        category,
                        due,
                        describe,
                        config: self.config,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                TaskCommands::List {
                    status,
                    priority,
                    category,
                    limit,
                } => {
                    task::run_list(task::ListOptions {
                        status,
                        priority,
                        category,
                        limit,
                        config: self.config,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                TaskCommands::Show { id } => {
                    task::run_show(task::ShowOptions {
                        id,
                        config: self.config,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                TaskCommands::Edit {
                    id,
                    title,
                    description,
                    priority,
                    category,
                    due,
                    clear_due,
                } => {
                    task::run_edit(task::EditOptions {
                        id,
                        title,
                        description,
                        priority,
                        category,
                        due,
                        clear_due,
                        config: self.config,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                TaskCommands::Done { id } => {
                    task::run_done(task::DoneOptions {
                        id,
                        config: self.config,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                TaskCommands::Rm { id } => {
                    task::run_rm(task::RmOptions {
                        id,
                        config: self.config,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                TaskCommands::Import { file } => {
                    task::run_import(task::ImportOptions {
                        file,
                        config: self.config,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
            },
            Commands::Category(cmd) => match cmd {
                CategoryCommands::Add { name, color } => {
                    category::run_add(category::AddOptions {
                        name,
                        color,
                        config: self.config,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                CategoryCommands::List => {
                    category::run_list(category::ListOptions {
                        config: self.config,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                CategoryCommands::Edit { id, name, color } => {
                    category::run_edit(category::EditOptions {
                        id,
                        name,
                        color,
                        config: self.config,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                CategoryCommands::Rm { id } => {
                    category::run_rm(category::RmOptions {
                        id,
                        config: self.config,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
                CategoryCommands::Recount => {
                    category::run_recount(category::RecountOptions {
                        config: self.config,
                        data_dir: self.data_dir,
                        json: self.json,
                        quiet: self.quiet,
                    })
                    .await
                }
            },
            Commands::Stats => {
                stats::run(stats::StatsOptions {
                    config: self.config,
                    data_dir: self.data_dir,
                    json: self.json,
                    quiet: self.quiet,
                })
                .await
            }
            Commands::Describe { title } => {
                describe::run(describe::DescribeOptions {
                    title,
                    config: self.config,
                    json: self.json,
                    quiet: self.quiet,
                })
                .await
            }
        }
    }
}
