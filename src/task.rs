//! Task records and the local task repository.
//!
//! Tasks persist as a flat JSON collection through an injected
//! [`CollectionStore`]. All read-modify-write cycles on the collection are
//! serialized through a single async mutex so overlapping mutations cannot
//! lose updates.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::{Error, Result};
use crate::storage::{Collection, CollectionStore, Latency};

/// Maximum length of a task title, enforced before the repository.
pub const MAX_TITLE_LEN: usize = 100;
/// Maximum length of a task description.
pub const MAX_DESCRIPTION_LEN: usize = 500;
/// Category assigned when the caller supplies none.
pub const DEFAULT_CATEGORY: &str = "personal";

/// Task priority. Unknown stored values decode as `Medium`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Sort weight: high 3, medium 2, low 1.
    pub fn weight(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    /// Strict parse for caller-supplied values.
    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(Error::Validation(format!(
                "unknown priority '{other}' (expected low, medium, or high)"
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Priority {
    /// Lenient decode for stored records: unrecognized values fall back to
    /// `Medium` so legacy data keeps its weight-2 behavior.
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or_default())
    }
}

/// Canonical task record.
///
/// Serialized field names match the persisted collection shape
/// (`createdAt`, `dueDate`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// Input for creating a task. Missing fields take the documented defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Validate caller-supplied constraints before the repository sees them.
    pub fn validate(&self) -> Result<()> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(Error::Validation("title cannot be empty".to_string()));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(Error::Validation(format!(
                "title exceeds {MAX_TITLE_LEN} characters"
            )));
        }
        if let Some(description) = self.description.as_deref() {
            if description.chars().count() > MAX_DESCRIPTION_LEN {
                return Err(Error::Validation(format!(
                    "description exceeds {MAX_DESCRIPTION_LEN} characters"
                )));
            }
        }
        Ok(())
    }
}

/// Partial update for a task. `None` fields are left untouched; the
/// double-optional `due_date` distinguishes "keep" from "clear".
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub completed: Option<bool>,
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.category.is_none()
            && self.completed.is_none()
            && self.due_date.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(title) = self.title.as_deref() {
            let trimmed = title.trim();
            if trimmed.is_empty() {
                return Err(Error::Validation("title cannot be empty".to_string()));
            }
            if trimmed.chars().count() > MAX_TITLE_LEN {
                return Err(Error::Validation(format!(
                    "title exceeds {MAX_TITLE_LEN} characters"
                )));
            }
        }
        if let Some(description) = self.description.as_deref() {
            if description.chars().count() > MAX_DESCRIPTION_LEN {
                return Err(Error::Validation(format!(
                    "description exceeds {MAX_DESCRIPTION_LEN} characters"
                )));
            }
        }
        Ok(())
    }

    /// Merge this patch over an existing record. The id is never changed.
    pub fn apply(&self, task: &mut Task) {
        if let Some(title) = self.title.as_ref() {
            task.title = title.clone();
        }
        if let Some(description) = self.description.as_ref() {
            task.description = description.clone();
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(category) = self.category.as_ref() {
            task.category = category.clone();
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
    }
}

/// Local repository over the task collection.
#[derive(Clone)]
pub struct TaskRepo {
    store: Arc<dyn CollectionStore>,
    latency: Latency,
    write_lock: Arc<Mutex<()>>,
}

impl TaskRepo {
    pub fn new(store: Arc<dyn CollectionStore>, latency: Latency) -> Self {
        Self {
            store,
            latency,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn get_all(&self) -> Result<Vec<Task>> {
        self.latency.read_pause().await;
        Ok(self.load())
    }

    pub async fn get_by_id(&self, id: u32) -> Result<Task> {
        self.latency.read_pause().await;
        self.load()
            .into_iter()
            .find(|task| task.id == id)
            .ok_or(Error::TaskNotFound(id))
    }

    pub async fn create(&self, data: NewTask) -> Result<Task> {
        self.latency.write_pause().await;
        let _guard = self.write_lock.lock().await;
        let mut tasks = self.load();
        let id = tasks.iter().map(|task| task.id).max().unwrap_or(0) + 1;
        let task = Task {
            id,
            title: data.title,
            description: data.description.unwrap_or_default(),
            priority: data.priority.unwrap_or_default(),
            category: data.category.unwrap_or_else(default_category),
            completed: false,
            created_at: Utc::now(),
            due_date: data.due_date,
        };
        tasks.push(task.clone());
        self.persist(&tasks);
        Ok(task)
    }

    pub async fn update(&self, id: u32, patch: TaskPatch) -> Result<Task> {
        self.latency.write_pause().await;
        let _guard = self.write_lock.lock().await;
        let mut tasks = self.load();
        let task = tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(Error::TaskNotFound(id))?;
        patch.apply(task);
        let updated = task.clone();
        self.persist(&tasks);
        Ok(updated)
    }

    pub async fn delete(&self, id: u32) -> Result<()> {
        self.latency.write_pause().await;
        let _guard = self.write_lock.lock().await;
        let mut tasks = self.load();
        let before = tasks.len();
        tasks.retain(|task| task.id != id);
        if tasks.len() == before {
            return Err(Error::TaskNotFound(id));
        }
        self.persist(&tasks);
        Ok(())
    }

    pub async fn toggle(&self, id: u32) -> Result<Task> {
        self.latency.write_pause().await;
        let _guard = self.write_lock.lock().await;
        let mut tasks = self.load();
        let task = tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(Error::TaskNotFound(id))?;
        task.completed = !task.completed;
        let updated = task.clone();
        self.persist(&tasks);
        Ok(updated)
    }

    pub async fn get_by_category(&self, name: &str) -> Result<Vec<Task>> {
        self.latency.read_pause().await;
        Ok(self
            .load()
            .into_iter()
            .filter(|task| task.category.eq_ignore_ascii_case(name))
            .collect())
    }

    pub async fn get_by_priority(&self, priority: Priority) -> Result<Vec<Task>> {
        self.latency.read_pause().await;
        Ok(self
            .load()
            .into_iter()
            .filter(|task| task.priority == priority)
            .collect())
    }

    pub async fn get_completed(&self) -> Result<Vec<Task>> {
        self.latency.read_pause().await;
        Ok(self.load().into_iter().filter(|task| task.completed).collect())
    }

    pub async fn get_pending(&self) -> Result<Vec<Task>> {
        self.latency.read_pause().await;
        Ok(self.load().into_iter().filter(|task| !task.completed).collect())
    }

    /// Decode the stored collection, skipping records that no longer parse.
    fn load(&self) -> Vec<Task> {
        self.store
            .load(Collection::Tasks)
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<Task>(value) {
                Ok(task) => Some(task),
                Err(err) => {
                    warn!("skipping unreadable task record: {err}");
                    None
                }
            })
            .collect()
    }

    /// Persist the collection. Write failures are logged, not fatal: the
    /// in-memory result is still returned to the caller.
    fn persist(&self, tasks: &[Task]) {
        let records: Vec<serde_json::Value> = tasks
            .iter()
            .filter_map(|task| serde_json::to_value(task).ok())
            .collect();
        if !self.store.save(Collection::Tasks, &records) {
            warn!("failed to save tasks collection; in-memory result returned anyway");
        }
    }
}
