//! Category records and the local category repository.
//!
//! Categories join to tasks by case-insensitive name match, not referential
//! integrity: deleting or renaming a category never touches tasks. The
//! `task_count` field is a denormalized cache; [`CategoryRepo::reconcile_task_counts`]
//! recomputes it from the live task collection.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::{Error, Result};
use crate::storage::{Collection, CollectionStore, Latency};
use crate::task::Task;

/// Color token assigned when the caller supplies none.
pub const DEFAULT_COLOR: &str = "#64748b";

/// Canonical category record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: u32,
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub task_count: usize,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// Input for creating a category.
#[derive(Debug, Clone, Default)]
pub struct NewCategory {
    pub name: String,
    pub color: Option<String>,
}

impl NewCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("category name cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Partial update for a category.
#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub color: Option<String>,
}

impl CategoryPatch {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = self.name.as_deref() {
            if name.trim().is_empty() {
                return Err(Error::Validation("category name cannot be empty".to_string()));
            }
        }
        Ok(())
    }
}

/// Local repository over the category collection.
#[derive(Clone)]
pub struct CategoryRepo {
    store: Arc<dyn CollectionStore>,
    latency: Latency,
    write_lock: Arc<Mutex<()>>,
}

impl CategoryRepo {
    pub fn new(store: Arc<dyn CollectionStore>, latency: Latency) -> Self {
        Self {
            store,
            latency,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn get_all(&self) -> Result<Vec<Category>> {
        self.latency.read_pause().await;
        Ok(self.load())
    }

    pub async fn get_by_id(&self, id: u32) -> Result<Category> {
        self.latency.read_pause().await;
        self.load()
            .into_iter()
            .find(|category| category.id == id)
            .ok_or(Error::CategoryNotFound(id))
    }

    pub async fn create(&self, data: NewCategory) -> Result<Category> {
        self.latency.write_pause().await;
        let _guard = self.write_lock.lock().await;
        let mut categories = self.load();
        let id = categories.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let category = Category {
            id,
            name: data.name,
            color: data.color.unwrap_or_else(default_color),
            task_count: 0,
        };
        categories.push(category.clone());
        self.persist(&categories);
        Ok(category)
    }

    pub async fn update(&self, id: u32, patch: CategoryPatch) -> Result<Category> {
        self.latency.write_pause().await;
        let _guard = self.write_lock.lock().await;
        let mut categories = self.load();
        let category = categories
            .iter_mut()
            .find(|category| category.id == id)
            .ok_or(Error::CategoryNotFound(id))?;
        if let Some(name) = patch.name.as_ref() {
            // Renaming orphans tasks still pointing at the old name. The
            // association is a soft string match by design.
            category.name = name.clone();
        }
        if let Some(color) = patch.color.as_ref() {
            category.color = color.clone();
        }
        let updated = category.clone();
        self.persist(&categories);
        Ok(updated)
    }

    pub async fn delete(&self, id: u32) -> Result<()> {
        self.latency.write_pause().await;
        let _guard = self.write_lock.lock().await;
        let mut categories = self.load();
        let before = categories.len();
        categories.retain(|category| category.id != id);
        if categories.len() == before {
            return Err(Error::CategoryNotFound(id));
        }
        self.persist(&categories);
        Ok(())
    }

    /// Overwrite the cached task count for the category matching `name`
    /// (case-insensitive). A miss is a no-op, not an error: count drift is
    /// tolerated and repaired by the next reconcile.
    pub async fn update_task_count(&self, name: &str, count: usize) -> Result<()> {
        self.latency.write_pause().await;
        let _guard = self.write_lock.lock().await;
        let mut categories = self.load();
        let Some(category) = categories
            .iter_mut()
            .find(|category| category.name.eq_ignore_ascii_case(name))
        else {
            return Ok(());
        };
        category.task_count = count;
        self.persist(&categories);
        Ok(())
    }

    /// Recompute every category's task count from the live task collection
    /// and persist only if something drifted. Returns the refreshed list.
    pub async fn reconcile_task_counts(&self, tasks: &[Task]) -> Result<Vec<Category>> {
        self.latency.write_pause().await;
        let _guard = self.write_lock.lock().await;
        let mut categories = self.load();
        let mut changed = false;
        for category in categories.iter_mut() {
            let count = tasks
                .iter()
                .filter(|task| task.category.eq_ignore_ascii_case(&category.name))
                .count();
            if category.task_count != count {
                category.task_count = count;
                changed = true;
            }
        }
        if changed {
            self.persist(&categories);
        }
        Ok(categories)
    }

    fn load(&self) -> Vec<Category> {
        self.store
            .load(Collection::Categories)
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<Category>(value) {
                Ok(category) => Some(category),
                Err(err) => {
                    warn!("skipping unreadable category record: {err}");
                    None
                }
            })
            .collect()
    }

    fn persist(&self, categories: &[Category]) {
        let records: Vec<serde_json::Value> = categories
            .iter()
            .filter_map(|category| serde_json::to_value(category).ok())
            .collect();
        if !self.store.save(Collection::Categories, &records) {
            warn!("failed to save categories collection; in-memory result returned anyway");
        }
    }
}
