//! Backend seam: the CLI talks to tasks and categories through these
//! traits, implemented by both the local repositories and the remote
//! record-API client.

use async_trait::async_trait;

use crate::category::{Category, CategoryPatch, CategoryRepo, NewCategory};
use crate::error::{Error, Result};
use crate::task::{NewTask, Priority, Task, TaskPatch, TaskRepo};

/// One record that failed inside a batch operation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BatchFailure {
    /// Position of the record in the submitted batch.
    pub index: usize,
    pub message: String,
}

/// Per-record outcome of a batched operation. Successes and failures are
/// reported individually, never collapsed into one flag.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BatchOutcome<T> {
    pub succeeded: Vec<T>,
    pub failed: Vec<BatchFailure>,
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<T> BatchOutcome<T> {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty() && !self.succeeded.is_empty()
    }

    /// Collapse a single-record batch into a plain result.
    pub fn into_single(mut self) -> Result<T> {
        if let Some(record) = self.succeeded.pop() {
            return Ok(record);
        }
        let message = self
            .failed
            .pop()
            .map(|failure| failure.message)
            .unwrap_or_else(|| "empty batch result".to_string());
        Err(Error::Upstream(message))
    }
}

#[async_trait]
pub trait TaskService: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Task>>;
    async fn get_by_id(&self, id: u32) -> Result<Task>;
    async fn create(&self, data: NewTask) -> Result<Task>;
    async fn create_many(&self, data: Vec<NewTask>) -> Result<BatchOutcome<Task>>;
    async fn update(&self, id: u32, patch: TaskPatch) -> Result<Task>;
    async fn delete(&self, id: u32) -> Result<()>;
    async fn toggle(&self, id: u32) -> Result<Task>;
    async fn get_by_category(&self, name: &str) -> Result<Vec<Task>>;
    async fn get_by_priority(&self, priority: Priority) -> Result<Vec<Task>>;
    async fn get_completed(&self) -> Result<Vec<Task>>;
    async fn get_pending(&self) -> Result<Vec<Task>>;
}

#[async_trait]
pub trait CategoryService: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Category>>;
    async fn get_by_id(&self, id: u32) -> Result<Category>;
    async fn create(&self, data: NewCategory) -> Result<Category>;
    async fn update(&self, id: u32, patch: CategoryPatch) -> Result<Category>;
    async fn delete(&self, id: u32) -> Result<()>;
    async fn update_task_count(&self, name: &str, count: usize) -> Result<()>;
    async fn reconcile_task_counts(&self, tasks: &[Task]) -> Result<Vec<Category>>;
}

#[async_trait]
impl TaskService for TaskRepo {
    async fn get_all(&self) -> Result<Vec<Task>> {
        TaskRepo::get_all(self).await
    }

    async fn get_by_id(&self, id: u32) -> Result<Task> {
        TaskRepo::get_by_id(self, id).await
    }

    async fn create(&self, data: NewTask) -> Result<Task> {
        TaskRepo::create(self, data).await
    }

    async fn create_many(&self, data: Vec<NewTask>) -> Result<BatchOutcome<Task>> {
        let mut outcome = BatchOutcome::default();
        for (index, record) in data.into_iter().enumerate() {
            match TaskRepo::create(self, record).await {
                Ok(task) => outcome.succeeded.push(task),
                Err(err) => outcome.failed.push(BatchFailure {
                    index,
                    message: err.to_string(),
                }),
            }
        }
        Ok(outcome)
    }

    async fn update(&self, id: u32, patch: TaskPatch) -> Result<Task> {
        TaskRepo::update(self, id, patch).await
    }

    async fn delete(&self, id: u32) -> Result<()> {
        TaskRepo::delete(self, id).await
    }

    async fn toggle(&self, id: u32) -> Result<Task> {
        TaskRepo::toggle(self, id).await
    }

    async fn get_by_category(&self, name: &str) -> Result<Vec<Task>> {
        TaskRepo::get_by_category(self, name).await
    }

    async fn get_by_priority(&self, priority: Priority) -> Result<Vec<Task>> {
        TaskRepo::get_by_priority(self, priority).await
    }

    async fn get_completed(&self) -> Result<Vec<Task>> {
        TaskRepo::get_completed(self).await
    }

    async fn get_pending(&self) -> Result<Vec<Task>> {
        TaskRepo::get_pending(self).await
    }
}

#[async_trait]
impl CategoryService for CategoryRepo {
    async fn get_all(&self) -> Result<Vec<Category>> {
        CategoryRepo::get_all(self).await
    }

    async fn get_by_id(&self, id: u32) -> Result<Category> {
        CategoryRepo::get_by_id(self, id).await
    }

    async fn create(&self, data: NewCategory) -> Result<Category> {
        CategoryRepo::create(self, data).await
    }

    async fn update(&self, id: u32, patch: CategoryPatch) -> Result<Category> {
        CategoryRepo::update(self, id, patch).await
    }

    async fn delete(&self, id: u32) -> Result<()> {
        CategoryRepo::delete(self, id).await
    }

    async fn update_task_count(&self, name: &str, count: usize) -> Result<()> {
        CategoryRepo::update_task_count(self, name, count).await
    }

    async fn reconcile_task_counts(&self, tasks: &[Task]) -> Result<Vec<Category>> {
        CategoryRepo::reconcile_task_counts(self, tasks).await
    }
}
