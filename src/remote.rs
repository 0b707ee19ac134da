//! Remote record-API backend.
//!
//! Alternate persistence over a generic record service exposing two record
//! types, `task_c` and `category_c`, with server-shaped field names
//! (`title_c`, `name_c`, ...). Field-name translation happens only here;
//! the rest of the crate sees canonical [`Task`] and [`Category`] records.
//!
//! Wire protocol (JSON over POST):
//! - `{base}/{type}/query`  body `{}`                      -> `{success, data: [record]}`
//! - `{base}/{type}/create` body `{"records": [record]}`   -> `{success, results: [{success, data?, message?}]}`
//! - `{base}/{type}/update` body `{"records": [record]}`   -> same shape
//! - `{base}/{type}/delete` body `{"record_ids": [id]}`    -> same shape
//!
//! Batched mutations return per-record results; callers get them as a
//! [`BatchOutcome`] and must report successes and failures individually.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::category::{Category, CategoryPatch, NewCategory, DEFAULT_COLOR};
use crate::config::RemoteConfig;
use crate::error::{Error, Result};
use crate::service::{BatchFailure, BatchOutcome, CategoryService, TaskService};
use crate::task::{NewTask, Priority, Task, TaskPatch, DEFAULT_CATEGORY};

const TASK_TYPE: &str = "task_c";
const CATEGORY_TYPE: &str = "category_c";

// =============================================================================
// Wire records
// =============================================================================

/// Server-shaped task record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecordWire {
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(rename = "title_c")]
    pub title: String,
    #[serde(rename = "description_c", default)]
    pub description: String,
    #[serde(rename = "priority_c", default)]
    pub priority: Priority,
    #[serde(rename = "category_c", default = "default_wire_category")]
    pub category: String,
    #[serde(rename = "completed_c", default)]
    pub completed: bool,
    #[serde(rename = "created_at_c")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "due_date_c", default)]
    pub due_date: Option<DateTime<Utc>>,
}

fn default_wire_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl From<&Task> for TaskRecordWire {
    fn from(task: &Task) -> Self {
        Self {
            id: Some(task.id),
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority,
            category: task.category.clone(),
            completed: task.completed,
            created_at: task.created_at,
            due_date: task.due_date,
        }
    }
}

impl TaskRecordWire {
    /// Build the create payload for a new task, applying the documented
    /// defaults client-side. The server assigns the id.
    pub fn for_create(data: NewTask) -> Self {
        Self {
            id: None,
            title: data.title,
            description: data.description.unwrap_or_default(),
            priority: data.priority.unwrap_or_default(),
            category: data.category.unwrap_or_else(default_wire_category),
            completed: false,
            created_at: Utc::now(),
            due_date: data.due_date,
        }
    }

    pub fn into_task(self) -> Result<Task> {
        let id = self
            .id
            .ok_or_else(|| Error::Upstream("record missing Id field".to_string()))?;
        Ok(Task {
            id,
            title: self.title,
            description: self.description,
            priority: self.priority,
            category: self.category,
            completed: self.completed,
            created_at: self.created_at,
            due_date: self.due_date,
        })
    }
}

/// Server-shaped category record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRecordWire {
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(rename = "name_c")]
    pub name: String,
    #[serde(rename = "color_c", default = "default_wire_color")]
    pub color: String,
    #[serde(rename = "task_count_c", default)]
    pub task_count: usize,
}

fn default_wire_color() -> String {
    DEFAULT_COLOR.to_string()
}

impl From<&Category> for CategoryRecordWire {
    fn from(category: &Category) -> Self {
        Self {
            id: Some(category.id),
            name: category.name.clone(),
            color: category.color.clone(),
            task_count: category.task_count,
        }
    }
}

impl CategoryRecordWire {
    pub fn for_create(data: NewCategory) -> Self {
        Self {
            id: None,
            name: data.name,
            color: data.color.unwrap_or_else(default_wire_color),
            task_count: 0,
        }
    }

    pub fn into_category(self) -> Result<Category> {
        let id = self
            .id
            .ok_or_else(|| Error::Upstream("record missing Id field".to_string()))?;
        Ok(Category {
            id,
            name: self.name,
            color: self.color,
            task_count: self.task_count,
        })
    }
}

// =============================================================================
// Response envelopes
// =============================================================================

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    #[serde(default)]
    success: bool,
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecordResult<T> {
    #[serde(default)]
    pub success: bool,
    // A named default fn keeps serde from demanding `T: Default`.
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MutationResponse<T> {
    #[serde(default)]
    success: bool,
    #[serde(default = "Vec::new")]
    results: Vec<RecordResult<T>>,
    #[serde(default)]
    message: Option<String>,
}

/// Partition per-record results into successes and failures, converting
/// successful wire records through `convert`.
pub fn partition_results<W, T>(
    results: Vec<RecordResult<W>>,
    convert: impl Fn(W) -> Result<T>,
) -> BatchOutcome<T> {
    let mut outcome = BatchOutcome::default();
    for (index, result) in results.into_iter().enumerate() {
        if result.success {
            match result.data.map(&convert) {
                Some(Ok(record)) => outcome.succeeded.push(record),
                Some(Err(err)) => outcome.failed.push(BatchFailure {
                    index,
                    message: err.to_string(),
                }),
                None => outcome.failed.push(BatchFailure {
                    index,
                    message: "successful result carried no record".to_string(),
                }),
            }
        } else {
            outcome.failed.push(BatchFailure {
                index,
                message: result
                    .message
                    .unwrap_or_else(|| "record operation failed".to_string()),
            });
        }
    }
    outcome
}

// =============================================================================
// HTTP client
// =============================================================================

/// Thin client for the record service.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    base_url: String,
    api_key: Option<String>,
    http: reqwest::Client,
}

impl RemoteClient {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let base_url = config
            .base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                Error::InvalidConfig("remote backend requires [remote].base_url".to_string())
            })?;
        Ok(Self {
            base_url,
            api_key: config.api_key.clone(),
            http: reqwest::Client::new(),
        })
    }

    async fn post<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        let url = format!("{}/{path}", self.base_url);
        let mut request = self.http.post(&url).json(body);
        if let Some(key) = self.api_key.as_deref() {
            request = request.bearer_auth(key);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|value| {
                    value
                        .get("message")
                        .or_else(|| value.get("error"))
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                })
                .unwrap_or(body);
            return Err(Error::Upstream(format!("{status}: {message}")));
        }
        Ok(response.json().await?)
    }

    async fn query<T: DeserializeOwned>(&self, record_type: &str) -> Result<Vec<T>> {
        let response: QueryResponse<T> = self
            .post(&format!("{record_type}/query"), &serde_json::json!({}))
            .await?;
        if !response.success {
            return Err(Error::Upstream(
                response.message.unwrap_or_else(|| "query failed".to_string()),
            ));
        }
        Ok(response.data)
    }

    async fn mutate<B: Serialize, T: DeserializeOwned>(
        &self,
        record_type: &str,
        action: &str,
        body: &B,
    ) -> Result<Vec<RecordResult<T>>> {
        let response: MutationResponse<T> =
            self.post(&format!("{record_type}/{action}"), body).await?;
        if !response.success && response.results.is_empty() {
            return Err(Error::Upstream(
                response
                    .message
                    .unwrap_or_else(|| format!("{action} failed")),
            ));
        }
        Ok(response.results)
    }
}

// =============================================================================
// Repositories
// =============================================================================

/// Task repository backed by the remote record API.
#[derive(Debug, Clone)]
pub struct RemoteTaskRepo {
    client: RemoteClient,
}

impl RemoteTaskRepo {
    pub fn new(client: RemoteClient) -> Self {
        Self { client }
    }

    async fn update_records(&self, records: &[TaskRecordWire]) -> Result<BatchOutcome<Task>> {
        let results = self
            .client
            .mutate(TASK_TYPE, "update", &serde_json::json!({ "records": records }))
            .await?;
        Ok(partition_results(results, TaskRecordWire::into_task))
    }
}

#[async_trait]
impl TaskService for RemoteTaskRepo {
    async fn get_all(&self) -> Result<Vec<Task>> {
        let records: Vec<TaskRecordWire> = self.client.query(TASK_TYPE).await?;
        records.into_iter().map(TaskRecordWire::into_task).collect()
    }

    async fn get_by_id(&self, id: u32) -> Result<Task> {
        self.get_all()
            .await?
            .into_iter()
            .find(|task| task.id == id)
            .ok_or(Error::TaskNotFound(id))
    }

    async fn create(&self, data: NewTask) -> Result<Task> {
        self.create_many(vec![data]).await?.into_single()
    }

    async fn create_many(&self, data: Vec<NewTask>) -> Result<BatchOutcome<Task>> {
        let records: Vec<TaskRecordWire> =
            data.into_iter().map(TaskRecordWire::for_create).collect();
        let results = self
            .client
            .mutate(TASK_TYPE, "create", &serde_json::json!({ "records": records }))
            .await?;
        Ok(partition_results(results, TaskRecordWire::into_task))
    }

    async fn update(&self, id: u32, patch: TaskPatch) -> Result<Task> {
        let mut task = self.get_by_id(id).await?;
        patch.apply(&mut task);
        self.update_records(&[TaskRecordWire::from(&task)])
            .await?
            .into_single()
    }

    async fn delete(&self, id: u32) -> Result<()> {
        // Confirm existence first so a missing id surfaces as NotFound
        // rather than an opaque per-record failure.
        let _ = self.get_by_id(id).await?;
        let results: Vec<RecordResult<serde_json::Value>> = self
            .client
            .mutate(TASK_TYPE, "delete", &serde_json::json!({ "record_ids": [id] }))
            .await?;
        let outcome = partition_results(results, Ok);
        outcome.into_single().map(|_| ())
    }

    async fn toggle(&self, id: u32) -> Result<Task> {
        let task = self.get_by_id(id).await?;
        let patch = TaskPatch {
            completed: Some(!task.completed),
            ..TaskPatch::default()
        };
        self.update(id, patch).await
    }

    async fn get_by_category(&self, name: &str) -> Result<Vec<Task>> {
        Ok(self
            .get_all()
            .await?
            .into_iter()
            .filter(|task| task.category.eq_ignore_ascii_case(name))
            .collect())
    }

    async fn get_by_priority(&self, priority: Priority) -> Result<Vec<Task>> {
        Ok(self
            .get_all()
            .await?
            .into_iter()
            .filter(|task| task.priority == priority)
            .collect())
    }

    async fn get_completed(&self) -> Result<Vec<Task>> {
        Ok(self
            .get_all()
            .await?
            .into_iter()
            .filter(|task| task.completed)
            .collect())
    }

    async fn get_pending(&self) -> Result<Vec<Task>> {
        Ok(self
            .get_all()
            .await?
            .into_iter()
            .filter(|task| !task.completed)
            .collect())
    }
}

/// Category repository backed by the remote record API.
#[derive(Debug, Clone)]
pub struct RemoteCategoryRepo {
    client: RemoteClient,
}

impl RemoteCategoryRepo {
    pub fn new(client: RemoteClient) -> Self {
        Self { client }
    }

    async fn update_records(
        &self,
        records: &[CategoryRecordWire],
    ) -> Result<BatchOutcome<Category>> {
        let results = self
            .client
            .mutate(
                CATEGORY_TYPE,
                "update",
                &serde_json::json!({ "records": records }),
            )
            .await?;
        Ok(partition_results(results, CategoryRecordWire::into_category))
    }
}

#[async_trait]
impl CategoryService for RemoteCategoryRepo {
    async fn get_all(&self) -> Result<Vec<Category>> {
        let records: Vec<CategoryRecordWire> = self.client.query(CATEGORY_TYPE).await?;
        records
            .into_iter()
            .map(CategoryRecordWire::into_category)
            .collect()
    }

    async fn get_by_id(&self, id: u32) -> Result<Category> {
        self.get_all()
            .await?
            .into_iter()
            .find(|category| category.id == id)
            .ok_or(Error::CategoryNotFound(id))
    }

    async fn create(&self, data: NewCategory) -> Result<Category> {
        let records = vec![CategoryRecordWire::for_create(data)];
        let results = self
            .client
            .mutate(
                CATEGORY_TYPE,
                "create",
                &serde_json::json!({ "records": records }),
            )
            .await?;
        partition_results(results, CategoryRecordWire::into_category).into_single()
    }

    async fn update(&self, id: u32, patch: CategoryPatch) -> Result<Category> {
        let mut category = self.get_by_id(id).await?;
        if let Some(name) = patch.name.as_ref() {
            category.name = name.clone();
        }
        if let Some(color) = patch.color.as_ref() {
            category.color = color.clone();
        }
        self.update_records(&[CategoryRecordWire::from(&category)])
            .await?
            .into_single()
    }

    async fn delete(&self, id: u32) -> Result<()> {
        let _ = self.get_by_id(id).await?;
        let results: Vec<RecordResult<serde_json::Value>> = self
            .client
            .mutate(
                CATEGORY_TYPE,
                "delete",
                &serde_json::json!({ "record_ids": [id] }),
            )
            .await?;
        partition_results(results, Ok).into_single().map(|_| ())
    }

    async fn update_task_count(&self, name: &str, count: usize) -> Result<()> {
        let Some(mut category) = self
            .get_all()
            .await?
            .into_iter()
            .find(|category| category.name.eq_ignore_ascii_case(name))
        else {
            return Ok(());
        };
        category.task_count = count;
        self.update_records(&[CategoryRecordWire::from(&category)])
            .await?
            .into_single()
            .map(|_| ())
    }

    async fn reconcile_task_counts(&self, tasks: &[Task]) -> Result<Vec<Category>> {
        let mut categories = self.get_all().await?;
        let mut drifted = Vec::new();
        for category in categories.iter_mut() {
            let count = tasks
                .iter()
                .filter(|task| task.category.eq_ignore_ascii_case(&category.name))
                .count();
            if category.task_count != count {
                category.task_count = count;
                drifted.push(CategoryRecordWire::from(&*category));
            }
        }
        if !drifted.is_empty() {
            let outcome = self.update_records(&drifted).await?;
            if !outcome.failed.is_empty() {
                return Err(Error::PartialBatch {
                    failed: outcome.failed.len(),
                    total: outcome.total(),
                });
            }
        }
        Ok(categories)
    }
}
