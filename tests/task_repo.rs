use std::sync::Arc;

use flow::error::Error;
use flow::storage::{Collection, Latency, MemoryStore};
use flow::task::{NewTask, Priority, TaskPatch, TaskRepo};

fn repo_with_store() -> (TaskRepo, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let repo = TaskRepo::new(store.clone(), Latency::off());
    (repo, store)
}

fn task_record(id: u32, title: &str, completed: bool) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "description": "",
        "priority": "medium",
        "category": "work",
        "completed": completed,
        "createdAt": "2026-03-01T10:00:00Z",
        "dueDate": null,
    })
}

#[tokio::test]
async fn create_assigns_max_id_plus_one() {
    let (repo, store) = repo_with_store();
    store.preload(
        Collection::Tasks,
        vec![task_record(1, "first", false), task_record(7, "gap", false)],
    );

    let task = repo.create(NewTask::new("newest")).await.unwrap();
    assert_eq!(task.id, 8);
    assert_eq!(task.title, "newest");
    assert!(!task.completed);
}

#[tokio::test]
async fn create_applies_documented_defaults() {
    let (repo, _store) = repo_with_store();
    let task = repo.create(NewTask::new("defaults")).await.unwrap();

    assert_eq!(task.id, 1);
    assert_eq!(task.description, "");
    assert_eq!(task.priority, Priority::Medium);
    assert_eq!(task.category, "personal");
    assert!(!task.completed);
    assert!(task.due_date.is_none());
}

#[tokio::test]
async fn ids_are_not_reused_after_deleting_the_newest() {
    let (repo, _store) = repo_with_store();
    let first = repo.create(NewTask::new("first")).await.unwrap();
    let second = repo.create(NewTask::new("second")).await.unwrap();
    assert_eq!((first.id, second.id), (1, 2));

    repo.delete(second.id).await.unwrap();
    // Max-plus-one over the remaining records: id 2 comes back.
    let third = repo.create(NewTask::new("third")).await.unwrap();
    assert_eq!(third.id, 2);
}

#[tokio::test]
async fn update_with_empty_patch_changes_nothing() {
    let (repo, _store) = repo_with_store();
    let created = repo.create(NewTask::new("stable")).await.unwrap();

    let updated = repo.update(created.id, TaskPatch::default()).await.unwrap();
    assert_eq!(updated, created);
}

#[tokio::test]
async fn update_can_clear_a_due_date() {
    let (repo, _store) = repo_with_store();
    let due = flow::dates::parse_due_date("2026-04-01").unwrap();
    let created = repo
        .create(NewTask {
            title: "due soon".to_string(),
            due_date: Some(due),
            ..NewTask::default()
        })
        .await
        .unwrap();
    assert!(created.due_date.is_some());

    let patch = TaskPatch {
        due_date: Some(None),
        ..TaskPatch::default()
    };
    let updated = repo.update(created.id, patch).await.unwrap();
    assert!(updated.due_date.is_none());
}

#[tokio::test]
async fn update_missing_task_is_not_found() {
    let (repo, _store) = repo_with_store();
    let err = repo.update(99, TaskPatch::default()).await.unwrap_err();
    assert!(matches!(err, Error::TaskNotFound(99)));
}

#[tokio::test]
async fn toggle_twice_restores_original_state() {
    let (repo, _store) = repo_with_store();
    let created = repo.create(NewTask::new("flip")).await.unwrap();

    let flipped = repo.toggle(created.id).await.unwrap();
    assert!(flipped.completed);

    let restored = repo.toggle(created.id).await.unwrap();
    assert!(!restored.completed);
}

#[tokio::test]
async fn delete_missing_task_leaves_collection_unchanged() {
    let (repo, _store) = repo_with_store();
    repo.create(NewTask::new("keep me")).await.unwrap();

    let err = repo.delete(42).await.unwrap_err();
    assert!(matches!(err, Error::TaskNotFound(42)));
    assert_eq!(repo.get_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn category_lookup_is_case_insensitive() {
    let (repo, store) = repo_with_store();
    store.preload(
        Collection::Tasks,
        vec![task_record(1, "report", false), task_record(2, "notes", false)],
    );

    let matched = repo.get_by_category("Work").await.unwrap();
    assert_eq!(matched.len(), 2);
    assert!(repo.get_by_category("shopping").await.unwrap().is_empty());
}

#[tokio::test]
async fn completed_and_pending_partition_the_collection() {
    let (repo, store) = repo_with_store();
    store.preload(
        Collection::Tasks,
        vec![
            task_record(1, "done", true),
            task_record(2, "open", false),
            task_record(3, "also open", false),
        ],
    );

    assert_eq!(repo.get_completed().await.unwrap().len(), 1);
    assert_eq!(repo.get_pending().await.unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_priority_decodes_as_medium() {
    let (repo, store) = repo_with_store();
    let mut record = task_record(1, "odd", false);
    record["priority"] = serde_json::json!("urgent");
    store.preload(Collection::Tasks, vec![record]);

    let task = repo.get_by_id(1).await.unwrap();
    assert_eq!(task.priority, Priority::Medium);
}

#[tokio::test]
async fn unreadable_records_are_skipped() {
    let (repo, store) = repo_with_store();
    store.preload(
        Collection::Tasks,
        vec![serde_json::json!({"bogus": true}), task_record(3, "ok", false)],
    );

    let tasks = repo.get_all().await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, 3);
}

#[tokio::test]
async fn failed_write_still_returns_the_created_task() {
    let (repo, store) = repo_with_store();
    store.set_fail_writes(true);

    let task = repo.create(NewTask::new("transient")).await.unwrap();
    assert_eq!(task.id, 1);
    // Nothing persisted, so the next read sees an empty collection.
    assert!(repo.get_all().await.unwrap().is_empty());
}

#[test]
fn new_task_validation_enforces_limits() {
    assert!(NewTask::new("ok").validate().is_ok());
    assert!(NewTask::new("   ").validate().is_err());
    assert!(NewTask::new("x".repeat(101)).validate().is_err());
    assert!(NewTask::new("x".repeat(100)).validate().is_ok());

    let long_description = NewTask {
        title: "fine".to_string(),
        description: Some("d".repeat(501)),
        ..NewTask::default()
    };
    assert!(long_description.validate().is_err());
}
