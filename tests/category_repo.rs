use std::sync::Arc;

use chrono::Utc;
use flow::category::{CategoryPatch, CategoryRepo, NewCategory, DEFAULT_COLOR};
use flow::error::Error;
use flow::storage::{Collection, Latency, MemoryStore};
use flow::task::{Priority, Task};

fn repo_with_store() -> (CategoryRepo, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let repo = CategoryRepo::new(store.clone(), Latency::off());
    (repo, store)
}

fn category_record(id: u32, name: &str, count: usize) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "color": "#2563eb",
        "taskCount": count,
    })
}

fn task_in(category: &str) -> Task {
    Task {
        id: 0,
        title: "t".to_string(),
        description: String::new(),
        priority: Priority::Medium,
        category: category.to_string(),
        completed: false,
        created_at: Utc::now(),
        due_date: None,
    }
}

#[tokio::test]
async fn create_defaults_color_and_zero_count() {
    let (repo, _store) = repo_with_store();
    let category = repo.create(NewCategory::new("Errands")).await.unwrap();

    assert_eq!(category.id, 1);
    assert_eq!(category.name, "Errands");
    assert_eq!(category.color, DEFAULT_COLOR);
    assert_eq!(category.task_count, 0);
}

#[tokio::test]
async fn create_assigns_max_id_plus_one() {
    let (repo, store) = repo_with_store();
    store.preload(
        Collection::Categories,
        vec![category_record(3, "Work", 0), category_record(5, "Home", 0)],
    );

    let category = repo.create(NewCategory::new("New")).await.unwrap();
    assert_eq!(category.id, 6);
}

#[tokio::test]
async fn update_changes_name_and_color() {
    let (repo, _store) = repo_with_store();
    let created = repo.create(NewCategory::new("Old")).await.unwrap();

    let patch = CategoryPatch {
        name: Some("Renamed".to_string()),
        color: Some("#10b981".to_string()),
    };
    let updated = repo.update(created.id, patch).await.unwrap();
    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.color, "#10b981");
}

#[tokio::test]
async fn delete_missing_category_is_not_found() {
    let (repo, _store) = repo_with_store();
    let err = repo.delete(9).await.unwrap_err();
    assert!(matches!(err, Error::CategoryNotFound(9)));
}

#[tokio::test]
async fn update_task_count_matches_name_case_insensitively() {
    let (repo, store) = repo_with_store();
    store.preload(Collection::Categories, vec![category_record(1, "Work", 0)]);

    repo.update_task_count("work", 4).await.unwrap();
    let category = repo.get_by_id(1).await.unwrap();
    assert_eq!(category.task_count, 4);
}

#[tokio::test]
async fn update_task_count_for_unknown_name_is_a_noop() {
    let (repo, store) = repo_with_store();
    store.preload(Collection::Categories, vec![category_record(1, "Work", 2)]);

    repo.update_task_count("nonexistent", 9).await.unwrap();
    assert_eq!(repo.get_by_id(1).await.unwrap().task_count, 2);
}

#[tokio::test]
async fn reconcile_recomputes_counts_from_tasks() {
    let (repo, store) = repo_with_store();
    store.preload(
        Collection::Categories,
        vec![category_record(1, "Work", 99), category_record(2, "Personal", 0)],
    );

    let tasks = vec![task_in("work"), task_in("WORK"), task_in("personal")];
    let categories = repo.reconcile_task_counts(&tasks).await.unwrap();

    let work = categories.iter().find(|c| c.name == "Work").unwrap();
    let personal = categories.iter().find(|c| c.name == "Personal").unwrap();
    assert_eq!(work.task_count, 2);
    assert_eq!(personal.task_count, 1);

    // Persisted, not just returned.
    assert_eq!(repo.get_by_id(1).await.unwrap().task_count, 2);
}

#[tokio::test]
async fn reconcile_zeroes_categories_with_no_tasks() {
    let (repo, store) = repo_with_store();
    store.preload(Collection::Categories, vec![category_record(1, "Stale", 7)]);

    let categories = repo.reconcile_task_counts(&[]).await.unwrap();
    assert_eq!(categories[0].task_count, 0);
}

#[test]
fn new_category_rejects_blank_names() {
    assert!(NewCategory::new("ok").validate().is_ok());
    assert!(NewCategory::new("  ").validate().is_err());

    let blank_rename = CategoryPatch {
        name: Some("   ".to_string()),
        color: None,
    };
    assert!(blank_rename.validate().is_err());
}
