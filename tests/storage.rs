use flow::storage::{Collection, CollectionStore, JsonFileStore};
use tempfile::TempDir;

#[test]
fn first_load_seeds_and_persists_defaults() {
    let dir = TempDir::new().expect("temp dir");
    let store = JsonFileStore::new(dir.path());

    let tasks = store.load(Collection::Tasks);
    assert!(!tasks.is_empty(), "bundled task seed should not be empty");
    assert!(store.collection_path(Collection::Tasks).exists());

    // The persisted file round-trips to the same records.
    let again = store.load(Collection::Tasks);
    assert_eq!(tasks, again);
}

#[test]
fn init_seeds_both_collections() {
    let dir = TempDir::new().expect("temp dir");
    let store = JsonFileStore::new(dir.path());
    store.init().expect("init");

    assert!(store.collection_path(Collection::Tasks).exists());
    assert!(store.collection_path(Collection::Categories).exists());

    let categories = store.load(Collection::Categories);
    let names: Vec<&str> = categories
        .iter()
        .filter_map(|c| c["name"].as_str())
        .collect();
    assert!(names.contains(&"Work"));
    assert!(names.contains(&"Personal"));
}

#[test]
fn save_then_load_round_trips() {
    let dir = TempDir::new().expect("temp dir");
    let store = JsonFileStore::new(dir.path());

    let records = vec![serde_json::json!({"id": 1, "title": "saved"})];
    assert!(store.save(Collection::Tasks, &records));
    assert_eq!(store.load(Collection::Tasks), records);
}

#[test]
fn corrupt_file_loads_as_empty() {
    let dir = TempDir::new().expect("temp dir");
    let store = JsonFileStore::new(dir.path());

    std::fs::write(store.collection_path(Collection::Tasks), "{not json").expect("write");
    assert!(store.load(Collection::Tasks).is_empty());
}

#[test]
fn save_replaces_rather_than_appends() {
    let dir = TempDir::new().expect("temp dir");
    let store = JsonFileStore::new(dir.path());

    store.save(Collection::Categories, &[serde_json::json!({"id": 1})]);
    store.save(Collection::Categories, &[serde_json::json!({"id": 2})]);

    let records = store.load(Collection::Categories);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], 2);
}

#[test]
fn save_leaves_no_temp_file_behind() {
    let dir = TempDir::new().expect("temp dir");
    let store = JsonFileStore::new(dir.path());

    store.save(Collection::Tasks, &[serde_json::json!({"id": 1})]);
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .expect("read dir")
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "tmp"))
        .collect();
    assert!(leftovers.is_empty());
}
