use flow::config::RemoteConfig;
use flow::error::Error;
use flow::remote::{
    partition_results, RecordResult, RemoteCategoryRepo, RemoteClient, RemoteTaskRepo,
    TaskRecordWire,
};
use flow::service::{CategoryService, TaskService};
use flow::task::NewTask;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn remote_config(server: &MockServer) -> RemoteConfig {
    RemoteConfig {
        base_url: Some(server.uri()),
        api_key: Some("test-key".to_string()),
    }
}

fn task_record_json(id: u32, title: &str, completed: bool) -> serde_json::Value {
    serde_json::json!({
        "Id": id,
        "title_c": title,
        "description_c": "",
        "priority_c": "medium",
        "category_c": "work",
        "completed_c": completed,
        "created_at_c": "2026-03-01T10:00:00Z",
        "due_date_c": null,
    })
}

#[test]
fn client_requires_a_base_url() {
    let err = RemoteClient::new(&RemoteConfig::default()).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[tokio::test]
async fn query_translates_wire_fields_to_tasks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/task_c/query"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": [task_record_json(1, "report", false)],
        })))
        .mount(&server)
        .await;

    let repo = RemoteTaskRepo::new(RemoteClient::new(&remote_config(&server)).unwrap());
    let tasks = repo.get_all().await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, 1);
    assert_eq!(tasks[0].title, "report");
    assert_eq!(tasks[0].category, "work");
}

#[tokio::test]
async fn create_sends_wire_record_without_an_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/task_c/create"))
        .and(body_partial_json(serde_json::json!({
            "records": [{"title_c": "new task", "category_c": "personal"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "results": [{"success": true, "data": task_record_json(11, "new task", false)}],
        })))
        .mount(&server)
        .await;

    let repo = RemoteTaskRepo::new(RemoteClient::new(&remote_config(&server)).unwrap());
    let task = repo.create(NewTask::new("new task")).await.unwrap();
    assert_eq!(task.id, 11);
}

#[tokio::test]
async fn batch_create_partitions_per_record_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/task_c/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "results": [
                {"success": true, "data": task_record_json(1, "kept", false)},
                {"success": false, "message": "duplicate title"},
                {"success": true, "data": task_record_json(2, "also kept", false)},
            ],
        })))
        .mount(&server)
        .await;

    let repo = RemoteTaskRepo::new(RemoteClient::new(&remote_config(&server)).unwrap());
    let outcome = repo
        .create_many(vec![
            NewTask::new("kept"),
            NewTask::new("rejected"),
            NewTask::new("also kept"),
        ])
        .await
        .unwrap();

    assert_eq!(outcome.total(), 3);
    assert!(outcome.is_partial());
    assert_eq!(outcome.succeeded.len(), 2);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].index, 1);
    assert_eq!(outcome.failed[0].message, "duplicate title");
}

#[tokio::test]
async fn delete_of_missing_task_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/task_c/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": [],
        })))
        .mount(&server)
        .await;

    let repo = RemoteTaskRepo::new(RemoteClient::new(&remote_config(&server)).unwrap());
    let err = repo.delete(5).await.unwrap_err();
    assert!(matches!(err, Error::TaskNotFound(5)));
}

#[tokio::test]
async fn toggle_reads_then_updates_the_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/task_c/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": [task_record_json(3, "flip", false)],
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/task_c/update"))
        .and(body_partial_json(serde_json::json!({
            "records": [{"Id": 3, "completed_c": true}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "results": [{"success": true, "data": task_record_json(3, "flip", true)}],
        })))
        .mount(&server)
        .await;

    let repo = RemoteTaskRepo::new(RemoteClient::new(&remote_config(&server)).unwrap());
    let task = repo.toggle(3).await.unwrap();
    assert!(task.completed);
}

#[tokio::test]
async fn upstream_error_surfaces_the_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/category_c/query"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(serde_json::json!({"message": "record store offline"})),
        )
        .mount(&server)
        .await;

    let repo = RemoteCategoryRepo::new(RemoteClient::new(&remote_config(&server)).unwrap());
    let err = repo.get_all().await.unwrap_err();
    match err {
        Error::Upstream(message) => assert!(message.contains("record store offline")),
        other => panic!("expected upstream error, got {other}"),
    }
}

#[tokio::test]
async fn update_task_count_skips_unknown_names() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/category_c/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": [],
        })))
        .mount(&server)
        .await;

    // No update mock mounted: a miss must not issue an update call.
    let repo = RemoteCategoryRepo::new(RemoteClient::new(&remote_config(&server)).unwrap());
    repo.update_task_count("ghost", 3).await.unwrap();
}

// TaskRecordWire has no Default impl; decoding a result without a data
// field must not require one.
#[test]
fn record_result_decodes_without_a_data_field() {
    let result: RecordResult<TaskRecordWire> = serde_json::from_value(serde_json::json!({
        "success": false,
        "message": "duplicate title",
    }))
    .expect("record result");
    assert!(!result.success);
    assert!(result.data.is_none());
    assert_eq!(result.message.as_deref(), Some("duplicate title"));
}

#[test]
fn partition_handles_success_without_data() {
    let results: Vec<RecordResult<TaskRecordWire>> = vec![RecordResult {
        success: true,
        data: None,
        message: None,
    }];
    let outcome = partition_results(results, TaskRecordWire::into_task);
    assert!(outcome.succeeded.is_empty());
    assert_eq!(outcome.failed.len(), 1);
}
