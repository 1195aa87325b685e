//! HTTP client tests against an in-process backend

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, put};
use axum::{Json, Router};
use openapi_client::models::{DeploymentStageRequest, OrganizationEventTargetType};
use secrecy::SecretString;
use serde_json::{json, Value};

use stagehand::errors::ConsoleError;
use stagehand::filter::resolver::TargetSource;
use stagehand::http::client::HttpClient;
use stagehand::http::events::EventTargetsQuery;
use stagehand::pipeline::editor::{Placement, StageMutator, StageRequest};

/// Requests seen by the backend
#[derive(Debug, Clone, Default)]
pub struct Seen {
    pub method: &'static str,
    pub path: String,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

type Log = Arc<Mutex<Vec<Seen>>>;

fn record(log: &Log, method: &'static str, path: String, query: HashMap<String, String>, headers: &HeaderMap) {
    log.lock().unwrap().push(Seen {
        method,
        path,
        query,
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: None,
    });
}

fn record_body(log: &Log, method: &'static str, path: String, headers: &HeaderMap, body: Value) {
    record(log, method, path, HashMap::new(), headers);
    if let Some(seen) = log.lock().unwrap().last_mut() {
        seen.body = Some(body);
    }
}

fn stages_body() -> Value {
    json!({
        "results": [
            {
                "id": "stage-1",
                "name": "DATABASES",
                "deployment_order": 0,
                "services": [{ "id": "link-1", "service_id": "db" }]
            },
            {
                "id": "stage-2",
                "name": "APPS",
                "description": "stateless",
                "deployment_order": 1,
                "services": [{ "id": "link-2", "service_id": "api", "service_type": "APPLICATION" }]
            }
        ]
    })
}

async fn targets(
    State(log): State<Log>,
    Path(organization_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<Value> {
    let level = query.get("targetFetchLevel").cloned();
    record(&log, "GET", format!("/organization/{}/targets", organization_id), query, &headers);

    let body = match level.as_deref() {
        Some("PROJECT") => json!({ "targets": [{ "id": "p1", "name": "Shop" }, { "id": "p2" }] }),
        Some("ENVIRONMENT") => json!({ "targets": [{ "id": "e1", "name": "production" }] }),
        _ => json!({ "targets": [{ "id": "t1", "name": "front" }] }),
    };
    Json(body)
}

async fn list_stages(
    State(log): State<Log>,
    Path(environment_id): Path<String>,
    headers: HeaderMap,
) -> Json<Value> {
    record(
        &log,
        "GET",
        format!("/environment/{}/deploymentStage", environment_id),
        HashMap::new(),
        &headers,
    );
    Json(stages_body())
}

async fn attach_service(
    State(log): State<Log>,
    Path((stage, other)): Path<(String, String)>,
    headers: HeaderMap,
) -> Json<Value> {
    record(
        &log,
        "PUT",
        format!("/deploymentStage/{}/service/{}", stage, other),
        HashMap::new(),
        &headers,
    );
    Json(stages_body())
}

async fn move_before(
    State(log): State<Log>,
    Path((stage, other)): Path<(String, String)>,
    headers: HeaderMap,
) -> (StatusCode, String) {
    record(
        &log,
        "PUT",
        format!("/deploymentStage/{}/moveBefore/{}", stage, other),
        HashMap::new(),
        &headers,
    );
    (StatusCode::CONFLICT, "stage is locked".to_string())
}

async fn move_after(
    State(log): State<Log>,
    Path((stage, other)): Path<(String, String)>,
    headers: HeaderMap,
) -> Json<Value> {
    record(
        &log,
        "PUT",
        format!("/deploymentStage/{}/moveAfter/{}", stage, other),
        HashMap::new(),
        &headers,
    );
    Json(stages_body())
}

async fn create_stage(
    State(log): State<Log>,
    Path(environment_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let name = body["name"].clone();
    record_body(
        &log,
        "POST",
        format!("/environment/{}/deploymentStage", environment_id),
        &headers,
        body,
    );
    (
        StatusCode::CREATED,
        Json(json!({ "id": "stage-3", "name": name, "deployment_order": 2 })),
    )
}

async fn edit_stage(
    State(log): State<Log>,
    Path(stage): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let response = json!({
        "id": stage,
        "name": body["name"],
        "description": body["description"],
        "deployment_order": 0
    });
    record_body(&log, "PUT", format!("/deploymentStage/{}", stage), &headers, body);
    Json(response)
}

async fn delete_stage(
    State(log): State<Log>,
    Path(stage): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, String) {
    record(
        &log,
        "DELETE",
        format!("/deploymentStage/{}", stage),
        HashMap::new(),
        &headers,
    );
    if stage == "stage-1" {
        let error = json!({ "error": "Conflict", "message": "stage still has services" });
        return (StatusCode::CONFLICT, error.to_string());
    }
    (StatusCode::NO_CONTENT, String::new())
}

/// Start a backend on an ephemeral port; returns its base URL and request log
pub async fn spawn_backend() -> (String, Log) {
    let log: Log = Arc::default();
    let app = Router::new()
        .route("/organization/{organization}/targets", get(targets))
        .route(
            "/environment/{environment}/deploymentStage",
            get(list_stages).post(create_stage),
        )
        .route("/deploymentStage/{stage}", put(edit_stage).delete(delete_stage))
        .route("/deploymentStage/{stage}/service/{other}", put(attach_service))
        .route("/deploymentStage/{stage}/moveBefore/{other}", put(move_before))
        .route("/deploymentStage/{stage}/moveAfter/{other}", put(move_after))
        .with_state(log.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    (format!("http://{}", addr), log)
}

fn query(target_type: OrganizationEventTargetType) -> EventTargetsQuery {
    EventTargetsQuery {
        organization_id: "org-1".to_string(),
        from_timestamp: Some("100".to_string()),
        to_timestamp: Some("200".to_string()),
        event_type: None,
        target_type,
        triggered_by: None,
        origin: None,
        project_id: None,
        environment_id: None,
        target_fetch_level: None,
    }
}

#[tokio::test]
async fn test_fetch_targets_sends_query_and_token() {
    let (base_url, log) = spawn_backend().await;
    let client = HttpClient::with_api_token(&base_url, SecretString::from("s3cret".to_string())).unwrap();

    let targets = client
        .fetch_targets(&query(OrganizationEventTargetType::Cluster))
        .await
        .unwrap();

    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].id.as_deref(), Some("t1"));

    let seen = log.lock().unwrap()[0].clone();
    assert_eq!(seen.method, "GET");
    assert_eq!(seen.path, "/organization/org-1/targets");
    assert_eq!(seen.query.get("targetType").map(String::as_str), Some("CLUSTER"));
    assert_eq!(seen.query.get("fromTimestamp").map(String::as_str), Some("100"));
    assert!(!seen.query.contains_key("projectId"));
    assert_eq!(seen.authorization.as_deref(), Some("Token s3cret"));
}

#[tokio::test]
async fn test_client_without_token_sends_no_authorization() {
    let (base_url, log) = spawn_backend().await;
    let client = HttpClient::new(&format!("{}/", base_url)).unwrap();

    client
        .list_environment_deployment_stages("env-1")
        .await
        .unwrap();

    let seen = log.lock().unwrap()[0].clone();
    assert_eq!(seen.path, "/environment/env-1/deploymentStage");
    assert!(seen.authorization.is_none());
}

#[tokio::test]
async fn test_list_stages_decodes_optional_fields() {
    let (base_url, _) = spawn_backend().await;
    let client = HttpClient::new(&base_url).unwrap();

    let stages = client.list("env-1").await.unwrap();

    assert_eq!(stages.len(), 2);
    assert_eq!(stages[0].description, None);
    assert_eq!(stages[1].description.as_deref(), Some("stateless"));
    assert_eq!(stages[1].services[0].service_type.as_deref(), Some("APPLICATION"));
}

#[tokio::test]
async fn test_submit_dispatches_stage_requests() {
    let (base_url, log) = spawn_backend().await;
    let client = HttpClient::new(&base_url).unwrap();

    client
        .submit(&StageRequest::AttachService {
            stage_id: "stage-2".to_string(),
            service_id: "db".to_string(),
        })
        .await
        .unwrap();
    client
        .submit(&StageRequest::MoveStage {
            stage_id: "stage-1".to_string(),
            target_stage_id: "stage-2".to_string(),
            placement: Placement::After,
        })
        .await
        .unwrap();

    let paths: Vec<_> = log.lock().unwrap().iter().map(|s| s.path.clone()).collect();
    assert_eq!(
        paths,
        vec![
            "/deploymentStage/stage-2/service/db",
            "/deploymentStage/stage-1/moveAfter/stage-2",
        ]
    );
}

#[tokio::test]
async fn test_error_status_becomes_api_error() {
    let (base_url, _) = spawn_backend().await;
    let client = HttpClient::new(&base_url).unwrap();

    let result = client
        .move_deployment_stage("stage-2", "stage-1", Placement::Before)
        .await;

    match result {
        Err(ConsoleError::ApiError { status, body }) => {
            assert_eq!(status, 409);
            assert_eq!(body, "stage is locked");
        }
        other => panic!("expected an API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_create_stage_posts_body() {
    let (base_url, log) = spawn_backend().await;
    let client = HttpClient::new(&base_url).unwrap();

    let stage = client
        .create_environment_deployment_stage("env-1", &DeploymentStageRequest::new("CACHES"))
        .await
        .unwrap();

    assert_eq!(stage.id, "stage-3");
    assert_eq!(stage.name, "CACHES");
    let seen = log.lock().unwrap()[0].clone();
    assert_eq!(seen.method, "POST");
    assert_eq!(seen.path, "/environment/env-1/deploymentStage");
    assert_eq!(seen.body, Some(json!({ "name": "CACHES" })));
}

#[tokio::test]
async fn test_edit_stage_puts_name_and_description() {
    let (base_url, log) = spawn_backend().await;
    let client = HttpClient::new(&base_url).unwrap();
    let request = DeploymentStageRequest {
        name: "BACKENDS".to_string(),
        description: Some("api and workers".to_string()),
    };

    let stage = client.edit_deployment_stage("stage-2", &request).await.unwrap();

    assert_eq!(stage.id, "stage-2");
    assert_eq!(stage.name, "BACKENDS");
    assert_eq!(stage.description.as_deref(), Some("api and workers"));
    let seen = log.lock().unwrap()[0].clone();
    assert_eq!((seen.method, seen.path.as_str()), ("PUT", "/deploymentStage/stage-2"));
}

#[tokio::test]
async fn test_delete_stage_accepts_empty_response() {
    let (base_url, log) = spawn_backend().await;
    let client = HttpClient::new(&base_url).unwrap();

    client.delete_deployment_stage("stage-2").await.unwrap();

    let seen = log.lock().unwrap()[0].clone();
    assert_eq!((seen.method, seen.path.as_str()), ("DELETE", "/deploymentStage/stage-2"));
}

#[tokio::test]
async fn test_delete_refused_stage_is_api_error() {
    let (base_url, _) = spawn_backend().await;
    let client = HttpClient::new(&base_url).unwrap();

    let result = client.delete_deployment_stage("stage-1").await;

    match result {
        Err(ConsoleError::ApiError { status, body }) => {
            assert_eq!(status, 409);
            assert!(body.contains("stage still has services"));
        }
        other => panic!("expected an API error, got {:?}", other),
    }
}
