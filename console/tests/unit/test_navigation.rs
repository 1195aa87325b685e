//! Filter navigation tests against the in-process backend

use std::collections::HashMap;
use std::sync::Arc;

use openapi_client::models::OrganizationEventTargetType;

use stagehand::filter::navigator::{FilterNavigator, NavigationOutcome};
use stagehand::filter::resolver::{get_next_filter_level, FilterContext};
use stagehand::filter::state::{FilterLevelKey, HierarchicalFilterState};
use stagehand::http::client::HttpClient;

use crate::test_http::spawn_backend;

fn context() -> FilterContext {
    let mut context = FilterContext::new("org-1");
    context.event_type = Some("DEPLOY_STARTED".to_string());
    context
}

#[tokio::test]
async fn test_navigate_service_scoped_type_to_completion() {
    let (base_url, log) = spawn_backend().await;
    let client = Arc::new(HttpClient::new(&base_url).unwrap());
    let mut navigator = FilterNavigator::new(client, context());

    let outcome = navigator.select("APPLICATION").await.unwrap();
    let NavigationOutcome::Descended(projects) = outcome else {
        panic!("expected the project level");
    };
    assert_eq!(projects.key, FilterLevelKey::ProjectId);
    assert_eq!(projects.items.len(), 2);
    assert_eq!(projects.items[1].label, "");

    navigator.select("p1").await.unwrap();
    assert_eq!(navigator.current_level().key, FilterLevelKey::EnvironmentId);

    navigator.select("e1").await.unwrap();
    assert_eq!(navigator.current_level().title, "Select Application");

    let outcome = navigator.select("t1").await.unwrap();
    assert_eq!(outcome, NavigationOutcome::Completed);
    assert!(navigator.state().is_final_selection());
    assert_eq!(
        navigator.breadcrumb(),
        vec!["Application", "Shop", "production", "front"]
    );

    let seen = log.lock().unwrap().clone();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0].query.get("targetFetchLevel").map(String::as_str), Some("PROJECT"));
    assert_eq!(seen[1].query.get("targetFetchLevel").map(String::as_str), Some("ENVIRONMENT"));
    assert_eq!(seen[1].query.get("projectId").map(String::as_str), Some("p1"));
    assert!(!seen[2].query.contains_key("targetFetchLevel"));
    assert_eq!(seen[2].query.get("environmentId").map(String::as_str), Some("e1"));
    assert!(seen
        .iter()
        .all(|s| s.query.get("eventType").map(String::as_str) == Some("DEPLOY_STARTED")));
}

#[tokio::test]
async fn test_restore_from_query_params() {
    let (base_url, log) = spawn_backend().await;
    let client = Arc::new(HttpClient::new(&base_url).unwrap());
    let mut navigator = FilterNavigator::new(client, context());

    let params: HashMap<String, String> = [
        ("targetType", "DATABASE"),
        ("projectId", "p1"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    let saved = HierarchicalFilterState::from_query_params(&params).unwrap();

    navigator.restore(&saved).await.unwrap();

    assert_eq!(navigator.depth(), 2);
    assert_eq!(navigator.current_level().key, FilterLevelKey::EnvironmentId);
    assert_eq!(navigator.breadcrumb(), vec!["Database", "Shop"]);
    assert_eq!(navigator.state().project_name.as_deref(), Some("Shop"));
    assert_eq!(log.lock().unwrap().len(), 2);

    assert!(navigator.back());
    assert_eq!(navigator.current_level().key, FilterLevelKey::ProjectId);
}

#[tokio::test]
async fn test_unreachable_backend_yields_empty_level() {
    let client = HttpClient::new("http://127.0.0.1:1").unwrap();
    let state = HierarchicalFilterState {
        target_type: Some(OrganizationEventTargetType::Cluster),
        ..Default::default()
    };

    let level = get_next_filter_level(&state, &context(), &client)
        .await
        .unwrap();

    assert_eq!(level.key, FilterLevelKey::TargetId);
    assert_eq!(level.title, "Select Cluster");
    assert!(level.items.is_empty());
}
