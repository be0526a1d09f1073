//! Integration tests for the ankr HTTP API.
//!
//! Every endpoint is driven through the router with `oneshot`, covering happy
//! paths, validation failures, and storage failures. Each test builds its own
//! in-memory state.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use ankr_api::create_router;
use ankr_api::handlers::HealthResponse;
use ankr_api::state::AppState;
use ankr_core::config::AnkrConfig;
use ankr_core::error::AnkrError;
use ankr_storage::Database;

// =============================================================================
// Helpers
// =============================================================================

fn make_state_with(config: AnkrConfig) -> AppState {
    let db = Arc::new(Database::in_memory().unwrap());
    AppState::new(&config, db)
}

fn make_state() -> AppState {
    make_state_with(AnkrConfig::default())
}

fn make_dev_state() -> AppState {
    let mut config = AnkrConfig::default();
    config.actions.dev_listing_enabled = true;
    make_state_with(config)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::post(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, json: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(resp: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
}

/// Send one request against a router over `state` and return status and body.
async fn send(state: &AppState, req: Request<Body>) -> (StatusCode, Value) {
    let resp = create_router(state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    (status, body_json(resp).await)
}

/// Create an action call through the API and return its id.
async fn create(state: &AppState, body: Value) -> String {
    let (status, json) = send(state, post_json("/actions", &body.to_string())).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", json);
    json["action"]["id"].as_str().unwrap().to_string()
}

fn drop_table(state: &AppState, table: &str) {
    state
        .database
        .with_conn(|conn| {
            conn.execute_batch(&format!("DROP TABLE {}", table))
                .map_err(|e| AnkrError::Storage(e.to_string()))
        })
        .unwrap();
}

// =============================================================================
// Health and fallbacks
// =============================================================================

#[tokio::test]
async fn test_health_lists_registered_actions() {
    let state = make_state();
    let resp = create_router(state).oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let health: HealthResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.registered_actions.len(), 6);
    assert!(health.registered_actions.contains(&"UpdateSiteHours".to_string()));
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let (status, json) = send(&make_state(), get("/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_wrong_method_is_json_405() {
    let req = Request::delete("/actions").body(Body::empty()).unwrap();
    let (status, json) = send(&make_state(), req).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(json["error"], "METHOD_NOT_ALLOWED");
}

// =============================================================================
// Create / get
// =============================================================================

#[tokio::test]
async fn test_create_action_defaults() {
    let state = make_state();
    let (status, json) = send(
        &state,
        post_json("/actions", r#"{"actionName": "PreviewChanges"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let action = &json["action"];
    assert_eq!(action["status"], "requested");
    assert_eq!(action["requestedBy"], "dev");
    assert_eq!(action["params"], json!({}));
    assert!(action["executedAt"].is_null());
}

#[tokio::test]
async fn test_create_action_validation() {
    let state = make_state();
    for body in [
        r#"{}"#,
        r#"{"actionName": ""}"#,
        r#"{"actionName": 42}"#,
        r#"{"actionName": "SaveNote", "requestedBy": "  "}"#,
        r#"["SaveNote"]"#,
        r#"{not json"#,
    ] {
        let (status, json) = send(&state, post_json("/actions", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {} accepted", body);
        assert_eq!(json["error"], "BAD_REQUEST");
    }
}

#[tokio::test]
async fn test_get_action_round_trip() {
    let state = make_state();
    let id = create(
        &state,
        json!({"actionName": "SaveNote", "params": {"text": "hi"}, "threadId": "t-1"}),
    )
    .await;

    let (status, json) = send(&state, get(&format!("/actions/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["action"]["id"], id.as_str());
    assert_eq!(json["action"]["threadId"], "t-1");
    assert_eq!(json["action"]["params"]["text"], "hi");
}

#[tokio::test]
async fn test_get_action_missing_and_malformed_ids() {
    let state = make_state();
    let (status, json) = send(&state, get(&format!("/actions/{}", Uuid::new_v4()))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "NOT_FOUND");

    let (status, json) = send(&state, get("/actions/not-a-uuid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "BAD_REQUEST");
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn test_save_note_executes_to_succeeded() {
    let state = make_state();
    let id = create(
        &state,
        json!({"actionName": "SaveNote", "params": {"text": "call back Tuesday"}}),
    )
    .await;

    let (status, json) = send(
        &state,
        post_json(
            &format!("/actions/{}/execute", id),
            r#"{"executor": "scheduler"}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let action = &json["action"];
    assert_eq!(action["status"], "succeeded");
    assert_eq!(action["executedBy"], "scheduler");
    assert!(action["executedAt"].is_string());
    assert!(action["statusInfo"]["noteId"].is_string());
}

#[tokio::test]
async fn test_unknown_action_executes_to_failed() {
    let state = make_state();
    let id = create(&state, json!({"actionName": "UnknownThing"})).await;

    let (status, json) = send(&state, post_empty(&format!("/actions/{}/execute", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["action"]["status"], "failed");
    assert_eq!(json["action"]["statusInfo"]["error"], "unknown_action");
    assert!(json["action"]["statusInfo"]["message"]
        .as_str()
        .unwrap()
        .contains("unregistered"));
}

#[tokio::test]
async fn test_executor_validation_error_is_failed_not_500() {
    let state = make_state();
    let id = create(&state, json!({"actionName": "SaveNote", "params": {}})).await;

    let (status, json) = send(&state, post_empty(&format!("/actions/{}/execute", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["action"]["status"], "failed");
    assert!(json["action"]["statusInfo"]["error"].is_string());
}

#[tokio::test]
async fn test_execute_is_idempotent_without_force() {
    let state = make_state();
    let id = create(
        &state,
        json!({"actionName": "CreateTopic", "params": {"title": "Spring Menu"}}),
    )
    .await;
    let uri = format!("/actions/{}/execute", id);

    let (_, first) = send(&state, post_json(&uri, r#"{"executor": "a"}"#)).await;
    assert_eq!(first["action"]["status"], "succeeded");

    let (status, second) = send(&state, post_json(&uri, r#"{"executor": "b"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["action"], first["action"]);
}

#[tokio::test]
async fn test_forced_reexecution_keeps_first_execution_stamp() {
    let state = make_state();
    let id = create(
        &state,
        json!({"actionName": "CreateTopic", "params": {"title": "Spring Menu"}}),
    )
    .await;
    let uri = format!("/actions/{}/execute", id);

    let (_, first) = send(&state, post_json(&uri, r#"{"executor": "a"}"#)).await;
    // Second run hits the duplicate-title check.
    let (status, second) = send(&state, post_json(&uri, r#"{"executor": "b", "force": true}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["action"]["status"], "failed");
    assert_eq!(second["action"]["executedBy"], "a");
    assert_eq!(second["action"]["executedAt"], first["action"]["executedAt"]);
}

#[tokio::test]
async fn test_execute_rejects_non_boolean_force() {
    let state = make_state();
    let id = create(&state, json!({"actionName": "PreviewChanges"})).await;
    let (status, _) = send(
        &state,
        post_json(&format!("/actions/{}/execute", id), r#"{"force": "yes"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_acknowledge_then_ack_again_is_noop() {
    let state = make_state();
    let id = create(&state, json!({"actionName": "PreviewChanges"})).await;
    let uri = format!("/actions/{}/ack", id);

    let (status, json) = send(&state, post_json(&uri, r#"{"acknowledgedBy": "ops"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["action"]["status"], "acknowledged");
    assert_eq!(json["action"]["acknowledgedBy"], "ops");

    let (status, again) = send(&state, post_json(&uri, r#"{"acknowledgedBy": "other"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["action"]["acknowledgedBy"], "ops");
}

#[tokio::test]
async fn test_acknowledge_defaults_to_sentinel_actor() {
    let state = make_state();
    let id = create(&state, json!({"actionName": "PreviewChanges"})).await;
    let (_, json) = send(&state, post_empty(&format!("/actions/{}/ack", id))).await;
    assert_eq!(json["action"]["acknowledgedBy"], "dev");
}

#[tokio::test]
async fn test_acknowledge_missing_is_404() {
    let (status, _) = send(
        &make_state(),
        post_empty(&format!("/actions/{}/ack", Uuid::new_v4())),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_complete_sets_terminal_status() {
    let state = make_state();
    let id = create(&state, json!({"actionName": "PreviewChanges"})).await;
    let uri = format!("/actions/{}/complete", id);

    let (status, json) = send(
        &state,
        post_json(
            &uri,
            r#"{"status": "cancelled", "executedBy": "ops", "statusInfo": {"reason": "dup"}}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["action"]["status"], "cancelled");
    assert_eq!(json["action"]["executedBy"], "ops");
    assert_eq!(json["action"]["statusInfo"]["reason"], "dup");

    // Already terminal: unchanged.
    let (_, again) = send(&state, post_json(&uri, r#"{"status": "succeeded"}"#)).await;
    assert_eq!(again["action"]["status"], "cancelled");
}

#[tokio::test]
async fn test_complete_rejects_non_terminal_status() {
    let state = make_state();
    let id = create(&state, json!({"actionName": "PreviewChanges"})).await;
    for body in [r#"{"status": "executing"}"#, r#"{}"#] {
        let (status, json) = send(
            &state,
            post_json(&format!("/actions/{}/complete", id), body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "BAD_REQUEST");
    }
}

// =============================================================================
// Pump
// =============================================================================

#[tokio::test]
async fn test_pump_processes_oldest_first() {
    let state = make_state();
    let mut ids = Vec::new();
    for i in 0..5 {
        ids.push(
            create(
                &state,
                json!({"actionName": "SaveNote", "params": {"text": format!("note {}", i)}}),
            )
            .await,
        );
    }

    let (status, json) = send(
        &state,
        post_json("/actions/pump", r#"{"limit": 2, "executor": "cron"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["processed"], 2);
    let results = json["results"].as_array().unwrap();
    assert_eq!(results[0]["id"], ids[0].as_str());
    assert_eq!(results[1]["id"], ids[1].as_str());
    assert_eq!(results[0]["status"], "succeeded");

    let (_, third) = send(&state, get(&format!("/actions/{}", ids[2]))).await;
    assert_eq!(third["action"]["status"], "requested");
}

#[tokio::test]
async fn test_pump_continues_past_failing_items() {
    let state = make_state();
    create(&state, json!({"actionName": "UnknownThing"})).await;
    create(&state, json!({"actionName": "SaveNote", "params": {"text": "ok"}})).await;

    let (status, json) = send(&state, post_empty("/actions/pump")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["processed"], 2);
    assert_eq!(json["results"][0]["status"], "failed");
    assert_eq!(json["results"][1]["status"], "succeeded");
}

#[tokio::test]
async fn test_pump_clamps_limit_and_rejects_non_integer() {
    let state = make_state();
    let (status, json) = send(&state, post_json("/actions/pump", r#"{"limit": 500}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["processed"], 0);

    let (status, _) = send(&state, post_json("/actions/pump", r#"{"limit": "two"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_listing_is_forbidden_by_default() {
    let (status, json) = send(&make_state(), get("/actions")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"], "FORBIDDEN");
}

#[tokio::test]
async fn test_listing_filters_by_status_newest_first() {
    let state = make_dev_state();
    let first = create(&state, json!({"actionName": "PreviewChanges"})).await;
    let second = create(&state, json!({"actionName": "PreviewChanges"})).await;
    let acked = create(&state, json!({"actionName": "PreviewChanges"})).await;
    send(&state, post_empty(&format!("/actions/{}/ack", acked))).await;

    let (status, json) = send(&state, get("/actions?status=requested")).await;
    assert_eq!(status, StatusCode::OK);
    let actions = json["actions"].as_array().unwrap();
    assert_eq!(actions.len(), 2);
    assert_eq!(actions[0]["id"], second.as_str());
    assert_eq!(actions[1]["id"], first.as_str());

    let (_, limited) = send(&state, get("/actions?limit=1")).await;
    assert_eq!(limited["actions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_listing_rejects_bad_query() {
    let state = make_dev_state();
    let (status, _) = send(&state, get("/actions?status=done")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&state, get("/actions?limit=many")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Storage failures
// =============================================================================

#[tokio::test]
async fn test_storage_failures_map_to_endpoint_codes() {
    let state = make_dev_state();
    drop_table(&state, "action_calls");
    let id = Uuid::new_v4();

    let cases = [
        (post_json("/actions", r#"{"actionName": "SaveNote"}"#), "CREATE_FAILED"),
        (get(&format!("/actions/{}", id)), "DB_FETCH_FAILED"),
        (post_empty(&format!("/actions/{}/ack", id)), "DB_UPDATE_FAILED"),
        (post_empty(&format!("/actions/{}/execute", id)), "EXECUTE_FAILED"),
        (
            post_json(&format!("/actions/{}/complete", id), r#"{"status": "failed"}"#),
            "DB_UPDATE_FAILED",
        ),
        (post_empty("/actions/pump"), "PUMP_FAILED"),
        (get("/actions"), "LIST_FAILED"),
    ];
    for (req, code) in cases {
        let uri = req.uri().to_string();
        let (status, json) = send(&state, req).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
        assert_eq!(json["error"], code, "{}", uri);
    }
}

#[tokio::test]
async fn test_activity_log_failure_does_not_fail_lifecycle() {
    let state = make_state();
    drop_table(&state, "activity_log");

    let id = create(&state, json!({"actionName": "SaveNote", "params": {"text": "x"}})).await;
    let (status, json) = send(&state, post_empty(&format!("/actions/{}/execute", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["action"]["status"], "succeeded");
}

// =============================================================================
// Suggest
// =============================================================================

#[tokio::test]
async fn test_suggest_content_goal() {
    let body = json!({
        "analysis": {"goal": "grow organic traffic", "category": "ContentOrSEO"},
        "availableActions": ["CreateTopic", "SaveNote", "DraftNextSteps"]
    });
    let (status, json) = send(
        &make_state(),
        post_json("/automation/suggest", &body.to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["autoActions"],
        json!(["CreateTopic", "SaveNote", "DraftNextSteps"])
    );
}

#[tokio::test]
async fn test_suggest_filters_to_available_actions() {
    let body = json!({
        "analysis": {"goal": "grow organic traffic", "category": "ContentOrSEO"},
        "availableActions": ["DraftNextSteps"]
    });
    let (_, json) = send(
        &make_state(),
        post_json("/automation/suggest", &body.to_string()),
    )
    .await;
    assert_eq!(json["autoActions"], json!(["DraftNextSteps"]));
}

#[tokio::test]
async fn test_suggest_tolerates_unknown_or_null_analysis_fields() {
    let state = make_state();
    for analysis in [
        json!({"category": "Marketing", "goal": "grow organic traffic"}),
        json!({"category": null, "goal": "grow organic traffic"}),
        json!({"confidence": null, "goal": "grow organic traffic"}),
    ] {
        let body = json!({"analysis": analysis, "availableActions": ["CreateTopic", "SaveNote"]});
        let (status, json) = send(&state, post_json("/automation/suggest", &body.to_string())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["autoActions"], json!(["CreateTopic", "SaveNote"]), "analysis {}", analysis);
    }
}

#[tokio::test]
async fn test_suggest_fails_open() {
    let state = make_state();
    for body in ["", "{broken", r#"{"analysis": 5}"#] {
        let (status, json) = send(&state, post_json("/automation/suggest", body)).await;
        assert_eq!(status, StatusCode::OK, "body {:?}", body);
        assert_eq!(json["autoActions"], json!([]));
    }
}

// =============================================================================
// Chat
// =============================================================================

#[tokio::test]
async fn test_chat_hours_message_proposes_site_hours() {
    let body = json!({"message": "Please update our hours, we are closed on Sunday", "threadId": "t-9"});
    let (status, json) = send(&make_state(), post_json("/chat", &body.to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["threadId"], "t-9");
    assert!(json["plan"]["fieldsOfInterest"]
        .as_array()
        .unwrap()
        .contains(&json!("Business Hours")));
    assert_eq!(json["plan"]["suggestions"][0]["name"], "UpdateSiteHours");
    assert!(json["plan"]["autoActions"]
        .as_array()
        .unwrap()
        .contains(&json!("UpdateSiteHours")));
    assert!(json["intent"].as_array().unwrap().contains(&json!("update_hours")));
    assert!(!json["assistantContent"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_chat_generates_thread_id_and_plan_mode() {
    let body = json!({"message": "Plan a blog post series about spring recipes", "mode": "plan"});
    let (status, json) = send(&make_state(), post_json("/chat", &body.to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(Uuid::parse_str(json["threadId"].as_str().unwrap()).is_ok());
    assert!(json["assistantContent"].as_str().unwrap().contains("1."));
}

#[tokio::test]
async fn test_chat_rejects_empty_and_oversized_messages() {
    let mut config = AnkrConfig::default();
    config.analyzer.max_message_chars = 10;
    let state = make_state_with(config);

    for body in [r#"{"message": "   "}"#, r#"{}"#, r#"{"message": "far too long for the limit"}"#] {
        let (status, json) = send(&state, post_json("/chat", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {}", body);
        assert_eq!(json["error"], "BAD_REQUEST");
    }
}
