//! HTTP handler functions for all API endpoints.
//!
//! Each handler maps lifecycle failures to the error code of its endpoint;
//! a missing row is always `NOT_FOUND`.

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use ankr_action::{Analysis, Completion, ExecuteOptions, PumpReport};
use ankr_chat::{ChatError, ChatRequest, ChatResponse};
use ankr_core::types::{ActionCall, ActionCallStatus, NewActionCall};

use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::{
    AcknowledgeRequest, CompleteRequest, CreateActionRequest, ExecuteRequest, PumpRequest,
    ValidatedJson,
};

/// Upper bound for the listing page size.
const MAX_LIST_LIMIT: u32 = 500;

// =============================================================================
// Query parameter types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
    pub limit: Option<String>,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ActionResponse {
    pub action: ActionCall,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActionListResponse {
    pub actions: Vec<ActionCall>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestResponse {
    pub auto_actions: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub registered_actions: Vec<String>,
}

// =============================================================================
// Helpers
// =============================================================================

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|_| ApiError::BadRequest(format!("Invalid action call id '{}'", raw)))
}

// =============================================================================
// Handler functions
// =============================================================================

/// GET /health - liveness and registered executors.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        registered_actions: state.lifecycle.registry().names(),
    })
}

/// POST /actions - persist a new action call in `requested` state.
pub async fn create_action(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateActionRequest>,
) -> Result<(StatusCode, Json<ActionResponse>), ApiError> {
    let request = NewActionCall {
        action_name: body.action_name.trim().to_string(),
        params: body.params.unwrap_or(serde_json::Value::Null),
        thread_id: body.thread_id,
        source_message_id: body.source_message_id,
        requested_by: body.requested_by,
    };
    let action = state
        .lifecycle
        .create(request)
        .map_err(|e| ApiError::lifecycle(e, ApiError::CreateFailed))?;
    Ok((StatusCode::CREATED, Json(ActionResponse { action })))
}

/// GET /actions - newest-first listing, only when enabled in config.
pub async fn list_actions(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ActionListResponse>, ApiError> {
    if !state.settings.dev_listing_enabled {
        return Err(ApiError::Forbidden(
            "Action listing is disabled".to_string(),
        ));
    }
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let status = params
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<ActionCallStatus>)
        .transpose()
        .map_err(ApiError::BadRequest)?;

    let limit = match params.limit.as_deref().filter(|s| !s.is_empty()) {
        None => state.settings.list_default_limit,
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| ApiError::BadRequest(format!("Invalid limit '{}'", raw)))?,
    }
    .clamp(1, MAX_LIST_LIMIT);

    let actions = state
        .lifecycle
        .list(status, limit)
        .map_err(|e| ApiError::lifecycle(e, ApiError::ListFailed))?;
    Ok(Json(ActionListResponse { actions }))
}

/// GET /actions/{id}
pub async fn get_action(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, ApiError> {
    let id = parse_id(&id)?;
    let action = state
        .lifecycle
        .get(id)
        .map_err(|e| ApiError::lifecycle(e, ApiError::DbFetchFailed))?;
    Ok(Json(ActionResponse { action }))
}

/// POST /actions/{id}/ack
pub async fn acknowledge_action(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<AcknowledgeRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    let id = parse_id(&id)?;
    let action = state
        .lifecycle
        .acknowledge(id, body.acknowledged_by.as_deref())
        .map_err(|e| ApiError::lifecycle(e, ApiError::DbUpdateFailed))?;
    Ok(Json(ActionResponse { action }))
}

/// POST /actions/{id}/execute
///
/// An executor failing or an unknown action name is still a 200: the call
/// comes back in the `failed` state.
pub async fn execute_action(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<ExecuteRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    let id = parse_id(&id)?;
    let options = ExecuteOptions {
        force: body.force.unwrap_or(false),
    };
    let action = state
        .lifecycle
        .execute(id, body.executor.as_deref(), options)
        .await
        .map_err(|e| ApiError::lifecycle(e, ApiError::ExecuteFailed))?;
    Ok(Json(ActionResponse { action }))
}

/// POST /actions/{id}/complete
pub async fn complete_action(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<CompleteRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    let id = parse_id(&id)?;
    let completion = Completion {
        status: body.status,
        executed_by: body.executed_by,
        status_info: body.status_info,
    };
    let action = state
        .lifecycle
        .complete(id, completion)
        .map_err(|e| ApiError::lifecycle(e, ApiError::DbUpdateFailed))?;
    Ok(Json(ActionResponse { action }))
}

/// POST /actions/pump - drain the oldest requested calls.
pub async fn pump_actions(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<PumpRequest>,
) -> Result<Json<PumpReport>, ApiError> {
    let report = state
        .pump
        .pump(body.limit, body.executor.as_deref())
        .await
        .map_err(|e| ApiError::PumpFailed(e.to_string()))?;
    Ok(Json(report))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuggestRequest {
    #[serde(default)]
    analysis: Analysis,
    #[serde(default)]
    available_actions: Vec<String>,
}

/// POST /automation/suggest - heuristic proposals. Never fails: anything
/// unreadable yields an empty list.
pub async fn suggest_actions(State(state): State<AppState>, body: Bytes) -> Json<SuggestResponse> {
    let auto_actions = match serde_json::from_slice::<SuggestRequest>(&body) {
        Ok(request) => state
            .proposals
            .suggest(&request.analysis, &request.available_actions),
        Err(e) => {
            warn!(error = %e, "Unreadable suggest request, returning no actions");
            Vec::new()
        }
    };
    Json(SuggestResponse { auto_actions })
}

/// POST /chat - analyze a message and propose a plan.
pub async fn chat(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let response = state
        .chat
        .handle_message(&body)
        .await
        .map_err(|e| match e {
            ChatError::EmptyMessage | ChatError::MessageTooLong(_) => {
                ApiError::BadRequest(e.to_string())
            }
        })?;
    Ok(Json(response))
}

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("No such endpoint".to_string())
}

/// Fallback for a known path with an unsupported method.
pub async fn method_not_allowed() -> (StatusCode, Json<crate::error::ErrorBody>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(crate::error::ErrorBody {
            error: "METHOD_NOT_ALLOWED".to_string(),
            message: "Method not allowed for this endpoint".to_string(),
        }),
    )
}
