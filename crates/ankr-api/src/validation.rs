//! Request validation layer.
//!
//! Every mutating endpoint takes its body through [`ValidatedJson`], which
//! rejects malformed input with a `BAD_REQUEST` before any handler code runs.
//! Checks are structural only: types, required fields, enum membership.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use ankr_action::CompletionStatus;
use ankr_chat::ChatRequest;

use crate::error::ApiError;

const MAX_ACTION_NAME_CHARS: usize = 100;

/// Structural checks serde cannot express.
pub trait Validate {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// JSON body that passed deserialization and [`Validate`].
///
/// An empty body is read as `{}`, so endpoints whose fields are all optional
/// accept a bodiless POST.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read request body: {}", e)))?;
        parse_body(&bytes).map(ValidatedJson)
    }
}

/// Parse and validate a raw request body.
pub fn parse_body<T>(bytes: &[u8]) -> Result<T, ApiError>
where
    T: DeserializeOwned + Validate,
{
    let value: Value = if bytes.iter().all(u8::is_ascii_whitespace) {
        Value::Object(Default::default())
    } else {
        serde_json::from_slice(bytes)
            .map_err(|e| ApiError::BadRequest(format!("Malformed JSON: {}", e)))?
    };

    if !value.is_object() {
        return Err(ApiError::BadRequest(
            "Request body must be a JSON object".to_string(),
        ));
    }

    let parsed: T = serde_json::from_value(value)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))?;
    parsed.validate().map_err(ApiError::BadRequest)?;
    Ok(parsed)
}

fn non_blank(field: &str, value: &Option<String>) -> Result<(), String> {
    match value {
        Some(v) if v.trim().is_empty() => Err(format!("'{}' must not be blank", field)),
        _ => Ok(()),
    }
}

// =============================================================================
// Request schemas
// =============================================================================

/// Body for `POST /actions`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActionRequest {
    pub action_name: String,
    #[serde(default)]
    pub params: Option<Value>,
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub source_message_id: Option<String>,
    #[serde(default)]
    pub requested_by: Option<String>,
}

impl Validate for CreateActionRequest {
    fn validate(&self) -> Result<(), String> {
        let name = self.action_name.trim();
        if name.is_empty() {
            return Err("'actionName' must not be empty".to_string());
        }
        if name.chars().count() > MAX_ACTION_NAME_CHARS {
            return Err(format!(
                "'actionName' must be at most {} characters",
                MAX_ACTION_NAME_CHARS
            ));
        }
        non_blank("requestedBy", &self.requested_by)
    }
}

/// Body for `POST /actions/{id}/ack`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcknowledgeRequest {
    #[serde(default)]
    pub acknowledged_by: Option<String>,
}

impl Validate for AcknowledgeRequest {
    fn validate(&self) -> Result<(), String> {
        non_blank("acknowledgedBy", &self.acknowledged_by)
    }
}

/// Body for `POST /actions/{id}/execute`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    #[serde(default)]
    pub executor: Option<String>,
    #[serde(default)]
    pub force: Option<bool>,
}

impl Validate for ExecuteRequest {
    fn validate(&self) -> Result<(), String> {
        non_blank("executor", &self.executor)
    }
}

/// Body for `POST /actions/{id}/complete`. `status` must be terminal.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequest {
    pub status: CompletionStatus,
    #[serde(default)]
    pub executed_by: Option<String>,
    #[serde(default)]
    pub status_info: Option<Value>,
}

impl Validate for CompleteRequest {
    fn validate(&self) -> Result<(), String> {
        non_blank("executedBy", &self.executed_by)
    }
}

/// Body for `POST /actions/pump`. Out-of-range limits are clamped later.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PumpRequest {
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub executor: Option<String>,
}

impl Validate for PumpRequest {
    fn validate(&self) -> Result<(), String> {
        non_blank("executor", &self.executor)
    }
}

impl Validate for ChatRequest {
    fn validate(&self) -> Result<(), String> {
        if self.message.trim().is_empty() {
            return Err("'message' must not be empty".to_string());
        }
        Ok(())
    }
}
