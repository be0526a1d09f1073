//! Domain types shared across the ankr crates.
//!
//! The central entity is [`ActionCall`]: a persisted, stateful request to
//! perform a named side-effecting operation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Principal recorded when no authenticated requester is available.
pub const DEFAULT_ACTOR: &str = "dev";

/// Current UTC time truncated to millisecond precision.
///
/// Timestamps are persisted as epoch milliseconds, so values produced here
/// compare equal after a storage round trip.
pub fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

// =============================================================================
// Enums
// =============================================================================

/// Lifecycle states of an action call.
///
/// `Requested -> Acknowledged -> Executing -> {Succeeded, Failed, Cancelled}`,
/// with `Requested -> Executing` also permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCallStatus {
    Requested,
    Acknowledged,
    Executing,
    Succeeded,
    Failed,
    Cancelled,
}

impl ActionCallStatus {
    /// Terminal states admit no further transition without a forced re-execution.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ActionCallStatus::Succeeded | ActionCallStatus::Failed | ActionCallStatus::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionCallStatus::Requested => "requested",
            ActionCallStatus::Acknowledged => "acknowledged",
            ActionCallStatus::Executing => "executing",
            ActionCallStatus::Succeeded => "succeeded",
            ActionCallStatus::Failed => "failed",
            ActionCallStatus::Cancelled => "cancelled",
        }
    }

    pub const ALL: [ActionCallStatus; 6] = [
        ActionCallStatus::Requested,
        ActionCallStatus::Acknowledged,
        ActionCallStatus::Executing,
        ActionCallStatus::Succeeded,
        ActionCallStatus::Failed,
        ActionCallStatus::Cancelled,
    ];
}

impl fmt::Display for ActionCallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActionCallStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "requested" => Ok(ActionCallStatus::Requested),
            "acknowledged" => Ok(ActionCallStatus::Acknowledged),
            "executing" => Ok(ActionCallStatus::Executing),
            "succeeded" => Ok(ActionCallStatus::Succeeded),
            "failed" => Ok(ActionCallStatus::Failed),
            "cancelled" => Ok(ActionCallStatus::Cancelled),
            _ => Err(format!("Unknown action call status: {}", s)),
        }
    }
}

// =============================================================================
// Domain Structs
// =============================================================================

/// A persisted request to perform a named action.
///
/// `params` is never mutated after creation. `executed_at` and `executed_by`
/// are set together, once, at the first transition into a terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionCall {
    pub id: Uuid,
    pub thread_id: Option<String>,
    pub source_message_id: Option<String>,
    pub requested_by: String,
    pub action_name: String,
    pub params: serde_json::Value,
    pub status: ActionCallStatus,
    pub acknowledged_by: Option<String>,
    pub executed_by: Option<String>,
    pub executed_at: Option<DateTime<Utc>>,
    pub status_info: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields a caller supplies when requesting a new action call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActionCall {
    pub action_name: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub thread_id: Option<String>,
    pub source_message_id: Option<String>,
    pub requested_by: Option<String>,
}

impl NewActionCall {
    pub fn new(action_name: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            action_name: action_name.into(),
            params,
            ..Self::default()
        }
    }

    /// Materialize a fresh `requested` row with a new identifier.
    pub fn into_action_call(self) -> ActionCall {
        let now = now_millis();
        let params = if self.params.is_null() {
            serde_json::json!({})
        } else {
            self.params
        };
        ActionCall {
            id: Uuid::new_v4(),
            thread_id: self.thread_id,
            source_message_id: self.source_message_id,
            requested_by: self
                .requested_by
                .unwrap_or_else(|| DEFAULT_ACTOR.to_string()),
            action_name: self.action_name,
            params,
            status: ActionCallStatus::Requested,
            acknowledged_by: None,
            executed_by: None,
            executed_at: None,
            status_info: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One entry of the best-effort activity trail kept beside action calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: Uuid,
    pub action_call_id: Uuid,
    pub event: String,
    pub detail: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl ActivityEntry {
    pub fn new(action_call_id: Uuid, event: impl Into<String>, detail: Option<serde_json::Value>) -> Self {
        Self {
            id: Uuid::new_v4(),
            action_call_id,
            event: event.into(),
            detail,
            created_at: now_millis(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
