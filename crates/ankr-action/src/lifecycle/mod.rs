//! Action call lifecycle management.
//!
//! Creation, acknowledgement, execution, and external completion of action
//! calls. Every transition is a single read-then-write against the store;
//! concurrent transitions on one id are last-writer-wins.

pub mod state_machine;

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use ankr_core::types::{
    now_millis, ActionCall, ActionCallStatus, ActivityEntry, NewActionCall, DEFAULT_ACTOR,
};
use ankr_storage::ActionCallStore;

use crate::error::LifecycleError;
use crate::handler::{ActionExecutor, ExecutorRegistry};
use crate::lifecycle::state_machine::validate_transition;
use crate::types::{Completion, ExecuteOptions};

/// Drives action calls through their state machine.
pub struct LifecycleController {
    store: Arc<dyn ActionCallStore>,
    registry: Arc<ExecutorRegistry>,
    default_actor: String,
}

impl LifecycleController {
    pub fn new(store: Arc<dyn ActionCallStore>, registry: Arc<ExecutorRegistry>) -> Self {
        Self {
            store,
            registry,
            default_actor: DEFAULT_ACTOR.to_string(),
        }
    }

    /// Principal recorded when a request names none.
    pub fn with_default_actor(mut self, actor: impl Into<String>) -> Self {
        self.default_actor = actor.into();
        self
    }

    pub fn registry(&self) -> &ExecutorRegistry {
        &self.registry
    }

    /// Persist a new call in `requested` state.
    ///
    /// The action name is not checked against the registry; executors may be
    /// registered after calls naming them are created.
    pub fn create(&self, request: NewActionCall) -> Result<ActionCall, LifecycleError> {
        let mut request = request;
        if request.requested_by.is_none() {
            request.requested_by = Some(self.default_actor.clone());
        }
        let call = request.into_action_call();
        self.store.insert(&call)?;

        info!(action_id = %call.id, action_name = %call.action_name, "Action call created");
        self.record_activity(call.id, "created", Some(json!({ "actionName": call.action_name })));
        Ok(call)
    }

    pub fn get(&self, id: Uuid) -> Result<ActionCall, LifecycleError> {
        self.store.find_by_id(id)?.ok_or(LifecycleError::NotFound(id))
    }

    /// Newest-first listing, optionally filtered by status.
    pub fn list(
        &self,
        status: Option<ActionCallStatus>,
        limit: u32,
    ) -> Result<Vec<ActionCall>, LifecycleError> {
        Ok(self.store.list(status, limit)?)
    }

    /// Oldest `requested` calls first, for the pump.
    pub fn oldest_requested(&self, limit: u32) -> Result<Vec<ActionCall>, LifecycleError> {
        Ok(self
            .store
            .oldest_with_status(ActionCallStatus::Requested, limit)?)
    }

    /// Acknowledge a `requested` call. Calls in any other state are returned
    /// unchanged.
    pub fn acknowledge(
        &self,
        id: Uuid,
        acknowledged_by: Option<&str>,
    ) -> Result<ActionCall, LifecycleError> {
        let mut call = self.get(id)?;
        if call.status != ActionCallStatus::Requested {
            debug!(action_id = %id, status = %call.status, "Acknowledge ignored");
            return Ok(call);
        }
        validate_transition(call.status, ActionCallStatus::Acknowledged)?;

        let actor = acknowledged_by.unwrap_or(&self.default_actor).to_string();
        call.status = ActionCallStatus::Acknowledged;
        call.acknowledged_by = Some(actor.clone());
        call.updated_at = now_millis();
        self.store.update(&call)?;

        info!(action_id = %id, acknowledged_by = %actor, "Action call acknowledged");
        self.record_activity(id, "acknowledged", Some(json!({ "acknowledgedBy": actor })));
        Ok(call)
    }

    /// Execute a call through the registry.
    ///
    /// A terminal call is returned unchanged unless `options.force` is set.
    /// Executor errors, panics, and unknown action names all end in the
    /// `failed` state; only store errors are returned as `Err`.
    pub async fn execute(
        &self,
        id: Uuid,
        executor: Option<&str>,
        options: ExecuteOptions,
    ) -> Result<ActionCall, LifecycleError> {
        let mut call = self.get(id)?;
        if call.status.is_terminal() && !options.force {
            debug!(action_id = %id, status = %call.status, "Execute skipped, already terminal");
            return Ok(call);
        }

        let actor = executor.unwrap_or(&self.default_actor).to_string();

        // A call left in `executing` by an interrupted run is resumed as-is.
        if call.status != ActionCallStatus::Executing {
            if !call.status.is_terminal() {
                validate_transition(call.status, ActionCallStatus::Executing)?;
            }
            call.status = ActionCallStatus::Executing;
            call.updated_at = now_millis();
            self.store.update(&call)?;
            info!(
                action_id = %id,
                action_name = %call.action_name,
                forced = options.force,
                "Action call executing"
            );
            self.record_activity(id, "executing", Some(json!({ "forced": options.force })));
        }

        let (status, status_info) = match self.registry.get(&call.action_name) {
            None => {
                warn!(action_id = %id, action_name = %call.action_name, "No executor registered");
                (
                    ActionCallStatus::Failed,
                    json!({
                        "error": "unknown_action",
                        "message": format!(
                            "Action '{}' is unregistered: no executor is registered under that name",
                            call.action_name
                        ),
                    }),
                )
            }
            Some(handler) => match run_isolated(handler, call.params.clone()).await {
                Ok(result) => (ActionCallStatus::Succeeded, result),
                Err(message) => {
                    warn!(action_id = %id, action_name = %call.action_name, error = %message, "Executor failed");
                    (ActionCallStatus::Failed, json!({ "error": message }))
                }
            },
        };

        self.finish(call, status, Some(status_info), actor)
            .inspect_err(|e| {
                warn!(
                    action_id = %id,
                    outcome = %status,
                    error = %e,
                    "Terminal write failed, call left in executing until re-executed"
                );
            })
    }

    /// Record an outcome reported by an executor outside this process.
    ///
    /// Calls already terminal are returned unchanged.
    pub fn complete(&self, id: Uuid, completion: Completion) -> Result<ActionCall, LifecycleError> {
        let call = self.get(id)?;
        if call.status.is_terminal() {
            debug!(action_id = %id, status = %call.status, "Complete ignored, already terminal");
            return Ok(call);
        }

        let status = ActionCallStatus::from(completion.status);
        validate_transition(call.status, status)?;

        let actor = completion
            .executed_by
            .unwrap_or_else(|| self.default_actor.clone());
        self.finish(call, status, completion.status_info, actor)
    }

    /// Write a terminal state. `executed_at`/`executed_by` are only set on
    /// the first terminal write.
    fn finish(
        &self,
        mut call: ActionCall,
        status: ActionCallStatus,
        status_info: Option<Value>,
        actor: String,
    ) -> Result<ActionCall, LifecycleError> {
        let now = now_millis();
        call.status = status;
        if status_info.is_some() {
            call.status_info = status_info;
        }
        if call.executed_at.is_none() {
            call.executed_at = Some(now);
            call.executed_by = Some(actor.clone());
        }
        call.updated_at = now;
        self.store.update(&call)?;

        info!(action_id = %call.id, status = %status, executed_by = %actor, "Action call finished");
        self.record_activity(
            call.id,
            status.as_str(),
            Some(json!({ "executedBy": actor })),
        );
        Ok(call)
    }

    /// Append to the activity log.
    ///
    /// Best-effort and non-transactional: runs after the primary write has
    /// committed, and a failure here is logged and never reported upward.
    fn record_activity(&self, action_call_id: Uuid, event: &str, detail: Option<Value>) {
        let entry = ActivityEntry::new(action_call_id, event, detail);
        if let Err(e) = self.store.record_activity(&entry) {
            warn!(action_id = %action_call_id, event, error = %e, "Failed to record activity");
        }
    }
}

/// Run an executor on its own task so a panic becomes an ordinary error.
async fn run_isolated(executor: Arc<dyn ActionExecutor>, params: Value) -> Result<Value, String> {
    let handle = tokio::spawn(async move { executor.execute(&params).await });
    match handle.await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(e)) => Err(e.to_string()),
        Err(e) if e.is_panic() => {
            let payload = e.into_panic();
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(format!("Executor panicked: {}", message))
        }
        Err(e) => Err(format!("Executor task failed: {}", e)),
    }
}
