//! CreateChangeRequest executor.
//!
//! Records a proposed change to a site field for later review. Nothing on
//! the site itself changes until the request is applied.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use ankr_storage::SiteRepository;

use crate::error::ExecutorError;
use crate::handler::{optional_str, required_str, ActionExecutor};
use crate::types::ActionName;

pub struct CreateChangeRequestExecutor {
    site: Arc<SiteRepository>,
}

impl CreateChangeRequestExecutor {
    pub fn new(site: Arc<SiteRepository>) -> Self {
        Self { site }
    }
}

#[async_trait]
impl ActionExecutor for CreateChangeRequestExecutor {
    fn name(&self) -> &str {
        ActionName::CreateChangeRequest.as_str()
    }

    async fn execute(&self, params: &Value) -> Result<Value, ExecutorError> {
        let field = required_str(params, "field")?;
        let value = match params.get("value") {
            None | Some(Value::Null) => {
                return Err(ExecutorError::InvalidParams("'value' is required".to_string()))
            }
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };
        let note = optional_str(params, "note")?;

        let request = self.site.create_change_request(field, &value, note)?;
        tracing::info!(change_request_id = %request.id, field = %field, "Change request created");

        Ok(json!({
            "changeRequestId": request.id,
            "field": request.field,
            "status": request.status,
        }))
    }
}
