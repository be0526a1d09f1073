//! PreviewChanges executor.
//!
//! Read-only: pairs each open change request with the field's current value.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use ankr_storage::SiteRepository;

use crate::error::ExecutorError;
use crate::handler::{optional_str, ActionExecutor};
use crate::types::ActionName;

pub struct PreviewChangesExecutor {
    site: Arc<SiteRepository>,
}

impl PreviewChangesExecutor {
    pub fn new(site: Arc<SiteRepository>) -> Self {
        Self { site }
    }
}

/// Stored values are JSON when they parse as JSON, plain strings otherwise.
fn decode_value(raw: String) -> Value {
    match serde_json::from_str::<Value>(&raw) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => value,
        _ => Value::String(raw),
    }
}

#[async_trait]
impl ActionExecutor for PreviewChangesExecutor {
    fn name(&self) -> &str {
        ActionName::PreviewChanges.as_str()
    }

    async fn execute(&self, params: &Value) -> Result<Value, ExecutorError> {
        let field = optional_str(params, "field")?;
        let requests = self.site.open_change_requests(field)?;

        let mut changes = Vec::with_capacity(requests.len());
        for request in requests {
            let current = self
                .site
                .get_setting(&request.field)?
                .map(decode_value)
                .unwrap_or(Value::Null);
            changes.push(json!({
                "changeRequestId": request.id,
                "field": request.field,
                "current": current,
                "proposed": decode_value(request.value),
                "note": request.note,
            }));
        }

        Ok(json!({
            "count": changes.len(),
            "changes": changes,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ankr_storage::Database;

    fn make_executor() -> (PreviewChangesExecutor, Arc<SiteRepository>) {
        let db = Arc::new(Database::in_memory().unwrap());
        let site = Arc::new(SiteRepository::new(db));
        (PreviewChangesExecutor::new(site.clone()), site)
    }

    #[tokio::test]
    async fn test_preview_empty() {
        let (executor, _) = make_executor();
        let result = executor.execute(&json!({})).await.unwrap();
        assert_eq!(result["count"], 0);
        assert_eq!(result["changes"], json!([]));
    }

    #[tokio::test]
    async fn test_preview_pairs_current_and_proposed() {
        let (executor, site) = make_executor();
        site.put_setting("phone", "555-0000").unwrap();
        site.create_change_request("phone", "555-0100", None).unwrap();
        site.create_change_request("hours", r#"{"mon":"closed"}"#, None).unwrap();

        let result = executor.execute(&json!({})).await.unwrap();
        assert_eq!(result["count"], 2);
        assert_eq!(result["changes"][0]["field"], "phone");
        assert_eq!(result["changes"][0]["current"], "555-0000");
        assert_eq!(result["changes"][0]["proposed"], "555-0100");
        assert_eq!(result["changes"][1]["current"], Value::Null);
        assert_eq!(result["changes"][1]["proposed"]["mon"], "closed");
    }

    #[tokio::test]
    async fn test_preview_filters_by_field() {
        let (executor, site) = make_executor();
        site.create_change_request("phone", "555-0100", None).unwrap();
        site.create_change_request("pricing", "30", None).unwrap();

        let result = executor.execute(&json!({"field": "pricing"})).await.unwrap();
        assert_eq!(result["count"], 1);
        assert_eq!(result["changes"][0]["proposed"], "30");
    }

    #[tokio::test]
    async fn test_preview_does_not_mutate() {
        let (executor, site) = make_executor();
        site.create_change_request("phone", "555-0100", None).unwrap();
        executor.execute(&json!({})).await.unwrap();
        executor.execute(&json!({})).await.unwrap();
        assert_eq!(site.open_change_requests(None).unwrap().len(), 1);
    }
}
