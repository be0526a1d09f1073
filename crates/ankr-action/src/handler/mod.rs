//! Executor registry and trait definition.
//!
//! Defines the `ActionExecutor` async trait and the process-wide registry
//! mapping action names to executors. The registry is populated once at
//! startup and only read afterwards.

pub mod change_request;
pub mod draft_next_steps;
pub mod preview_changes;
pub mod save_note;
pub mod site_hours;
pub mod topic;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use ankr_storage::SiteRepository;

use crate::error::ExecutorError;

pub use change_request::CreateChangeRequestExecutor;
pub use draft_next_steps::DraftNextStepsExecutor;
pub use preview_changes::PreviewChangesExecutor;
pub use save_note::SaveNoteExecutor;
pub use site_hours::UpdateSiteHoursExecutor;
pub use topic::CreateTopicExecutor;

/// Performs the side effect of one named action.
///
/// Executors validate their own params and never touch action call status;
/// the lifecycle controller owns every state transition.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    /// The action name this executor is registered under.
    fn name(&self) -> &str;

    /// Perform the action and return a result payload for `statusInfo`.
    async fn execute(&self, params: &Value) -> Result<Value, ExecutorError>;
}

/// Name to executor mapping.
#[derive(Default)]
pub struct ExecutorRegistry {
    executors: HashMap<String, Arc<dyn ActionExecutor>>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the six built-in executors over the site tables.
    pub fn with_defaults(site: Arc<SiteRepository>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(CreateTopicExecutor::new(site.clone())));
        registry.register(Arc::new(SaveNoteExecutor::new(site.clone())));
        registry.register(Arc::new(DraftNextStepsExecutor::new(site.clone())));
        registry.register(Arc::new(UpdateSiteHoursExecutor::new(site.clone())));
        registry.register(Arc::new(CreateChangeRequestExecutor::new(site.clone())));
        registry.register(Arc::new(PreviewChangesExecutor::new(site)));
        registry
    }

    /// Register an executor, replacing any previous one with the same name.
    pub fn register(&mut self, executor: Arc<dyn ActionExecutor>) {
        let name = executor.name().to_string();
        if self.executors.insert(name.clone(), executor).is_some() {
            tracing::warn!(action_name = %name, "Replaced previously registered executor");
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ActionExecutor>> {
        self.executors.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.executors.contains_key(name)
    }

    /// Registered action names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.executors.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.executors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }
}

/// Required non-empty string param.
pub(crate) fn required_str<'a>(params: &'a Value, key: &str) -> Result<&'a str, ExecutorError> {
    match params.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim()),
        Some(Value::String(_)) | None | Some(Value::Null) => Err(ExecutorError::InvalidParams(
            format!("'{}' is required", key),
        )),
        Some(_) => Err(ExecutorError::InvalidParams(format!(
            "'{}' must be a string",
            key
        ))),
    }
}

/// Optional string param; a present non-string value is rejected.
pub(crate) fn optional_str<'a>(
    params: &'a Value,
    key: &str,
) -> Result<Option<&'a str>, ExecutorError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim())),
        Some(_) => Err(ExecutorError::InvalidParams(format!(
            "'{}' must be a string",
            key
        ))),
    }
}

/// First `max` characters of `text`, with an ellipsis when cut.
pub(crate) fn preview(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ankr_storage::Database;
    use serde_json::json;

    struct EchoExecutor;

    #[async_trait]
    impl ActionExecutor for EchoExecutor {
        fn name(&self) -> &str {
            "Echo"
        }

        async fn execute(&self, params: &Value) -> Result<Value, ExecutorError> {
            Ok(params.clone())
        }
    }

    #[tokio::test]
    async fn test_register_and_get() {
        let mut registry = ExecutorRegistry::new();
        assert!(registry.is_empty());
        registry.register(Arc::new(EchoExecutor));

        let executor = registry.get("Echo").unwrap();
        let result = executor.execute(&json!({"a": 1})).await.unwrap();
        assert_eq!(result, json!({"a": 1}));
        assert!(registry.get("Missing").is_none());
    }

    #[test]
    fn test_with_defaults_registers_all_builtins() {
        let site = Arc::new(SiteRepository::new(Arc::new(Database::in_memory().unwrap())));
        let registry = ExecutorRegistry::with_defaults(site);
        assert_eq!(registry.len(), 6);
        for name in crate::types::ActionName::ALL {
            assert!(registry.contains(name.as_str()), "missing {}", name);
        }
    }

    #[test]
    fn test_names_sorted() {
        let site = Arc::new(SiteRepository::new(Arc::new(Database::in_memory().unwrap())));
        let names = ExecutorRegistry::with_defaults(site).names();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_required_str() {
        let params = json!({"text": "  hello ", "blank": " ", "num": 3});
        assert_eq!(required_str(&params, "text").unwrap(), "hello");
        assert!(required_str(&params, "blank").is_err());
        assert!(required_str(&params, "num").is_err());
        assert!(required_str(&params, "absent").is_err());
    }

    #[test]
    fn test_optional_str() {
        let params = json!({"note": "x", "num": 1});
        assert_eq!(optional_str(&params, "note").unwrap(), Some("x"));
        assert_eq!(optional_str(&params, "absent").unwrap(), None);
        assert!(optional_str(&params, "num").is_err());
    }

    #[test]
    fn test_preview_is_char_safe() {
        assert_eq!(preview("short", 50), "short");
        let long = "é".repeat(60);
        assert_eq!(preview(&long, 50), format!("{}...", "é".repeat(50)));
    }
}
