//! Error types for the action engine.

use ankr_core::error::AnkrError;
use ankr_core::types::ActionCallStatus;
use uuid::Uuid;

/// Errors reported by an action executor.
///
/// These never escape the lifecycle controller: they become the `failed`
/// terminal state of the action call.
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error("Invalid params: {0}")]
    InvalidParams(String),
    #[error("Executor failed: {0}")]
    Failed(String),
    #[error("Storage error: {0}")]
    Storage(#[from] AnkrError),
}

/// Errors from the action call lifecycle plumbing.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("Action call not found: {0}")]
    NotFound(Uuid),
    #[error("Invalid state transition: {0} -> {1}")]
    InvalidTransition(ActionCallStatus, ActionCallStatus),
    #[error("Store error: {0}")]
    Store(#[from] AnkrError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executor_error_display() {
        let err = ExecutorError::InvalidParams("missing text".to_string());
        assert_eq!(err.to_string(), "Invalid params: missing text");

        let err = ExecutorError::Failed("upstream refused".to_string());
        assert_eq!(err.to_string(), "Executor failed: upstream refused");
    }

    #[test]
    fn test_executor_error_from_ankr_error() {
        let err: ExecutorError = AnkrError::Storage("disk full".to_string()).into();
        assert!(matches!(err, ExecutorError::Storage(_)));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_lifecycle_error_display() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let err = LifecycleError::NotFound(id);
        assert_eq!(
            err.to_string(),
            "Action call not found: 550e8400-e29b-41d4-a716-446655440000"
        );

        let err = LifecycleError::InvalidTransition(
            ActionCallStatus::Succeeded,
            ActionCallStatus::Requested,
        );
        assert_eq!(err.to_string(), "Invalid state transition: succeeded -> requested");
    }

    #[test]
    fn test_lifecycle_error_from_ankr_error() {
        let err: LifecycleError = AnkrError::Storage("locked".to_string()).into();
        assert!(matches!(err, LifecycleError::Store(_)));
    }
}
