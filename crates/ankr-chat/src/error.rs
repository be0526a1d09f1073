//! Error types for the conversational front end.

/// Errors from a text-analysis capability.
///
/// The analyzer fails open on all of these; they are logged, never returned
/// to a chat caller.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("analysis failed: {0}")]
    Failed(String),
    #[error("analysis timed out after {0} ms")]
    Timeout(u64),
    #[error("analyzer unavailable: {0}")]
    Unavailable(String),
}

/// Errors from the chat orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
}
