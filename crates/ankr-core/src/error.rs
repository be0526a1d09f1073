use thiserror::Error;

/// Top-level error type shared by every ankr crate.
///
/// Subsystem crates define their own error enums and convert into or out of
/// `AnkrError` so that `?` works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnkrError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for AnkrError {
    fn from(err: toml::de::Error) -> Self {
        AnkrError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for AnkrError {
    fn from(err: toml::ser::Error) -> Self {
        AnkrError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for AnkrError {
    fn from(err: serde_json::Error) -> Self {
        AnkrError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for ankr operations.
pub type Result<T> = std::result::Result<T, AnkrError>;
