//! Error types for the Clarity test harness

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarnessError {
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Expected {expected}, got {actual}")]
    ParseMismatch { expected: String, actual: String },

    #[error("Unbalanced structure at byte {position}: {input}")]
    UnbalancedStructure { input: String, position: usize },

    #[error("Chain tip cannot be moved from {current} to {target}")]
    ChainTipRegression { current: u64, target: u64 },

    #[error("Unable to retrieve expected {0}")]
    EventNotFound(String),

    #[error("Host error: {0}")]
    Host(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl HarnessError {
    pub(crate) fn mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        HarnessError::ParseMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl From<std::io::Error> for HarnessError {
    fn from(err: std::io::Error) -> Self {
        HarnessError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for HarnessError {
    fn from(err: serde_json::Error) -> Self {
        HarnessError::Json(err.to_string())
    }
}

impl From<toml::de::Error> for HarnessError {
    fn from(err: toml::de::Error) -> Self {
        HarnessError::Config(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, HarnessError>;
