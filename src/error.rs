//! Error types for the Realms Loot CLI

use thiserror::Error;

/// Main error type for loot commands and the invocation layer
#[derive(Error, Debug)]
pub enum LootError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid felt '{value}': {message}")]
    InvalidFelt { value: String, message: String },

    #[error("Invalid token id '{0}'")]
    InvalidTokenId(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Contract alias {alias} not found for network {network}")]
    AliasNotFound { alias: String, network: String },

    #[error("Command `{command}` failed: {message}")]
    Invocation { command: String, message: String },

    #[error("Timeout waiting for `{command}` after {secs}s")]
    Timeout { command: String, secs: u64 },

    #[error("Expected {expected} values from {function}, got {got}")]
    MissingOutput {
        function: String,
        expected: usize,
        got: usize,
    },

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LootError {
    /// Check if the error came from the external chain tooling
    pub fn is_tooling_failure(&self) -> bool {
        matches!(
            self,
            LootError::Invocation { .. } | LootError::Timeout { .. }
        )
    }
}

/// Result type for loot operations
pub type LootResult<T> = Result<T, LootError>;
