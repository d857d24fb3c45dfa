//! Centralized error types for inboxpilot.

use std::path::PathBuf;
use thiserror::Error;

use crate::gateway::ProviderError;

/// All errors produced by the inboxpilot library.
#[derive(Error, Debug)]
pub enum AgentError {
    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A persisted collection exists but could not be read back.
    #[error("Corrupt store '{path}': {reason}")]
    Storage { path: PathBuf, reason: String },

    /// The LLM provider call failed.
    #[error("LLM provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The referenced email is not in the inbox.
    #[error("No email with id '{0}' in the inbox")]
    EmailNotFound(String),

    /// An unknown prompt key was requested.
    #[error("Unknown prompt key: {0}")]
    UnknownPromptKey(String),
}

/// Convenience alias for `Result<T, AgentError>`.
pub type Result<T> = std::result::Result<T, AgentError>;

impl AgentError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a `Storage` variant from a path and a reason.
    pub fn storage(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Storage {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Allow `?` on `std::io::Error` inside functions returning `AgentError`
/// when no path context is available (rare — prefer `AgentError::io`).
impl From<std::io::Error> for AgentError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::from("<unknown>"),
            source,
        }
    }
}
