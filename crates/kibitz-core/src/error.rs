// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Kibitz bot.

use thiserror::Error;

/// The primary error type used across adapter traits and core operations.
#[derive(Debug, Error)]
pub enum KibitzError {
    /// Static configuration errors (invalid TOML, missing credentials).
    #[error("configuration error: {0}")]
    Config(String),

    /// Behavior settings rejected by validation. The previous settings stay in effect.
    #[error("invalid settings: {0}")]
    Settings(String),

    /// Settings document or other local storage failures.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Messaging platform errors (network failure, bad status, auth rejection).
    #[error("platform error: {message}")]
    Platform {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Content-generation backend errors.
    #[error("generation error: {message}")]
    Generation {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An operator action referenced an unknown message entity.
    #[error("message {id} not found")]
    NotFound { id: String },

    /// A candidate index outside the entity's candidate list.
    #[error("selection index {index} out of range ({len} candidates)")]
    InvalidSelection { index: i64, len: usize },

    /// A lifecycle transition that the entity's current state does not allow.
    #[error("message {id} cannot change state: {reason}")]
    InvalidTransition { id: String, reason: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl KibitzError {
    /// Shorthand for a platform error without an underlying source.
    pub fn platform(message: impl Into<String>) -> Self {
        KibitzError::Platform {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a generation error without an underlying source.
    pub fn generation(message: impl Into<String>) -> Self {
        KibitzError::Generation {
            message: message.into(),
            source: None,
        }
    }

    /// Whether the caller may reasonably retry the operation later.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            KibitzError::Platform { .. } | KibitzError::Timeout { .. }
        )
    }
}
