// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Kibitz group-chat bot.
//!
//! This crate provides the error type, the shared data types, and the adapter
//! traits through which the orchestration engine talks to its collaborators:
//! the messaging platform and the content-generation backend.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::KibitzError;
pub use types::{
    Ack, AdapterType, GenerationRequest, GroupInfo, HealthStatus, MessageKind, PollCursor,
    PromptContext, RawMessage,
};

pub use traits::{GeneratorAdapter, PlatformAdapter, PluginAdapter, RandomSource};
