// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the adapters and the orchestration engine.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Platform,
    Generator,
}

/// Why a message entity exists. Fixed at creation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageKind {
    /// Unsolicited message from the per-cycle random trigger.
    Random,
    /// Reply to an incoming platform message.
    Reply,
    /// Operator-requested introduction.
    Introduction,
    /// Operator-requested test message.
    Manual,
}

/// Position in the platform's message history, expressed as the
/// `created_at` of the newest message already observed (unix seconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PollCursor(pub i64);

/// A message fetched from the platform, already filtered of the bot's own posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessage {
    pub id: String,
    pub text: String,
    pub author_id: String,
    pub author_name: String,
    /// Unix seconds.
    pub created_at: i64,
    /// Likes / favorites on the message.
    pub engagement_count: u32,
}

/// Delivery acknowledgment returned by the platform after a send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    /// Platform id of the posted message, when the platform reports one.
    pub message_id: Option<String>,
}

/// Summary of a chat group, used for status reporting and group discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInfo {
    pub id: String,
    pub name: String,
    pub member_count: usize,
}

/// What the generation backend is asked to write about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PromptContext {
    /// Free-form message in the persona's voice.
    Random,
    /// Same as `Random`, requested by the operator.
    Manual,
    /// Answer to a message someone else posted.
    Reply {
        original_text: String,
        username: String,
    },
    /// Introduction driven by the configured prompt.
    Introduction { prompt: String },
}

impl PromptContext {
    /// The entity kind this context produces.
    pub fn kind(&self) -> MessageKind {
        match self {
            PromptContext::Random => MessageKind::Random,
            PromptContext::Manual => MessageKind::Manual,
            PromptContext::Reply { .. } => MessageKind::Reply,
            PromptContext::Introduction { .. } => MessageKind::Introduction,
        }
    }
}

/// A single request to the generation backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub kind: MessageKind,
    pub context: PromptContext,
}

impl From<PromptContext> for GenerationRequest {
    fn from(context: PromptContext) -> Self {
        Self {
            kind: context.kind(),
            context,
        }
    }
}
