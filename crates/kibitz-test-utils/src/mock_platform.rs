// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock messaging platform for deterministic testing.
//!
//! `MockPlatform` implements `PlatformAdapter` over an in-memory message
//! history. Injected messages are returned by `poll_since` when newer than
//! the cursor; sends are captured for assertion.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use kibitz_core::{
    Ack, AdapterType, GroupInfo, HealthStatus, KibitzError, PlatformAdapter, PluginAdapter,
    PollCursor, RawMessage,
};

/// Build a message from another group member.
pub fn raw_message(id: &str, text: &str, likes: u32, created_at: i64) -> RawMessage {
    RawMessage {
        id: id.to_string(),
        text: text.to_string(),
        author_id: format!("user-{id}"),
        author_name: "Test User".to_string(),
        created_at,
        engagement_count: likes,
    }
}

/// A message captured by [`MockPlatform::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub text: String,
    pub reply_to: Option<String>,
}

/// An in-memory group chat.
pub struct MockPlatform {
    history: Mutex<Vec<RawMessage>>,
    poll_failures: Mutex<VecDeque<String>>,
    send_failure: Mutex<Option<String>>,
    group_info_failure: Mutex<Option<String>>,
    sent: Mutex<Vec<SentMessage>>,
    cursors: Mutex<Vec<Option<PollCursor>>>,
    group: Mutex<Option<String>>,
    polls: AtomicUsize,
}

impl MockPlatform {
    /// Create a platform bound to group `"mock-group"` with no history.
    pub fn new() -> Self {
        Self {
            history: Mutex::new(Vec::new()),
            poll_failures: Mutex::new(VecDeque::new()),
            send_failure: Mutex::new(None),
            group_info_failure: Mutex::new(None),
            sent: Mutex::new(Vec::new()),
            cursors: Mutex::new(Vec::new()),
            group: Mutex::new(Some("mock-group".to_string())),
            polls: AtomicUsize::new(0),
        }
    }

    /// Add a message to the group history.
    pub async fn inject_message(&self, msg: RawMessage) {
        self.history.lock().await.push(msg);
    }

    /// Make the next poll fail with a platform error.
    pub async fn fail_next_poll(&self, message: &str) {
        self.poll_failures.lock().await.push_back(message.to_string());
    }

    /// Make every send fail until cleared with `None`.
    pub async fn fail_sends(&self, message: Option<&str>) {
        *self.send_failure.lock().await = message.map(str::to_string);
    }

    /// Make every group lookup fail until cleared with `None`.
    pub async fn fail_group_info(&self, message: Option<&str>) {
        *self.group_info_failure.lock().await = message.map(str::to_string);
    }

    pub async fn clear_group(&self) {
        *self.group.lock().await = None;
    }

    pub async fn group(&self) -> Option<String> {
        self.group.lock().await.clone()
    }

    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    /// Cursor passed to each `poll_since` call, in order.
    pub async fn poll_cursors(&self) -> Vec<Option<PollCursor>> {
        self.cursors.lock().await.clone()
    }

    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockPlatform {
    fn name(&self) -> &str {
        "mock-platform"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Platform
    }

    async fn health_check(&self) -> Result<HealthStatus, KibitzError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl PlatformAdapter for MockPlatform {
    async fn poll_since(
        &self,
        cursor: Option<PollCursor>,
    ) -> Result<Vec<RawMessage>, KibitzError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        self.cursors.lock().await.push(cursor);

        if let Some(message) = self.poll_failures.lock().await.pop_front() {
            return Err(KibitzError::platform(message));
        }

        let mut messages: Vec<RawMessage> = self
            .history
            .lock()
            .await
            .iter()
            .filter(|m| cursor.is_none_or(|c| m.created_at > c.0))
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }

    async fn send(&self, text: &str, reply_to: Option<&str>) -> Result<Ack, KibitzError> {
        if let Some(message) = self.send_failure.lock().await.clone() {
            return Err(KibitzError::platform(message));
        }
        let mut sent = self.sent.lock().await;
        sent.push(SentMessage {
            text: text.to_string(),
            reply_to: reply_to.map(str::to_string),
        });
        Ok(Ack {
            message_id: Some(format!("mock-sent-{}", sent.len())),
        })
    }

    async fn set_group(&self, group_id: &str) -> Result<(), KibitzError> {
        *self.group.lock().await = Some(group_id.to_string());
        Ok(())
    }

    async fn current_group(&self) -> Option<String> {
        self.group().await
    }

    async fn group_info(&self) -> Result<Option<GroupInfo>, KibitzError> {
        if let Some(message) = self.group_info_failure.lock().await.clone() {
            return Err(KibitzError::platform(message));
        }
        Ok(self.group.lock().await.clone().map(|id| GroupInfo {
            id,
            name: "Mock Group".to_string(),
            member_count: 3,
        }))
    }
}
