// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Platform adapter trait for the group chat the bot participates in.

use async_trait::async_trait;

use crate::error::KibitzError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Ack, GroupInfo, PollCursor, RawMessage};

/// Adapter for the messaging platform.
///
/// Implementations must exclude messages authored by the bot itself and
/// return the remainder in arrival order (oldest first). Transient network
/// or auth failures are reported as [`KibitzError::Platform`].
#[async_trait]
pub trait PlatformAdapter: PluginAdapter {
    /// Fetches messages newer than `cursor`, or the recent history when `None`.
    async fn poll_since(
        &self,
        cursor: Option<PollCursor>,
    ) -> Result<Vec<RawMessage>, KibitzError>;

    /// Posts `text` to the group, threaded under `reply_to` when given.
    async fn send(&self, text: &str, reply_to: Option<&str>) -> Result<Ack, KibitzError>;

    /// Switches the group the bot reads from and posts to.
    async fn set_group(&self, group_id: &str) -> Result<(), KibitzError>;

    /// The configured group id. Local state only, never a network call.
    async fn current_group(&self) -> Option<String>;

    /// Describes the current group, or `None` when no group is configured.
    async fn group_info(&self) -> Result<Option<GroupInfo>, KibitzError>;
}
