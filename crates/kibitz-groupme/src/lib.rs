// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! GroupMe platform adapter for Kibitz.
//!
//! Implements [`PlatformAdapter`] over the GroupMe v3 REST API: history
//! polling with self-message filtering, threaded replies, and runtime group
//! switching.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use kibitz_config::model::GroupMeConfig;
use kibitz_core::{
    Ack, AdapterType, GroupInfo, HealthStatus, KibitzError, PlatformAdapter, PluginAdapter,
    PollCursor, RawMessage,
};
use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, info};

use crate::client::GroupMeClient;
use crate::types::{ApiGroup, ApiMessage, OutgoingBody, OutgoingMessage, ReplyAttachment};

/// GroupMe platform adapter implementing [`PlatformAdapter`].
///
/// The bot's own user id is resolved once via `GET /users/me` and cached so
/// its posts can be excluded from polling results.
pub struct GroupMePlatform {
    client: GroupMeClient,
    group_id: RwLock<Option<String>>,
    user_id: OnceCell<String>,
}

impl GroupMePlatform {
    /// Creates the adapter from the `[groupme]` config section.
    ///
    /// The access token is required. The group id may be set later through
    /// [`PlatformAdapter::set_group`].
    pub fn new(config: &GroupMeConfig) -> Result<Self, KibitzError> {
        let token = config
            .access_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                KibitzError::platform(
                    "GroupMe access token not found: set groupme.access_token or GROUPME_ACCESS_TOKEN",
                )
            })?;

        let client = GroupMeClient::new(
            token,
            &config.api_base,
            Duration::from_secs(config.request_timeout_secs),
        )?;

        let group_id = config.group_id.clone().filter(|g| !g.trim().is_empty());
        info!(group_id = ?group_id, "GroupMe adapter initialized");

        Ok(Self {
            client,
            group_id: RwLock::new(group_id),
            user_id: OnceCell::new(),
        })
    }

    /// Groups the configured account belongs to.
    pub async fn list_groups(&self) -> Result<Vec<GroupInfo>, KibitzError> {
        let groups = self.client.groups().await?;
        Ok(groups.into_iter().map(to_group_info).collect())
    }

    async fn bot_user_id(&self) -> Result<&str, KibitzError> {
        let id = self
            .user_id
            .get_or_try_init(|| self.client.current_user_id())
            .await?;
        Ok(id.as_str())
    }

    async fn require_group(&self) -> Result<String, KibitzError> {
        self.current_group()
            .await
            .ok_or_else(|| KibitzError::platform("no GroupMe group configured"))
    }
}

fn to_group_info(group: ApiGroup) -> GroupInfo {
    GroupInfo {
        member_count: group.members.len(),
        id: group.id,
        name: group.name,
    }
}

/// Keeps messages newer than `cursor` not written by `self_id`, oldest first.
fn filter_history(
    messages: Vec<ApiMessage>,
    cursor: Option<PollCursor>,
    self_id: &str,
) -> Vec<RawMessage> {
    let mut out: Vec<RawMessage> = messages
        .into_iter()
        .filter(|m| cursor.is_none_or(|c| m.created_at > c.0))
        .filter(|m| m.user_id.as_deref() != Some(self_id))
        .map(|m| RawMessage {
            engagement_count: u32::try_from(m.favorited_by.len()).unwrap_or(u32::MAX),
            text: m.text.unwrap_or_default(),
            author_id: m.user_id.unwrap_or_default(),
            author_name: m.name.unwrap_or_default(),
            created_at: m.created_at,
            id: m.id,
        })
        .collect();
    out.sort_by_key(|m| m.created_at);
    out
}

#[async_trait]
impl PluginAdapter for GroupMePlatform {
    fn name(&self) -> &str {
        "groupme"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Platform
    }

    async fn health_check(&self) -> Result<HealthStatus, KibitzError> {
        if let Err(e) = self.bot_user_id().await {
            return Ok(HealthStatus::Unhealthy(e.to_string()));
        }
        if self.group_id.read().await.is_none() {
            return Ok(HealthStatus::Degraded("no group configured".into()));
        }
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl PlatformAdapter for GroupMePlatform {
    async fn poll_since(
        &self,
        cursor: Option<PollCursor>,
    ) -> Result<Vec<RawMessage>, KibitzError> {
        let group_id = self.require_group().await?;
        let self_id = self.bot_user_id().await?.to_string();
        let history = self.client.recent_messages(&group_id).await?;
        let fetched = history.len();
        let messages = filter_history(history, cursor, &self_id);
        debug!(group_id = %group_id, fetched, kept = messages.len(), "polled group history");
        Ok(messages)
    }

    async fn send(&self, text: &str, reply_to: Option<&str>) -> Result<Ack, KibitzError> {
        if text.trim().is_empty() {
            return Err(KibitzError::platform("message text cannot be empty"));
        }
        let group_id = self.require_group().await?;

        let body = OutgoingMessage {
            message: OutgoingBody {
                source_guid: uuid::Uuid::new_v4().to_string(),
                text: text.to_string(),
                attachments: reply_to.map(ReplyAttachment::to).into_iter().collect(),
            },
        };
        let message_id = self.client.post_message(&group_id, &body).await?;
        info!(group_id = %group_id, reply_to = ?reply_to, message_id = ?message_id, "message posted");
        Ok(Ack { message_id })
    }

    async fn set_group(&self, group_id: &str) -> Result<(), KibitzError> {
        let group_id = group_id.trim();
        if group_id.is_empty() {
            return Err(KibitzError::platform("group id is required"));
        }
        *self.group_id.write().await = Some(group_id.to_string());
        info!(group_id, "GroupMe group switched");
        Ok(())
    }

    async fn current_group(&self) -> Option<String> {
        self.group_id.read().await.clone()
    }

    async fn group_info(&self) -> Result<Option<GroupInfo>, KibitzError> {
        let Some(group_id) = self.current_group().await else {
            return Ok(None);
        };
        let group = self.client.group(&group_id).await?;
        Ok(Some(to_group_info(group)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base: &str, group: Option<&str>) -> GroupMeConfig {
        GroupMeConfig {
            access_token: Some("tok".into()),
            group_id: group.map(String::from),
            api_base: base.to_string(),
            request_timeout_secs: 5,
        }
    }

    async fn mount_me(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/users/me"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"response": {"id": "bot"}})),
            )
            .mount(server)
            .await;
    }

    fn api_message(id: &str, user: &str, created_at: i64, likes: usize) -> ApiMessage {
        ApiMessage {
            id: id.into(),
            text: Some(format!("text {id}")),
            user_id: Some(user.into()),
            name: Some(user.to_uppercase()),
            created_at,
            favorited_by: vec!["x".into(); likes],
        }
    }

    #[test]
    fn missing_token_is_rejected() {
        let mut cfg = config("http://localhost:1", Some("g"));
        cfg.access_token = None;
        let err = GroupMePlatform::new(&cfg).err().unwrap();
        assert!(matches!(err, KibitzError::Platform { .. }));
    }

    #[test]
    fn history_is_filtered_and_sorted_oldest_first() {
        let history = vec![
            api_message("3", "u1", 300, 2),
            api_message("2", "bot", 200, 0),
            api_message("1", "u2", 100, 0),
            api_message("0", "u2", 50, 0),
        ];
        let out = filter_history(history, Some(PollCursor(50)), "bot");
        let ids: Vec<_> = out.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["1", "3"]);
        assert_eq!(out[1].engagement_count, 2);
        assert_eq!(out[1].author_name, "U1");
    }

    #[test]
    fn no_cursor_keeps_all_history() {
        let history = vec![api_message("2", "u", 20, 0), api_message("1", "u", 10, 0)];
        assert_eq!(filter_history(history, None, "bot").len(), 2);
    }

    #[tokio::test]
    async fn poll_without_group_is_a_platform_error() {
        let platform = GroupMePlatform::new(&config("http://localhost:1", None)).unwrap();
        let err = platform.poll_since(None).await.unwrap_err();
        assert!(err.to_string().contains("no GroupMe group"));
    }

    #[tokio::test]
    async fn poll_excludes_own_messages_and_caches_user_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/me"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"response": {"id": "bot"}})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/groups/g1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": {"count": 2, "messages": [
                    {"id": "b", "text": "mine", "user_id": "bot", "name": "Kibitz", "created_at": 20, "favorited_by": []},
                    {"id": "a", "text": "hello", "user_id": "u1", "name": "Sam", "created_at": 10, "favorited_by": ["u2", "u3"]}
                ]}
            })))
            .mount(&server)
            .await;

        let platform = GroupMePlatform::new(&config(&server.uri(), Some("g1"))).unwrap();
        let first = platform.poll_since(None).await.unwrap();
        let second = platform.poll_since(Some(PollCursor(10))).await.unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(first[0].author_name, "Sam");
        assert_eq!(first[0].engagement_count, 2);
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn reply_is_posted_with_attachment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/groups/g1/messages"))
            .and(header("X-Access-Token", "tok"))
            .and(body_partial_json(serde_json::json!({
                "message": {
                    "text": "sure thing",
                    "attachments": [{"type": "reply", "reply_id": "m9", "base_reply_id": "m9"}]
                }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "response": {"message": {"id": "posted-1"}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let platform = GroupMePlatform::new(&config(&server.uri(), Some("g1"))).unwrap();
        let ack = platform.send("sure thing", Some("m9")).await.unwrap();
        assert_eq!(ack.message_id.as_deref(), Some("posted-1"));
    }

    #[tokio::test]
    async fn empty_text_is_rejected_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let platform = GroupMePlatform::new(&config(&server.uri(), Some("g1"))).unwrap();
        let err = platform.send("   ", None).await.unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[tokio::test]
    async fn set_group_redirects_requests() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/groups/g2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": {"id": "g2", "name": "Book Club", "members": [{}, {}, {}, {}]}
            })))
            .mount(&server)
            .await;

        let platform = GroupMePlatform::new(&config(&server.uri(), None)).unwrap();
        assert!(platform.group_info().await.unwrap().is_none());
        assert!(platform.current_group().await.is_none());

        platform.set_group("g2").await.unwrap();
        assert_eq!(platform.current_group().await.as_deref(), Some("g2"));
        let info = platform.group_info().await.unwrap().unwrap();
        assert_eq!(info.name, "Book Club");
        assert_eq!(info.member_count, 4);
    }

    #[tokio::test]
    async fn list_groups_maps_member_counts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/groups"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": [
                    {"id": "g1", "name": "Family", "members": [{}, {}]},
                    {"id": "g2", "name": "Work", "members": []}
                ]
            })))
            .mount(&server)
            .await;

        let platform = GroupMePlatform::new(&config(&server.uri(), None)).unwrap();
        let groups = platform.list_groups().await.unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].member_count, 2);
        assert_eq!(groups[1].name, "Work");
    }

    #[tokio::test]
    async fn health_reports_missing_group_as_degraded() {
        let server = MockServer::start().await;
        mount_me(&server).await;

        let platform = GroupMePlatform::new(&config(&server.uri(), None)).unwrap();
        assert!(matches!(
            platform.health_check().await.unwrap(),
            HealthStatus::Degraded(_)
        ));
        platform.set_group("g1").await.unwrap();
        assert_eq!(platform.health_check().await.unwrap(), HealthStatus::Healthy);
    }
}
