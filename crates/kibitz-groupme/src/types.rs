// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the GroupMe v3 REST API.
//!
//! Every GroupMe response wraps its payload in a `{"response": ...}` envelope.

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

/// Top-level response envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub response: Option<T>,
}

/// `GET /users/me`.
#[derive(Debug, Deserialize)]
pub struct ApiUser {
    pub id: String,
}

/// `GET /groups` and `GET /groups/{id}`.
#[derive(Debug, Deserialize)]
pub struct ApiGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub members: Vec<IgnoredAny>,
}

/// `GET /groups/{id}/messages`.
#[derive(Debug, Deserialize)]
pub struct ApiMessagePage {
    #[serde(default)]
    pub messages: Vec<ApiMessage>,
}

/// One message as returned by the group history endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMessage {
    pub id: String,
    /// Null for attachment-only posts.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub created_at: i64,
    #[serde(default)]
    pub favorited_by: Vec<String>,
}

/// Body of `POST /groups/{id}/messages`.
#[derive(Debug, Serialize)]
pub struct OutgoingMessage {
    pub message: OutgoingBody,
}

#[derive(Debug, Serialize)]
pub struct OutgoingBody {
    pub source_guid: String,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<ReplyAttachment>,
}

/// Threads a post under an existing message.
#[derive(Debug, Serialize)]
pub struct ReplyAttachment {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub reply_id: String,
    pub base_reply_id: String,
}

impl ReplyAttachment {
    pub fn to(message_id: &str) -> Self {
        Self {
            kind: "reply",
            reply_id: message_id.to_string(),
            base_reply_id: message_id.to_string(),
        }
    }
}

/// Response payload of a successful post.
#[derive(Debug, Deserialize)]
pub struct ApiPosted {
    pub message: ApiPostedMessage,
}

#[derive(Debug, Deserialize)]
pub struct ApiPostedMessage {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_page_tolerates_null_text_and_missing_likes() {
        let json = r#"{"response":{"count":1,"messages":[
            {"id":"1","text":null,"user_id":"u","name":"Sam","created_at":100}
        ]}}"#;
        let page: Envelope<ApiMessagePage> = serde_json::from_str(json).unwrap();
        let msg = &page.response.unwrap().messages[0];
        assert!(msg.text.is_none());
        assert!(msg.favorited_by.is_empty());
    }

    #[test]
    fn reply_attachment_serializes_type_field() {
        let body = OutgoingMessage {
            message: OutgoingBody {
                source_guid: "g".into(),
                text: "hi".into(),
                attachments: vec![ReplyAttachment::to("42")],
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["message"]["attachments"][0]["type"], "reply");
        assert_eq!(json["message"]["attachments"][0]["base_reply_id"], "42");
    }

    #[test]
    fn plain_post_omits_attachments() {
        let body = OutgoingMessage {
            message: OutgoingBody {
                source_guid: "g".into(),
                text: "hi".into(),
                attachments: Vec::new(),
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json["message"].get("attachments").is_none());
    }
}
