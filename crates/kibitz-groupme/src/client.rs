// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the GroupMe v3 REST API.

use std::time::Duration;

use kibitz_core::KibitzError;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::types::{
    ApiGroup, ApiMessage, ApiMessagePage, ApiPosted, ApiUser, Envelope, OutgoingMessage,
};

/// Page size used for history and group listing requests.
const PAGE_LIMIT: u32 = 100;

/// Thin typed wrapper over the GroupMe endpoints the bot needs.
#[derive(Debug, Clone)]
pub struct GroupMeClient {
    client: reqwest::Client,
    base_url: String,
}

impl GroupMeClient {
    /// Creates a client authenticating with `access_token` against `base_url`.
    pub fn new(access_token: &str, base_url: &str, timeout: Duration) -> Result<Self, KibitzError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-Access-Token",
            HeaderValue::from_str(access_token).map_err(|e| {
                KibitzError::Config(format!("invalid GroupMe access token header value: {e}"))
            })?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| KibitzError::Platform {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Id of the account that owns the access token.
    pub async fn current_user_id(&self) -> Result<String, KibitzError> {
        let user: ApiUser = self
            .get("/users/me")
            .await?
            .ok_or_else(|| KibitzError::platform("GroupMe returned no user"))?;
        Ok(user.id)
    }

    /// Groups the account belongs to (first page).
    pub async fn groups(&self) -> Result<Vec<ApiGroup>, KibitzError> {
        let path = format!("/groups?per_page={PAGE_LIMIT}");
        Ok(self.get(&path).await?.unwrap_or_default())
    }

    /// A single group by id.
    pub async fn group(&self, group_id: &str) -> Result<ApiGroup, KibitzError> {
        self.get(&format!("/groups/{group_id}"))
            .await?
            .ok_or_else(|| KibitzError::platform(format!("group {group_id} not found")))
    }

    /// The most recent page of a group's history, newest first as GroupMe returns it.
    pub async fn recent_messages(&self, group_id: &str) -> Result<Vec<ApiMessage>, KibitzError> {
        let path = format!("/groups/{group_id}/messages?limit={PAGE_LIMIT}");
        let page: Option<ApiMessagePage> = self.get(&path).await?;
        Ok(page.map(|p| p.messages).unwrap_or_default())
    }

    /// Posts a message and returns the id GroupMe assigned to it.
    pub async fn post_message(
        &self,
        group_id: &str,
        body: &OutgoingMessage,
    ) -> Result<Option<String>, KibitzError> {
        let posted: Option<ApiPosted> = self
            .post(&format!("/groups/{group_id}/messages"), body)
            .await?;
        Ok(posted.map(|p| p.message.id))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, KibitzError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.client.get(&url).send().await.map_err(request_failed)?;
        decode(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<T>, KibitzError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(request_failed)?;
        decode(response).await
    }
}

fn request_failed(e: reqwest::Error) -> KibitzError {
    KibitzError::Platform {
        message: format!("HTTP request failed: {e}"),
        source: Some(Box::new(e)),
    }
}

/// Unwraps the response envelope. A 304 (no new history) decodes to `None`.
async fn decode<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<Option<T>, KibitzError> {
    let status = response.status();
    debug!(status = %status, url = %response.url().path(), "GroupMe response received");

    if status == StatusCode::NOT_MODIFIED {
        return Ok(None);
    }

    let body = response.text().await.map_err(|e| KibitzError::Platform {
        message: format!("failed to read response body: {e}"),
        source: Some(Box::new(e)),
    })?;

    if !status.is_success() {
        return Err(KibitzError::platform(format!(
            "GroupMe API returned {status}: {body}"
        )));
    }

    if body.trim().is_empty() {
        return Ok(None);
    }

    let envelope: Envelope<T> =
        serde_json::from_str(&body).map_err(|e| KibitzError::Platform {
            message: format!("failed to parse GroupMe response: {e}"),
            source: Some(Box::new(e)),
        })?;
    Ok(envelope.response)
}
