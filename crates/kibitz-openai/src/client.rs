// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the OpenAI Responses API.
//!
//! Requests are sent once. Timeouts, error statuses and unparseable bodies
//! are all reported as [`KibitzError::Generation`].

use std::time::Duration;

use kibitz_core::KibitzError;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::debug;

use crate::types::{ApiErrorResponse, ResponsesRequest, ResponsesResponse};

/// HTTP client for `POST {api_base}/responses`.
#[derive(Debug, Clone)]
pub struct ResponsesClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ResponsesClient {
    /// Creates a client for `api_base` (e.g. `https://api.openai.com/v1`).
    pub fn new(api_key: &str, api_base: &str, timeout: Duration) -> Result<Self, KibitzError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
                KibitzError::Config(format!("invalid OpenAI API key header value: {e}"))
            })?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| KibitzError::Generation {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}/responses", api_base.trim_end_matches('/')),
        })
    }

    /// Sends the request and returns the non-empty output text.
    pub async fn create(&self, request: &ResponsesRequest) -> Result<String, KibitzError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| KibitzError::Generation {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, model = %request.model, "responses API replied");

        let body = response.text().await.map_err(|e| KibitzError::Generation {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!(
                    "OpenAI API error ({}): {}",
                    api_err.error.error_type.as_deref().unwrap_or("unknown"),
                    api_err.error.message
                ),
                Err(_) => format!("API returned {status}: {body}"),
            };
            return Err(KibitzError::generation(message));
        }

        let parsed: ResponsesResponse =
            serde_json::from_str(&body).map_err(|e| KibitzError::Generation {
                message: format!("failed to parse API response: {e}"),
                source: Some(Box::new(e)),
            })?;

        let text = parsed.output_text();
        let text = text.trim();
        if text.is_empty() {
            return Err(KibitzError::generation(format!(
                "response {} contained no output text",
                parsed.id.as_deref().unwrap_or("<unknown>")
            )));
        }
        Ok(text.to_string())
    }
}
