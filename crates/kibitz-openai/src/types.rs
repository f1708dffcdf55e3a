// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI Responses API request/response types.

use serde::{Deserialize, Serialize};

// --- Request types ---

/// A request to `POST /responses`.
#[derive(Debug, Clone, Serialize)]
pub struct ResponsesRequest {
    /// Model identifier (e.g., "gpt-5").
    pub model: String,
    /// System-level persona and style rules.
    pub instructions: String,
    /// The per-message prompt.
    pub input: String,
    pub reasoning: Reasoning,
}

/// Reasoning configuration for reasoning models.
#[derive(Debug, Clone, Serialize)]
pub struct Reasoning {
    /// One of "minimal", "low", "medium", "high".
    pub effort: String,
}

// --- Response types ---

/// Body of a successful `POST /responses`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponsesResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub output: Vec<OutputItem>,
}

/// One item of the response output. Only `message` items carry text.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputItem {
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub content: Vec<OutputContent>,
}

/// A content part inside a `message` output item.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputContent {
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl ResponsesResponse {
    /// Concatenated `output_text` parts of all message items.
    pub fn output_text(&self) -> String {
        self.output
            .iter()
            .filter(|item| item.item_type == "message")
            .flat_map(|item| item.content.iter())
            .filter(|part| part.content_type == "output_text")
            .filter_map(|part| part.text.as_deref())
            .collect()
    }
}

/// Error body returned on non-success status codes.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_text_skips_reasoning_items() {
        let json = r#"{
            "id": "resp_1",
            "output": [
                {"type": "reasoning", "summary": []},
                {"type": "message", "role": "assistant", "content": [
                    {"type": "output_text", "text": "hello ", "annotations": []},
                    {"type": "output_text", "text": "there", "annotations": []}
                ]}
            ]
        }"#;
        let response: ResponsesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.output_text(), "hello there");
    }

    #[test]
    fn refusal_yields_no_text() {
        let json = r#"{"output": [{"type": "message", "content": [
            {"type": "refusal", "refusal": "no"}
        ]}]}"#;
        let response: ResponsesResponse = serde_json::from_str(json).unwrap();
        assert!(response.output_text().is_empty());
    }

    #[test]
    fn request_serializes_reasoning_effort() {
        let request = ResponsesRequest {
            model: "gpt-5".into(),
            instructions: "be brief".into(),
            input: "say hi".into(),
            reasoning: Reasoning {
                effort: "low".into(),
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["reasoning"]["effort"], "low");
        assert_eq!(json["input"], "say hi");
    }
}
