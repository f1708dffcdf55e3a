// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI generation adapter for Kibitz.
//!
//! This crate implements [`GeneratorAdapter`] on top of the OpenAI Responses
//! API. Each call produces one candidate text; failures are returned to the
//! orchestrator unchanged.

pub mod client;
pub mod prompt;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use kibitz_config::KibitzConfig;
use kibitz_core::{
    AdapterType, GenerationRequest, GeneratorAdapter, HealthStatus, KibitzError, PluginAdapter,
};
use tracing::{debug, info};

use crate::client::ResponsesClient;
use crate::prompt::PromptMaterial;
use crate::types::{Reasoning, ResponsesRequest};

/// OpenAI generator implementing [`GeneratorAdapter`].
///
/// API key resolution happens in the config loader: `openai.api_key`, then
/// `OPENAI_API_KEY`. A missing key is a configuration error.
pub struct OpenAiGenerator {
    client: ResponsesClient,
    material: PromptMaterial,
    model: String,
    reasoning_effort: String,
}

impl OpenAiGenerator {
    /// Creates the generator and loads the persona material files.
    pub async fn new(config: &KibitzConfig) -> Result<Self, KibitzError> {
        let openai = &config.openai;
        let api_key = openai
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                KibitzError::Config(
                    "OpenAI API key not found: set openai.api_key or OPENAI_API_KEY".into(),
                )
            })?;

        let client = ResponsesClient::new(
            api_key,
            &openai.api_base,
            Duration::from_secs(openai.request_timeout_secs),
        )?;

        let material = PromptMaterial::load(
            &config.agent.name,
            openai.persona_file.as_deref(),
            openai.phrases_file.as_deref(),
            openai.message_types_file.as_deref(),
            openai.stances_file.as_deref(),
        )
        .await;

        info!(model = %openai.model, "OpenAI generator initialized");

        Ok(Self::with_parts(
            client,
            material,
            openai.model.clone(),
            openai.reasoning_effort.clone(),
        ))
    }

    fn with_parts(
        client: ResponsesClient,
        material: PromptMaterial,
        model: String,
        reasoning_effort: String,
    ) -> Self {
        Self {
            client,
            material,
            model,
            reasoning_effort,
        }
    }

    /// The Responses API request for `request`.
    pub fn to_responses_request(&self, request: &GenerationRequest) -> ResponsesRequest {
        let built = {
            let mut rng = rand::thread_rng();
            self.material.build(request, &mut rng)
        };
        ResponsesRequest {
            model: self.model.clone(),
            instructions: built.instructions,
            input: built.input,
            reasoning: Reasoning {
                effort: self.reasoning_effort.clone(),
            },
        }
    }
}

#[async_trait]
impl PluginAdapter for OpenAiGenerator {
    fn name(&self) -> &str {
        "openai"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generator
    }

    async fn health_check(&self) -> Result<HealthStatus, KibitzError> {
        if self.material.phrases.is_empty() {
            return Ok(HealthStatus::Degraded("no phrases loaded".into()));
        }
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl GeneratorAdapter for OpenAiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, KibitzError> {
        let api_request = self.to_responses_request(request);
        debug!(kind = %request.kind, model = %self.model, "requesting generation");
        self.client.create(&api_request).await
    }
}
