// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generator adapter trait for the content-generation backend.

use async_trait::async_trait;

use crate::error::KibitzError;
use crate::traits::adapter::PluginAdapter;
use crate::types::GenerationRequest;

/// Adapter that turns a generation request into message text.
///
/// A call may fail; callers decide how failures are surfaced. Implementations
/// carry their own request timeout and do not retry.
#[async_trait]
pub trait GeneratorAdapter: PluginAdapter {
    /// Generates one candidate text for the request.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, KibitzError>;
}
