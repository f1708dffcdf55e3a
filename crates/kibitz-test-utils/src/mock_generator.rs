// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock generation backend for deterministic testing.
//!
//! `MockGenerator` implements `GeneratorAdapter` with a FIFO script of
//! outcomes. Each entry may carry a delay so tests running on a paused
//! clock can fix the order in which concurrent attempts complete.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use kibitz_core::{
    AdapterType, GenerationRequest, GeneratorAdapter, HealthStatus, KibitzError, PluginAdapter,
};

#[derive(Debug, Clone)]
struct Scripted {
    delay: Duration,
    outcome: Result<String, String>,
}

/// A mock generator that replays scripted outcomes.
///
/// When the script is exhausted, every call succeeds with `"mock response"`
/// after the default delay.
pub struct MockGenerator {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
    calls: AtomicUsize,
    default_delay: Duration,
}

impl MockGenerator {
    /// Create a generator with an empty script.
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            calls: AtomicUsize::new(0),
            default_delay: Duration::ZERO,
        }
    }

    /// `Err(message)` entries fail with a generation error carrying `message`.
    pub fn with_script(outcomes: Vec<Result<String, String>>) -> Self {
        Self::with_timed_script(
            outcomes
                .into_iter()
                .map(|outcome| (Duration::ZERO, outcome))
                .collect(),
        )
    }

    /// Like [`with_script`](Self::with_script), each outcome delivered after its delay.
    pub fn with_timed_script(outcomes: Vec<(Duration, Result<String, String>)>) -> Self {
        let script = outcomes
            .into_iter()
            .map(|(delay, outcome)| Scripted { delay, outcome })
            .collect();
        Self {
            script: Arc::new(Mutex::new(script)),
            ..Self::new()
        }
    }

    /// Delay applied once the script is exhausted.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    /// Append an outcome to the script.
    pub async fn push(&self, outcome: Result<String, String>) {
        self.script.lock().await.push_back(Scripted {
            delay: Duration::ZERO,
            outcome,
        });
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request received, in call order.
    pub async fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().await.clone()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockGenerator {
    fn name(&self) -> &str {
        "mock-generator"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generator
    }

    async fn health_check(&self) -> Result<HealthStatus, KibitzError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl GeneratorAdapter for MockGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, KibitzError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(request.clone());

        let next = self.script.lock().await.pop_front().unwrap_or_else(|| Scripted {
            delay: self.default_delay,
            outcome: Ok("mock response".to_string()),
        });

        if !next.delay.is_zero() {
            tokio::time::sleep(next.delay).await;
        }
        next.outcome.map_err(KibitzError::generation)
    }
}
