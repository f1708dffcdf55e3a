// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fan-out of concurrent generation attempts for one trigger.
//!
//! A batch registers its entity in the catalog before any attempt starts
//! (for background batches, before `spawn_batch` returns), appends each
//! attempt's outcome in completion order, and flips the entity out of the
//! generating state only after every attempt has resolved. A failed attempt
//! becomes a readable placeholder candidate and never aborts the batch.
//! Deleting the entity mid-batch ends generation early; later outcomes are
//! dropped.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use kibitz_core::{GenerationRequest, GeneratorAdapter, KibitzError, MessageKind, PromptContext};
use tokio::task::JoinSet;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::entity::{EntityId, IdGenerator, MessageEntity, ReplyOrigin};
use crate::state::SharedState;

/// Candidate text recorded for a failed attempt.
pub fn error_placeholder(kind: MessageKind, err: &dyn std::fmt::Display) -> String {
    format!("Error generating {kind}: {err}")
}

/// Launches and tracks generation batches.
#[derive(Clone)]
pub struct GenerationOrchestrator {
    state: SharedState,
    generator: Arc<dyn GeneratorAdapter>,
    ids: Arc<IdGenerator>,
    batches: TaskTracker,
    max_in_flight: usize,
}

impl GenerationOrchestrator {
    pub fn new(
        state: SharedState,
        generator: Arc<dyn GeneratorAdapter>,
        max_in_flight: usize,
    ) -> Self {
        Self {
            state,
            generator,
            ids: Arc::new(IdGenerator::new()),
            batches: TaskTracker::new(),
            max_in_flight: max_in_flight.max(1),
        }
    }

    /// Run one batch of `width` attempts to completion and return the finished entity.
    pub async fn generate_batch(
        &self,
        context: PromptContext,
        origin: Option<ReplyOrigin>,
        width: u32,
    ) -> Result<MessageEntity, KibitzError> {
        let id = self.register(&context, origin, width).await;
        self.run_attempts(id, context, width).await
    }

    /// Register the entity, then run its batch in the background.
    ///
    /// Returns `false` and skips the trigger when `max_in_flight` batches
    /// are already running.
    pub async fn spawn_batch(
        &self,
        context: PromptContext,
        origin: Option<ReplyOrigin>,
        width: u32,
    ) -> bool {
        let in_flight = self.batches.len();
        if in_flight >= self.max_in_flight {
            warn!(
                in_flight,
                max = self.max_in_flight,
                kind = %context.kind(),
                "batch limit reached, trigger skipped"
            );
            return false;
        }

        let id = self.register(&context, origin, width).await;
        let this = self.clone();
        self.batches.spawn(async move {
            if let Err(e) = this.run_attempts(id, context, width).await {
                error!(entity_id = %id, error = %e, "background generation batch failed");
            }
        });
        true
    }

    async fn register(
        &self,
        context: &PromptContext,
        origin: Option<ReplyOrigin>,
        width: u32,
    ) -> EntityId {
        let kind = context.kind();
        let id = self.ids.next_id();
        self.state
            .lock()
            .await
            .catalog
            .insert(MessageEntity::new(id, kind, origin, Utc::now()));
        info!(entity_id = %id, %kind, width = width.max(1), "generation batch started");
        id
    }

    async fn run_attempts(
        &self,
        id: EntityId,
        context: PromptContext,
        width: u32,
    ) -> Result<MessageEntity, KibitzError> {
        let width = width.max(1);
        let kind = context.kind();
        let request = GenerationRequest::from(context);

        let mut attempts = JoinSet::new();
        for attempt in 0..width {
            let generator = Arc::clone(&self.generator);
            let request = request.clone();
            attempts.spawn(async move { (attempt, generator.generate(&request).await) });
        }

        let mut failed = 0u32;
        while let Some(joined) = attempts.join_next().await {
            let text = match joined {
                Ok((attempt, Ok(text))) => {
                    debug!(entity_id = %id, attempt, "attempt completed");
                    text
                }
                Ok((attempt, Err(e))) => {
                    failed += 1;
                    error!(entity_id = %id, attempt, error = %e, "attempt failed");
                    error_placeholder(kind, &e)
                }
                Err(join_err) => {
                    failed += 1;
                    error!(entity_id = %id, error = %join_err, "attempt task aborted");
                    error_placeholder(kind, &join_err)
                }
            };
            if !self.state.lock().await.catalog.push_candidate(id, text)? {
                debug!(entity_id = %id, "entity deleted mid-batch, candidate dropped");
            }
        }

        let entity = self
            .state
            .lock()
            .await
            .catalog
            .finish_generation(id)?
            .clone();
        info!(
            entity_id = %id,
            %kind,
            succeeded = width - failed,
            failed,
            "generation batch finished"
        );
        Ok(entity)
    }

    /// Background batches still running.
    pub fn in_flight(&self) -> usize {
        self.batches.len()
    }

    /// Wait up to `timeout` for background batches. Nothing is cancelled.
    ///
    /// Returns `true` when every batch finished in time.
    pub async fn drain(&self, timeout: Duration) -> bool {
        let remaining = self.batches.len();
        if remaining == 0 {
            info!("no generation batches to drain");
            return true;
        }

        info!(count = remaining, "waiting for generation batches to complete");
        self.batches.close();
        let drained = tokio::time::timeout(timeout, self.batches.wait()).await.is_ok();
        self.batches.reopen();

        if drained {
            info!("all generation batches drained");
        } else {
            warn!(
                remaining = self.batches.len(),
                "drain timeout reached, abandoning running batches"
            );
        }
        drained
    }
}

impl std::fmt::Debug for GenerationOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationOrchestrator")
            .field("in_flight", &self.batches.len())
            .field("max_in_flight", &self.max_in_flight)
            .finish_non_exhaustive()
    }
}
