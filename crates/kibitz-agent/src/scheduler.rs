// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The polling loop: fetch, evaluate, trigger, sleep.
//!
//! The loop is an explicit stopped/running state machine. Stopping cancels
//! the loop's own wait or fetch through a [`CancellationToken`]. Once a fetch
//! has returned, trigger evaluation and batch launch run to completion, and
//! launched batches keep running after the loop exits.

use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use chrono::Utc;
use kibitz_config::BehaviorSettings;
use kibitz_core::{KibitzError, PlatformAdapter, PollCursor, PromptContext, RawMessage};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::entity::ReplyOrigin;
use crate::orchestrator::GenerationOrchestrator;
use crate::settings::SettingsHandle;
use crate::state::SharedState;
use crate::trigger::TriggerEvaluator;

/// Wait after a failed cycle before trying again.
pub const ERROR_BACKOFF: Duration = Duration::from_secs(60);

/// What one cycle did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub replies_triggered: usize,
    pub random_triggered: bool,
    /// The first successful fetch only records the cursor.
    pub priming: bool,
    pub pruned: usize,
}

/// Messages from one fetch, before evaluation.
struct Fetched {
    messages: Vec<RawMessage>,
    priming: bool,
}

/// Position in the platform's message stream.
#[derive(Debug, Clone, Copy, Default)]
struct CursorState {
    primed: bool,
    cursor: Option<PollCursor>,
}

enum RunState {
    Stopped,
    Running {
        cancel: CancellationToken,
        handle: JoinHandle<()>,
    },
}

/// Collaborators one cycle needs.
struct CycleContext {
    platform: Arc<dyn PlatformAdapter>,
    settings: Arc<SettingsHandle>,
    state: SharedState,
    evaluator: TriggerEvaluator,
    orchestrator: GenerationOrchestrator,
    retention: chrono::Duration,
    cursor: Mutex<CursorState>,
}

/// Drives polling cycles on a background task.
pub struct PollingScheduler {
    ctx: Arc<CycleContext>,
    run_state: StdMutex<RunState>,
}

impl PollingScheduler {
    pub fn new(
        platform: Arc<dyn PlatformAdapter>,
        settings: Arc<SettingsHandle>,
        state: SharedState,
        evaluator: TriggerEvaluator,
        orchestrator: GenerationOrchestrator,
        retention_days: u64,
    ) -> Self {
        let retention = i64::try_from(retention_days)
            .ok()
            .and_then(chrono::Duration::try_days)
            .unwrap_or(chrono::Duration::MAX);
        Self {
            ctx: Arc::new(CycleContext {
                platform,
                settings,
                state,
                evaluator,
                orchestrator,
                retention,
                cursor: Mutex::new(CursorState::default()),
            }),
            run_state: StdMutex::new(RunState::Stopped),
        }
    }

    /// Start the loop. Returns `false` (with a warning) when already running.
    ///
    /// Each start re-primes the cursor, so messages posted while stopped
    /// never trigger replies.
    pub fn start(&self) -> bool {
        let mut run_state = self.lock_run_state();
        if let RunState::Running { handle, .. } = &*run_state
            && !handle.is_finished()
        {
            warn!("bot is already running");
            return false;
        }

        info!("starting bot polling");
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(polling_loop(Arc::clone(&self.ctx), cancel.clone()));
        *run_state = RunState::Running { cancel, handle };
        true
    }

    /// Stop the loop and wait for it to exit. Returns `false` (with a
    /// warning) when already stopped. Launched batches are left running.
    pub async fn stop(&self) -> bool {
        let previous = std::mem::replace(&mut *self.lock_run_state(), RunState::Stopped);
        match previous {
            RunState::Stopped => {
                warn!("bot is not running");
                false
            }
            RunState::Running { cancel, handle } => {
                info!("stopping bot polling");
                cancel.cancel();
                if let Err(e) = handle.await {
                    error!(error = %e, "polling task ended abnormally");
                }
                info!("bot polling stopped");
                true
            }
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(&*self.lock_run_state(), RunState::Running { handle, .. } if !handle.is_finished())
    }

    /// Forget the stream position; the next cycle primes again.
    pub async fn reset_cursor(&self) {
        *self.ctx.cursor.lock().await = CursorState::default();
    }

    /// Run a single cycle against `settings` outside the loop.
    pub async fn run_cycle(&self, settings: &BehaviorSettings) -> Result<CycleReport, KibitzError> {
        self.ctx.run_cycle(settings).await
    }

    fn lock_run_state(&self) -> std::sync::MutexGuard<'_, RunState> {
        // A poisoned lock only means a panic happened mid-replace; the enum is still valid.
        self.run_state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl std::fmt::Debug for PollingScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingScheduler")
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

async fn polling_loop(ctx: Arc<CycleContext>, cancel: CancellationToken) {
    *ctx.cursor.lock().await = CursorState::default();
    let mut last_interval = None;

    loop {
        let settings = ctx.settings.snapshot();
        if last_interval != Some(settings.polling_interval_seconds) {
            info!(
                interval_secs = settings.polling_interval_seconds,
                "polling interval in effect"
            );
            last_interval = Some(settings.polling_interval_seconds);
        }

        let fetched = tokio::select! {
            _ = cancel.cancelled() => break,
            fetched = ctx.fetch() => fetched,
        };

        let wait = match fetched {
            Ok(fetched) => {
                let report = ctx.process(&settings, fetched).await;
                debug!(?report, "polling cycle completed");
                Duration::from_secs(settings.polling_interval_seconds)
            }
            Err(e) => {
                error!(error = %e, backoff_secs = ERROR_BACKOFF.as_secs(), "polling cycle failed");
                ERROR_BACKOFF
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(wait) => {}
        }
    }

    info!("polling loop cancelled");
}

impl CycleContext {
    async fn run_cycle(&self, settings: &BehaviorSettings) -> Result<CycleReport, KibitzError> {
        let fetched = self.fetch().await?;
        Ok(self.process(settings, fetched).await)
    }

    /// Poll past the cursor and advance it to the newest message seen.
    async fn fetch(&self) -> Result<Fetched, KibitzError> {
        let mut position = self.cursor.lock().await;
        let messages = self.platform.poll_since(position.cursor).await?;
        let priming = !position.primed;

        let newest = messages.iter().map(|m| PollCursor(m.created_at)).max();
        position.cursor = position.cursor.max(newest);
        position.primed = true;
        info!(count = messages.len(), "fetched new messages");
        Ok(Fetched { messages, priming })
    }

    /// Evaluate triggers, launch batches and prune expired entities.
    async fn process(&self, settings: &BehaviorSettings, fetched: Fetched) -> CycleReport {
        let mut report = CycleReport {
            fetched: fetched.messages.len(),
            priming: fetched.priming,
            ..CycleReport::default()
        };

        if report.priming {
            info!("first poll records the cursor only, nothing triggered");
        } else {
            for message in &fetched.messages {
                if !self
                    .evaluator
                    .should_emit_reply(settings, message.engagement_count, &message.text)
                {
                    continue;
                }
                info!(message_id = %message.id, likes = message.engagement_count, "reply triggered");
                let context = PromptContext::Reply {
                    original_text: message.text.clone(),
                    username: message.author_name.clone(),
                };
                let origin = ReplyOrigin {
                    reply_to_id: message.id.clone(),
                    original_text: message.text.clone(),
                    username: message.author_name.clone(),
                };
                if self
                    .orchestrator
                    .spawn_batch(context, Some(origin), settings.message_generation_tries)
                    .await
                {
                    report.replies_triggered += 1;
                }
            }

            let now = Utc::now();
            let emit_random = {
                let mut state = self.state.lock().await;
                self.evaluator
                    .should_emit_random(settings, &mut state.counters, now)
            };
            // Only a launched batch counts toward the daily total.
            if emit_random
                && self
                    .orchestrator
                    .spawn_batch(PromptContext::Random, None, settings.message_generation_tries)
                    .await
            {
                let mut state = self.state.lock().await;
                state.counters.record_random(now);
                debug!(today = state.counters.messages_per_day, "random message recorded");
                report.random_triggered = true;
            }
        }

        if let Some(cutoff) = Utc::now().checked_sub_signed(self.retention) {
            report.pruned = self.state.lock().await.catalog.prune_older_than(cutoff);
            if report.pruned > 0 {
                info!(count = report.pruned, "pruned expired messages");
            }
        }

        report
    }
}
