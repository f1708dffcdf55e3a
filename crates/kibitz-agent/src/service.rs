// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The operator-facing facade over catalog, settings, orchestrator and scheduler.

use std::sync::Arc;
use std::time::Duration;

use kibitz_config::model::AgentConfig;
use kibitz_config::{BehaviorSettings, SettingsPatch};
use kibitz_core::{
    GeneratorAdapter, GroupInfo, KibitzError, PlatformAdapter, PromptContext, RandomSource,
};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::entity::{EntityId, MessageEntity};
use crate::orchestrator::GenerationOrchestrator;
use crate::scheduler::{CycleReport, PollingScheduler};
use crate::settings::SettingsHandle;
use crate::state::{SharedState, shared_state};
use crate::trigger::{TriggerEvaluator, random_probability};

/// Engine limits taken from the `[agent]` config section.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub trigger_keyword: String,
    pub retention_days: u64,
    pub max_in_flight_batches: usize,
}

impl From<&AgentConfig> for EngineOptions {
    fn from(agent: &AgentConfig) -> Self {
        Self {
            trigger_keyword: agent.trigger_keyword.clone(),
            retention_days: agent.retention_days,
            max_in_flight_batches: agent.max_in_flight_batches,
        }
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::from(&AgentConfig::default())
    }
}

/// Snapshot reported by `GET /api/status`.
#[derive(Debug, Clone, Serialize)]
pub struct BotStatus {
    pub running: bool,
    pub bot_server_set: bool,
    pub bot_server_info: Option<GroupInfo>,
    pub messages_per_day: u32,
    pub target_messages_per_day: f64,
    pub polling_interval_seconds: u64,
    pub probability_per_cycle: f64,
    pub pending_messages: usize,
    pub generating_messages: usize,
    pub in_flight_batches: usize,
}

/// Everything the operator can do to the bot.
pub struct BotService {
    state: SharedState,
    settings: Arc<SettingsHandle>,
    platform: Arc<dyn PlatformAdapter>,
    orchestrator: GenerationOrchestrator,
    scheduler: PollingScheduler,
    send_lock: Mutex<()>,
}

impl BotService {
    pub fn new(
        platform: Arc<dyn PlatformAdapter>,
        generator: Arc<dyn GeneratorAdapter>,
        settings: Arc<SettingsHandle>,
        rng: Arc<dyn RandomSource>,
        options: EngineOptions,
    ) -> Self {
        let state = shared_state();
        let orchestrator =
            GenerationOrchestrator::new(state.clone(), generator, options.max_in_flight_batches);
        let scheduler = PollingScheduler::new(
            Arc::clone(&platform),
            Arc::clone(&settings),
            state.clone(),
            TriggerEvaluator::new(options.trigger_keyword, rng),
            orchestrator.clone(),
            options.retention_days,
        );
        Self {
            state,
            settings,
            platform,
            orchestrator,
            scheduler,
            send_lock: Mutex::new(()),
        }
    }

    pub async fn pending_messages(&self) -> Vec<MessageEntity> {
        self.state.lock().await.catalog.list_pending()
    }

    pub async fn message(&self, id: &str) -> Result<MessageEntity, KibitzError> {
        let id: EntityId = id.parse()?;
        self.state
            .lock()
            .await
            .catalog
            .get(id)
            .cloned()
            .ok_or_else(|| KibitzError::NotFound { id: id.to_string() })
    }

    pub async fn select(&self, id: &str, index: i64) -> Result<MessageEntity, KibitzError> {
        let id: EntityId = id.parse()?;
        let entity = self.state.lock().await.catalog.select(id, index)?.clone();
        info!(entity_id = %id, index, "candidate selected");
        Ok(entity)
    }

    pub async fn delete(&self, id: &str) -> Result<MessageEntity, KibitzError> {
        let id: EntityId = id.parse()?;
        let entity = self.state.lock().await.catalog.mark_deleted(id)?.clone();
        info!(entity_id = %id, "message deleted");
        Ok(entity)
    }

    /// Deliver the selected candidate, threaded under the original message
    /// for replies, then mark the entity sent.
    ///
    /// Nothing is marked when delivery fails.
    pub async fn send_selected(&self, id: &str) -> Result<MessageEntity, KibitzError> {
        let id: EntityId = id.parse()?;
        let _sending = self.send_lock.lock().await;

        let (text, reply_to) = {
            let state = self.state.lock().await;
            let entity = state
                .catalog
                .get(id)
                .ok_or_else(|| KibitzError::NotFound { id: id.to_string() })?;
            (
                entity.sendable_text()?.to_string(),
                entity.reply_to_id().map(str::to_string),
            )
        };

        info!(entity_id = %id, reply_to = ?reply_to, "sending message");
        self.platform.send(&text, reply_to.as_deref()).await?;

        let entity = self.state.lock().await.catalog.mark_sent(id)?.clone();
        info!(entity_id = %id, "message sent");
        Ok(entity)
    }

    /// Generate an introduction batch and wait for it.
    pub async fn generate_introduction(&self) -> Result<MessageEntity, KibitzError> {
        let settings = self.settings.snapshot();
        let context = PromptContext::Introduction {
            prompt: settings.introduction_prompt.clone(),
        };
        self.orchestrator
            .generate_batch(context, None, settings.message_generation_tries)
            .await
    }

    /// Generate a manual test batch and wait for it.
    pub async fn generate_manual(&self) -> Result<MessageEntity, KibitzError> {
        let settings = self.settings.snapshot();
        self.orchestrator
            .generate_batch(PromptContext::Manual, None, settings.message_generation_tries)
            .await
    }

    pub fn settings(&self) -> Arc<BehaviorSettings> {
        self.settings.snapshot()
    }

    pub async fn update_settings(
        &self,
        patch: &SettingsPatch,
    ) -> Result<Arc<BehaviorSettings>, KibitzError> {
        self.settings.update(patch).await
    }

    /// Point the bot at another group. The next cycle re-primes the cursor.
    pub async fn set_group(&self, group_id: &str) -> Result<(), KibitzError> {
        let group_id = group_id.trim();
        if group_id.is_empty() {
            return Err(KibitzError::Config("group id is required".to_string()));
        }
        self.platform.set_group(group_id).await?;
        self.scheduler.reset_cursor().await;
        info!(group_id, "bot group changed");
        Ok(())
    }

    pub fn start(&self) -> bool {
        self.scheduler.start()
    }

    pub async fn stop(&self) -> bool {
        self.scheduler.stop().await
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Run one polling cycle with the current settings, outside the loop.
    pub async fn run_cycle(&self) -> Result<CycleReport, KibitzError> {
        let settings = self.settings.snapshot();
        self.scheduler.run_cycle(&settings).await
    }

    pub async fn status(&self) -> BotStatus {
        let settings = self.settings.snapshot();

        let group = self.platform.current_group().await;
        let bot_server_info = match &group {
            None => None,
            Some(group_id) => match self.platform.group_info().await {
                Ok(info) => info,
                Err(e) => {
                    warn!(group_id = %group_id, error = %e, "could not fetch group info");
                    None
                }
            },
        };

        let state = self.state.lock().await;
        BotStatus {
            running: self.is_running(),
            bot_server_set: group.is_some(),
            bot_server_info,
            messages_per_day: state.counters.messages_per_day,
            target_messages_per_day: settings.random_messages_per_day,
            polling_interval_seconds: settings.polling_interval_seconds,
            probability_per_cycle: (random_probability(&settings) * 10_000.0).round() / 10_000.0,
            pending_messages: state.catalog.count_pending(),
            generating_messages: state.catalog.count_generating(),
            in_flight_batches: self.orchestrator.in_flight(),
        }
    }

    /// Stop polling and wait up to `timeout` for launched batches.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        if self.is_running() {
            self.stop().await;
        }
        self.orchestrator.drain(timeout).await
    }
}

impl std::fmt::Debug for BotService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotService")
            .field("scheduler", &self.scheduler)
            .field("orchestrator", &self.orchestrator)
            .finish_non_exhaustive()
    }
}
