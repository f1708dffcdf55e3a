// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message-event orchestration engine for the Kibitz bot.
//!
//! A [`PollingScheduler`] pulls new platform messages on an interval and
//! runs each through the [`TriggerEvaluator`]. Triggers become background
//! batches in the [`GenerationOrchestrator`], which fans out concurrent
//! generation attempts and records every outcome as a candidate on a
//! [`MessageEntity`] held by the [`MessageCatalog`]. The operator reviews
//! candidates through [`BotService`] and chooses what actually gets posted.

pub mod catalog;
pub mod entity;
pub mod orchestrator;
pub mod scheduler;
pub mod service;
pub mod settings;
pub mod shutdown;
pub mod state;
pub mod trigger;

pub use kibitz_core::RandomSource;

pub use catalog::MessageCatalog;
pub use entity::{EntityId, MessageEntity, ReplyOrigin};
pub use orchestrator::GenerationOrchestrator;
pub use scheduler::{CycleReport, PollingScheduler};
pub use service::{BotService, BotStatus, EngineOptions};
pub use settings::SettingsHandle;
pub use state::{BotState, DailyCounters, SharedState};
pub use trigger::{ThreadRandom, TriggerEvaluator};
