// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure decision logic for unsolicited posts and replies.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kibitz_config::BehaviorSettings;
use kibitz_core::RandomSource;
use tracing::{debug, info};

use crate::state::DailyCounters;

/// Samples from the thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn sample(&self) -> f64 {
        rand::random::<f64>()
    }
}

/// Per-cycle chance of a random message: `messages_per_day / cycles_per_day`.
///
/// Deliberately unclamped. A value above 1.0 triggers on every cycle.
pub fn random_probability(settings: &BehaviorSettings) -> f64 {
    settings.random_probability_per_cycle()
}

/// Chance of replying to a message with `likes` likes.
///
/// The like-driven part is capped at 1.0. A keyword hit lifts the result
/// above 1.0 so the reply always triggers; the configured floor applies last.
pub fn reply_probability(settings: &BehaviorSettings, likes: u32, text: &str, keyword: &str) -> f64 {
    let mut p = (settings.reply_chance_per_like * f64::from(likes)).min(1.0);
    if mentions(text, keyword) {
        p += 1.0;
    }
    p.max(settings.minimum_reply_chance)
}

fn mentions(text: &str, keyword: &str) -> bool {
    !keyword.is_empty() && text.to_lowercase().contains(&keyword.to_lowercase())
}

/// Draws against the probabilities above using an injectable random source.
#[derive(Clone)]
pub struct TriggerEvaluator {
    keyword: String,
    rng: Arc<dyn RandomSource>,
}

impl TriggerEvaluator {
    pub fn new(keyword: impl Into<String>, rng: Arc<dyn RandomSource>) -> Self {
        Self {
            keyword: keyword.into(),
            rng,
        }
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Decide whether this cycle emits a random message.
    ///
    /// Resets stale daily counters first. Recording the emission is left to
    /// the caller, once the batch has actually launched.
    pub fn should_emit_random(
        &self,
        settings: &BehaviorSettings,
        counters: &mut DailyCounters,
        now: DateTime<Utc>,
    ) -> bool {
        if counters.reset_if_stale(now) {
            debug!("daily random message counter reset");
        }

        let probability = random_probability(settings);
        let triggered = self.rng.sample() < probability;
        if triggered {
            info!(
                probability,
                target_per_day = settings.random_messages_per_day,
                "random message triggered"
            );
        } else {
            debug!(probability, "random message skipped");
        }
        triggered
    }

    pub fn should_emit_reply(&self, settings: &BehaviorSettings, likes: u32, text: &str) -> bool {
        let probability = reply_probability(settings, likes, text, &self.keyword);
        let triggered = self.rng.sample() <= probability;
        debug!(likes, probability, triggered, "reply decision");
        triggered
    }
}

impl std::fmt::Debug for TriggerEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerEvaluator")
            .field("keyword", &self.keyword)
            .finish_non_exhaustive()
    }
}
