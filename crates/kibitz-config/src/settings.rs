// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator-tunable behavior settings and validated partial updates.

use serde::{Deserialize, Serialize};

/// Longest accepted polling interval.
pub const MAX_POLLING_INTERVAL_SECS: u64 = 3600;

/// Seconds in a day, the horizon `random_messages_per_day` is spread over.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Behavior settings read by the polling loop and the orchestrator.
///
/// Every cycle works on one snapshot of this struct, so an update made while
/// a cycle is running takes effect from the next cycle on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BehaviorSettings {
    /// Target number of unsolicited messages per day. Must be positive.
    #[serde(default = "default_random_messages_per_day")]
    pub random_messages_per_day: f64,

    /// Reply probability contributed by each like on an incoming message.
    #[serde(default = "default_reply_chance_per_like")]
    pub reply_chance_per_like: f64,

    /// Floor for the reply probability, in `[0, 1]`.
    #[serde(default = "default_minimum_reply_chance")]
    pub minimum_reply_chance: f64,

    /// Candidates generated per batch.
    #[serde(default = "default_message_generation_tries")]
    pub message_generation_tries: u32,

    /// Seconds between polling cycles, `1..=3600`.
    #[serde(default = "default_polling_interval_seconds")]
    pub polling_interval_seconds: u64,

    /// Prompt used for introduction batches.
    #[serde(default = "default_introduction_prompt")]
    pub introduction_prompt: String,
}

impl Default for BehaviorSettings {
    fn default() -> Self {
        Self {
            random_messages_per_day: default_random_messages_per_day(),
            reply_chance_per_like: default_reply_chance_per_like(),
            minimum_reply_chance: default_minimum_reply_chance(),
            message_generation_tries: default_message_generation_tries(),
            polling_interval_seconds: default_polling_interval_seconds(),
            introduction_prompt: default_introduction_prompt(),
        }
    }
}

fn default_random_messages_per_day() -> f64 {
    5.0
}

fn default_reply_chance_per_like() -> f64 {
    0.3
}

fn default_minimum_reply_chance() -> f64 {
    0.01
}

fn default_message_generation_tries() -> u32 {
    3
}

fn default_polling_interval_seconds() -> u64 {
    120
}

fn default_introduction_prompt() -> String {
    "Introduce yourself as a friendly bot that's here to chat and help out!".to_string()
}

impl BehaviorSettings {
    /// Polling cycles in one day at the current interval.
    pub fn cycles_per_day(&self) -> f64 {
        SECONDS_PER_DAY / self.polling_interval_seconds.max(1) as f64
    }

    /// Chance that a single cycle emits a random message.
    ///
    /// Not clamped: a value above 1.0 means every cycle triggers.
    pub fn random_probability_per_cycle(&self) -> f64 {
        self.random_messages_per_day / self.cycles_per_day()
    }

    /// Check every field, returning one message per violation.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !(self.random_messages_per_day.is_finite() && self.random_messages_per_day > 0.0) {
            errors.push(format!(
                "random_messages_per_day must be greater than 0, got {}",
                self.random_messages_per_day
            ));
        }
        if !(self.reply_chance_per_like.is_finite() && self.reply_chance_per_like >= 0.0) {
            errors.push(format!(
                "reply_chance_per_like must be non-negative, got {}",
                self.reply_chance_per_like
            ));
        }
        if !(0.0..=1.0).contains(&self.minimum_reply_chance) {
            errors.push(format!(
                "minimum_reply_chance must be between 0 and 1, got {}",
                self.minimum_reply_chance
            ));
        }
        if self.message_generation_tries < 1 {
            errors.push("message_generation_tries must be at least 1".to_string());
        }
        if let Err(message) = check_polling_interval(self.polling_interval_seconds as i64) {
            errors.push(message);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn check_polling_interval(secs: i64) -> Result<u64, String> {
    if secs <= 0 {
        return Err("polling interval must be greater than 0 seconds".to_string());
    }
    if secs as u64 > MAX_POLLING_INTERVAL_SECS {
        return Err(format!(
            "polling interval cannot be more than {MAX_POLLING_INTERVAL_SECS} seconds (1 hour)"
        ));
    }
    Ok(secs as u64)
}

/// A partial settings update as submitted by an operator.
///
/// Integer fields are signed so out-of-range input such as `-5` reaches
/// validation instead of failing deserialization with a type error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_messages_per_day: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_chance_per_like: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_reply_chance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_generation_tries: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polling_interval_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introduction_prompt: Option<String>,
}

impl SettingsPatch {
    /// True when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge into a copy of `current` and validate the result.
    ///
    /// `current` is never modified; on failure every violation is reported.
    pub fn apply(&self, current: &BehaviorSettings) -> Result<BehaviorSettings, Vec<String>> {
        let mut next = current.clone();
        let mut errors = Vec::new();

        if let Some(v) = self.random_messages_per_day {
            next.random_messages_per_day = v;
        }
        if let Some(v) = self.reply_chance_per_like {
            next.reply_chance_per_like = v;
        }
        if let Some(v) = self.minimum_reply_chance {
            next.minimum_reply_chance = v;
        }
        if let Some(v) = self.message_generation_tries {
            match u32::try_from(v) {
                Ok(tries) if tries >= 1 => next.message_generation_tries = tries,
                _ => errors.push(format!("message_generation_tries must be at least 1, got {v}")),
            }
        }
        if let Some(v) = self.polling_interval_seconds {
            match check_polling_interval(v) {
                Ok(secs) => next.polling_interval_seconds = secs,
                Err(message) => errors.push(message),
            }
        }
        if let Some(v) = &self.introduction_prompt {
            next.introduction_prompt = v.clone();
        }

        // Rejected integer fields were never merged, so these checks only
        // report the float fields.
        if let Err(merged) = next.validate() {
            errors.extend(merged);
        }

        if errors.is_empty() {
            Ok(next)
        } else {
            Err(errors)
        }
    }
}
