// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! State shared between the polling loop, generation batches and the operator API.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::catalog::MessageCatalog;

/// Random messages emitted in the current day window.
#[derive(Debug, Clone, Serialize)]
pub struct DailyCounters {
    pub messages_per_day: u32,
    pub last_reset_at: DateTime<Utc>,
}

impl DailyCounters {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            messages_per_day: 0,
            last_reset_at: now,
        }
    }

    /// Zero the counter when a full day has passed since `last_reset_at`.
    pub fn reset_if_stale(&mut self, now: DateTime<Utc>) -> bool {
        if now - self.last_reset_at >= Duration::days(1) {
            self.messages_per_day = 0;
            self.last_reset_at = now;
            true
        } else {
            false
        }
    }

    pub fn record_random(&mut self, now: DateTime<Utc>) {
        self.messages_per_day += 1;
        self.last_reset_at = now;
    }
}

/// Catalog and counters, guarded together by one mutex.
#[derive(Debug)]
pub struct BotState {
    pub catalog: MessageCatalog,
    pub counters: DailyCounters,
}

impl BotState {
    pub fn new() -> Self {
        Self {
            catalog: MessageCatalog::new(),
            counters: DailyCounters::new(Utc::now()),
        }
    }
}

impl Default for BotState {
    fn default() -> Self {
        Self::new()
    }
}

pub type SharedState = Arc<Mutex<BotState>>;

pub fn shared_state() -> SharedState {
    Arc::new(Mutex::new(BotState::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_resets_after_a_day() {
        let start = Utc::now();
        let mut counters = DailyCounters::new(start);
        counters.record_random(start);
        counters.record_random(start);
        assert_eq!(counters.messages_per_day, 2);

        assert!(!counters.reset_if_stale(start + Duration::hours(23)));
        assert_eq!(counters.messages_per_day, 2);

        assert!(counters.reset_if_stale(start + Duration::hours(24)));
        assert_eq!(counters.messages_per_day, 0);
    }
}
