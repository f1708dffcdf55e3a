// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Kibitz integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without GroupMe or OpenAI.
//!
//! # Components
//!
//! - [`MockPlatform`] - scripted poll results, captured sends
//! - [`MockGenerator`] - scripted successes, failures and delays
//! - [`FixedRandom`] - a random source that always returns one value
//! - [`TestHarness`] - a complete [`kibitz_agent::BotService`] over the mocks

pub mod harness;
pub mod mock_generator;
pub mod mock_platform;
pub mod random;

pub use harness::TestHarness;
pub use mock_generator::MockGenerator;
pub use mock_platform::{MockPlatform, SentMessage, raw_message};
pub use random::FixedRandom;
