// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end engine tests.
//!
//! `TestHarness` assembles a [`BotService`] over [`MockPlatform`],
//! [`MockGenerator`] and [`FixedRandom`], with the settings document in a
//! temp directory that is removed on drop.

use std::sync::Arc;

use kibitz_agent::{BotService, EngineOptions, SettingsHandle};
use kibitz_config::{BehaviorSettings, SettingsStore};
use kibitz_core::KibitzError;

use crate::mock_generator::MockGenerator;
use crate::mock_platform::MockPlatform;
use crate::random::FixedRandom;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    generator: Option<MockGenerator>,
    settings: BehaviorSettings,
    sample: f64,
    options: EngineOptions,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            generator: None,
            settings: BehaviorSettings::default(),
            // High enough that only keyword replies fire by default.
            sample: 0.999,
            options: EngineOptions::default(),
        }
    }

    /// Use a pre-scripted generator.
    pub fn with_generator(mut self, generator: MockGenerator) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Initial behavior settings (persisted before the service starts).
    pub fn with_settings(mut self, settings: BehaviorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Value every random draw returns.
    pub fn with_random_sample(mut self, sample: f64) -> Self {
        self.sample = sample;
        self
    }

    pub fn with_max_in_flight(mut self, max: usize) -> Self {
        self.options.max_in_flight_batches = max;
        self
    }

    pub fn with_retention_days(mut self, days: u64) -> Self {
        self.options.retention_days = days;
        self
    }

    pub fn build(self) -> Result<TestHarness, KibitzError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| KibitzError::Storage { source: e.into() })?;
        let store = SettingsStore::new(temp_dir.path().join("settings.toml"));
        store.save(&self.settings)?;
        let settings = Arc::new(SettingsHandle::load(store)?);

        let platform = Arc::new(MockPlatform::new());
        let generator = Arc::new(self.generator.unwrap_or_default());
        let service = Arc::new(BotService::new(
            platform.clone(),
            generator.clone(),
            settings.clone(),
            Arc::new(FixedRandom(self.sample)),
            self.options,
        ));

        Ok(TestHarness {
            service,
            platform,
            generator,
            settings,
            temp_dir,
        })
    }
}

/// A complete engine over mock adapters.
pub struct TestHarness {
    pub service: Arc<BotService>,
    pub platform: Arc<MockPlatform>,
    pub generator: Arc<MockGenerator>,
    pub settings: Arc<SettingsHandle>,
    temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Path of the persisted settings document.
    pub fn settings_path(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("settings.toml")
    }
}
