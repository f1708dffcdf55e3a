// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runtime handle to the behavior settings.

use std::sync::Arc;

use arc_swap::ArcSwap;
use kibitz_config::{BehaviorSettings, SettingsPatch, SettingsStore};
use kibitz_core::KibitzError;
use tokio::sync::Mutex;
use tracing::info;

/// Lock-free reads of the current settings; validated, persisted updates.
#[derive(Debug)]
pub struct SettingsHandle {
    current: ArcSwap<BehaviorSettings>,
    store: SettingsStore,
    writer: Mutex<()>,
}

impl SettingsHandle {
    pub fn new(store: SettingsStore, initial: BehaviorSettings) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
            store,
            writer: Mutex::new(()),
        }
    }

    /// Load the persisted document (defaults when missing).
    pub fn load(store: SettingsStore) -> Result<Self, KibitzError> {
        let initial = store.load()?;
        Ok(Self::new(store, initial))
    }

    /// The settings in effect right now. Callers keep the snapshot for the
    /// whole unit of work they are running.
    pub fn snapshot(&self) -> Arc<BehaviorSettings> {
        self.current.load_full()
    }

    /// Validate, persist, then swap. On any failure the current settings stay.
    pub async fn update(&self, patch: &SettingsPatch) -> Result<Arc<BehaviorSettings>, KibitzError> {
        let _guard = self.writer.lock().await;

        let next = patch
            .apply(&self.current.load())
            .map_err(|errors| KibitzError::Settings(errors.join("; ")))?;
        self.store.save(&next)?;

        let next = Arc::new(next);
        self.current.store(Arc::clone(&next));
        info!(
            polling_interval_seconds = next.polling_interval_seconds,
            random_messages_per_day = next.random_messages_per_day,
            message_generation_tries = next.message_generation_tries,
            "behavior settings updated"
        );
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle_in(dir: &tempfile::TempDir) -> SettingsHandle {
        SettingsHandle::load(SettingsStore::new(dir.path().join("settings.toml"))).unwrap()
    }

    #[tokio::test]
    async fn update_persists_and_swaps() {
        let dir = tempfile::tempdir().unwrap();
        let handle = handle_in(&dir);
        let before = handle.snapshot();

        let patch = SettingsPatch {
            polling_interval_seconds: Some(45),
            ..Default::default()
        };
        handle.update(&patch).await.unwrap();

        assert_eq!(before.polling_interval_seconds, 120);
        assert_eq!(handle.snapshot().polling_interval_seconds, 45);
        assert_eq!(handle_in(&dir).snapshot().polling_interval_seconds, 45);
    }

    #[tokio::test]
    async fn rejected_update_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let handle = handle_in(&dir);

        for secs in [0, 3601] {
            let patch = SettingsPatch {
                polling_interval_seconds: Some(secs),
                ..Default::default()
            };
            let err = handle.update(&patch).await.unwrap_err();
            assert!(matches!(err, KibitzError::Settings(_)));
        }
        assert_eq!(handle.snapshot().polling_interval_seconds, 120);
        assert!(!dir.path().join("settings.toml").exists());
    }

    #[tokio::test]
    async fn failed_save_keeps_previous_settings() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the document should be makes the rename fail.
        let path = dir.path().join("settings.toml");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("occupant"), "x").unwrap();
        let handle = SettingsHandle::new(SettingsStore::new(&path), BehaviorSettings::default());

        let patch = SettingsPatch {
            message_generation_tries: Some(6),
            ..Default::default()
        };
        assert!(matches!(
            handle.update(&patch).await,
            Err(KibitzError::Storage { .. })
        ));
        assert_eq!(handle.snapshot().message_generation_tries, 3);
    }
}
