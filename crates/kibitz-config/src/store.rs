// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flat TOML document holding the persisted [`BehaviorSettings`].

use std::path::{Path, PathBuf};

use kibitz_core::KibitzError;
use tracing::{debug, info};

use crate::settings::BehaviorSettings;

/// Loads and atomically rewrites the behavior settings document.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document. A missing file yields the defaults.
    pub fn load(&self) -> Result<BehaviorSettings, KibitzError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "settings document not found, using defaults");
                return Ok(BehaviorSettings::default());
            }
            Err(e) => return Err(KibitzError::Storage { source: Box::new(e) }),
        };

        let settings: BehaviorSettings = toml::from_str(&content).map_err(|e| {
            KibitzError::Settings(format!("{}: {e}", self.path.display()))
        })?;
        settings
            .validate()
            .map_err(|errors| KibitzError::Settings(errors.join("; ")))?;

        debug!(path = %self.path.display(), "settings loaded");
        Ok(settings)
    }

    /// Write the document through a sibling temp file renamed into place,
    /// so readers never observe a partially written file.
    pub fn save(&self, settings: &BehaviorSettings) -> Result<(), KibitzError> {
        let body = toml::to_string_pretty(settings)
            .map_err(|e| KibitzError::Storage { source: Box::new(e) })?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| KibitzError::Storage { source: Box::new(e) })?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, body).map_err(|e| KibitzError::Storage { source: Box::new(e) })?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| KibitzError::Storage { source: Box::new(e) })?;

        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}
