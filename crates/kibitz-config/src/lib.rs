// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Kibitz bot.
//!
//! Two layers live here:
//!
//! - **Static configuration** ([`KibitzConfig`]): credentials, endpoints and
//!   process limits, parsed from TOML with strict validation
//!   (`deny_unknown_fields`), XDG file hierarchy lookup, `KIBITZ_*`
//!   environment overrides, and miette diagnostics with typo suggestions.
//! - **Behavior settings** ([`BehaviorSettings`]): the operator-tunable knobs
//!   (posting rate, reply odds, fan-out width, polling interval). They are
//!   persisted to a flat TOML document by [`SettingsStore`] and changed at
//!   runtime through validated [`SettingsPatch`]es.
//!
//! # Usage
//!
//! ```no_run
//! use kibitz_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("Agent name: {}", config.agent.name);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod settings;
pub mod store;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::KibitzConfig;
pub use settings::{BehaviorSettings, SettingsPatch};
pub use store::SettingsStore;

/// Load configuration from the XDG hierarchy and validate it.
///
/// 1. Loads config from TOML files + env vars via Figment
/// 2. On success: fills credential fallbacks and runs validation
/// 3. On Figment error: converts to miette diagnostics with typo suggestions
pub fn load_and_validate() -> Result<KibitzConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(mut config) => {
            loader::apply_env_fallbacks(&mut config);
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let toml_sources = collect_toml_sources();
            Err(diagnostic::figment_to_config_errors(err, &toml_sources))
        }
    }
}

/// Load configuration from an explicit file path and validate it.
pub fn load_and_validate_path(
    path: &std::path::Path,
) -> Result<KibitzConfig, Vec<ConfigError>> {
    match loader::load_config_from_path(path) {
        Ok(mut config) => {
            loader::apply_env_fallbacks(&mut config);
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = std::fs::read_to_string(path)
                .map(|content| vec![(path.display().to_string(), content)])
                .unwrap_or_default();
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<KibitzConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Collect TOML source file contents for error span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    let mut sources = Vec::new();

    if let Ok(content) = std::fs::read_to_string("kibitz.toml") {
        let path = std::env::current_dir()
            .map(|d| d.join("kibitz.toml").display().to_string())
            .unwrap_or_else(|_| "kibitz.toml".to_string());
        sources.push((path, content));
    }

    if let Some(config_dir) = dirs::config_dir() {
        let path = config_dir.join("kibitz/kibitz.toml");
        if let Ok(content) = std::fs::read_to_string(&path) {
            sources.push((path.display().to_string(), content));
        }
    }

    let system_path = std::path::Path::new("/etc/kibitz/kibitz.toml");
    if let Ok(content) = std::fs::read_to_string(system_path) {
        sources.push((system_path.display().to_string(), content));
    }

    sources
}
