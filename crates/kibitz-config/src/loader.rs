// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./kibitz.toml` > `~/.config/kibitz/kibitz.toml` > `/etc/kibitz/kibitz.toml`
//! with environment variable overrides via `KIBITZ_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::KibitzConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/kibitz/kibitz.toml` (system-wide)
/// 3. `~/.config/kibitz/kibitz.toml` (user XDG config)
/// 4. `./kibitz.toml` (local directory)
/// 5. `KIBITZ_*` environment variables
pub fn load_config() -> Result<KibitzConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<KibitzConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KibitzConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<KibitzConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KibitzConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(KibitzConfig::default()))
        .merge(Toml::file("/etc/kibitz/kibitz.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("kibitz/kibitz.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("kibitz.toml"))
        .merge(env_provider())
}

/// Fill unset credentials from the conventional un-prefixed variables.
///
/// `GROUPME_ACCESS_TOKEN`, `OPENAI_API_KEY` and `BOT_GROUP_ID` are what the
/// respective services document, so they are honored when the `KIBITZ_*`
/// form is absent.
pub fn apply_env_fallbacks(config: &mut KibitzConfig) {
    apply_fallbacks_from(config, |key| std::env::var(key).ok());
}

fn apply_fallbacks_from(config: &mut KibitzConfig, lookup: impl Fn(&str) -> Option<String>) {
    let fill = |slot: &mut Option<String>, key: &str| {
        if slot.is_none() {
            *slot = lookup(key).filter(|v| !v.trim().is_empty());
        }
    };
    fill(&mut config.groupme.access_token, "GROUPME_ACCESS_TOKEN");
    fill(&mut config.groupme.group_id, "BOT_GROUP_ID");
    fill(&mut config.openai.api_key, "OPENAI_API_KEY");
}

/// Environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `KIBITZ_GROUPME_ACCESS_TOKEN` must map to
/// `groupme.access_token`, not `groupme.access.token`.
fn env_provider() -> Env {
    Env::prefixed("KIBITZ_").map(|key| {
        let mapped = key
            .as_str()
            .replacen("agent_", "agent.", 1)
            .replacen("groupme_", "groupme.", 1)
            .replacen("openai_", "openai.", 1)
            .replacen("gateway_", "gateway.", 1)
            .replacen("settings_", "settings.", 1);
        mapped.into()
    })
}
