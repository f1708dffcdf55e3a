// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static configuration model.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Kibitz configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. Every section is optional and defaults to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KibitzConfig {
    /// Bot identity and engine limits.
    #[serde(default)]
    pub agent: AgentConfig,

    /// GroupMe platform settings.
    #[serde(default)]
    pub groupme: GroupMeConfig,

    /// OpenAI generation backend settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Operator HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Location of the persisted behavior settings document.
    #[serde(default)]
    pub settings: SettingsConfig,
}

/// Bot identity and engine limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the bot, used in logs.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Incoming messages containing this word (any case) are always answered.
    #[serde(default = "default_trigger_keyword")]
    pub trigger_keyword: String,

    /// Entities older than this many days are dropped from the catalog.
    #[serde(default = "default_retention_days")]
    pub retention_days: u64,

    /// Upper bound on generation batches running at once. Triggers beyond it are skipped.
    #[serde(default = "default_max_in_flight_batches")]
    pub max_in_flight_batches: usize,

    /// How long shutdown waits for in-flight batches to finish.
    #[serde(default = "default_drain_timeout_secs")]
    pub drain_timeout_secs: u64,

    /// Start polling as soon as the server is up.
    #[serde(default = "default_autostart")]
    pub autostart: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            trigger_keyword: default_trigger_keyword(),
            retention_days: default_retention_days(),
            max_in_flight_batches: default_max_in_flight_batches(),
            drain_timeout_secs: default_drain_timeout_secs(),
            autostart: default_autostart(),
        }
    }
}

fn default_agent_name() -> String {
    "kibitz".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_trigger_keyword() -> String {
    "keller".to_string()
}

fn default_retention_days() -> u64 {
    7
}

fn default_max_in_flight_batches() -> usize {
    64
}

fn default_drain_timeout_secs() -> u64 {
    30
}

fn default_autostart() -> bool {
    true
}

/// GroupMe platform configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GroupMeConfig {
    /// GroupMe API access token. Falls back to `GROUPME_ACCESS_TOKEN`.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Group the bot participates in. Falls back to `BOT_GROUP_ID`.
    #[serde(default)]
    pub group_id: Option<String>,

    /// Base URL of the GroupMe v3 API.
    #[serde(default = "default_groupme_api_base")]
    pub api_base: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_groupme_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for GroupMeConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            group_id: None,
            api_base: default_groupme_api_base(),
            request_timeout_secs: default_groupme_timeout_secs(),
        }
    }
}

fn default_groupme_api_base() -> String {
    "https://api.groupme.com/v3".to_string()
}

fn default_groupme_timeout_secs() -> u64 {
    30
}

/// OpenAI generation backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// OpenAI API key. Falls back to `OPENAI_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used for every generation attempt.
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// Base URL of the OpenAI API.
    #[serde(default = "default_openai_api_base")]
    pub api_base: String,

    /// Reasoning effort hint (minimal, low, medium, high).
    #[serde(default = "default_reasoning_effort")]
    pub reasoning_effort: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_openai_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Text file with the persona's style instructions.
    #[serde(default)]
    pub persona_file: Option<String>,

    /// Text file with one signature phrase per line.
    #[serde(default)]
    pub phrases_file: Option<String>,

    /// Text file with one message type per line.
    #[serde(default)]
    pub message_types_file: Option<String>,

    /// Text file with one persona stance per line, used for replies.
    #[serde(default)]
    pub stances_file: Option<String>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_openai_model(),
            api_base: default_openai_api_base(),
            reasoning_effort: default_reasoning_effort(),
            request_timeout_secs: default_openai_timeout_secs(),
            persona_file: None,
            phrases_file: None,
            message_types_file: None,
            stances_file: None,
        }
    }
}

fn default_openai_model() -> String {
    "gpt-5".to_string()
}

fn default_openai_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_reasoning_effort() -> String {
    "low".to_string()
}

fn default_openai_timeout_secs() -> u64 {
    120
}

/// Operator HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Serve the operator API.
    #[serde(default = "default_gateway_enabled")]
    pub enabled: bool,

    /// Address to bind.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bearer token required on `/api/*` routes. `None` leaves them open.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: default_gateway_enabled(),
            host: default_gateway_host(),
            port: default_gateway_port(),
            bearer_token: None,
        }
    }
}

fn default_gateway_enabled() -> bool {
    true
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8080
}

/// Where the behavior settings document lives.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsConfig {
    /// Path of the flat TOML document holding [`crate::BehaviorSettings`].
    #[serde(default = "default_settings_path")]
    pub path: String,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            path: default_settings_path(),
        }
    }
}

fn default_settings_path() -> String {
    "kibitz-settings.toml".to_string()
}

impl KibitzConfig {
    /// Copy of the configuration with every secret replaced, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        let redact = |v: &mut Option<String>| {
            if v.is_some() {
                *v = Some("[redacted]".to_string());
            }
        };
        redact(&mut copy.groupme.access_token);
        redact(&mut copy.openai.api_key);
        redact(&mut copy.gateway.bearer_token);
        copy
    }
}
