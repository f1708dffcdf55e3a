// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for the static configuration.

use crate::diagnostic::ConfigError;
use crate::model::KibitzConfig;

const REASONING_EFFORTS: &[&str] = &["minimal", "low", "medium", "high"];

/// Validate a deserialized configuration, collecting every failure.
pub fn validate_config(config: &KibitzConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.agent.trigger_keyword.trim().is_empty() {
        fail("agent.trigger_keyword must not be empty".to_string());
    }

    if config.agent.max_in_flight_batches == 0 {
        fail("agent.max_in_flight_batches must be at least 1".to_string());
    }

    for (key, url) in [
        ("groupme.api_base", &config.groupme.api_base),
        ("openai.api_base", &config.openai.api_base),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            fail(format!("{key} `{url}` must be an http(s) URL"));
        }
    }

    if config.groupme.request_timeout_secs == 0 {
        fail("groupme.request_timeout_secs must be at least 1".to_string());
    }

    if config.openai.request_timeout_secs == 0 {
        fail("openai.request_timeout_secs must be at least 1".to_string());
    }

    if config.openai.model.trim().is_empty() {
        fail("openai.model must not be empty".to_string());
    }

    if !REASONING_EFFORTS.contains(&config.openai.reasoning_effort.as_str()) {
        fail(format!(
            "openai.reasoning_effort `{}` must be one of: {}",
            config.openai.reasoning_effort,
            REASONING_EFFORTS.join(", ")
        ));
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        fail("gateway.host must not be empty".to_string());
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            fail(format!(
                "gateway.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    if let Some(token) = &config.gateway.bearer_token
        && token.trim().is_empty()
    {
        fail("gateway.bearer_token must not be blank when set".to_string());
    }

    if config.settings.path.trim().is_empty() {
        fail("settings.path must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&KibitzConfig::default()).is_ok());
    }

    #[test]
    fn empty_keyword_fails_validation() {
        let mut config = KibitzConfig::default();
        config.agent.trigger_keyword = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "trigger_keyword"));
    }

    #[test]
    fn unknown_reasoning_effort_fails_validation() {
        let mut config = KibitzConfig::default();
        config.openai.reasoning_effort = "extreme".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "reasoning_effort"));
    }

    #[test]
    fn non_http_api_base_fails_validation() {
        let mut config = KibitzConfig::default();
        config.groupme.api_base = "ftp://example.com".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "groupme.api_base"));
    }

    #[test]
    fn errors_are_collected_not_fail_fast() {
        let mut config = KibitzConfig::default();
        config.agent.max_in_flight_batches = 0;
        config.settings.path = String::new();
        config.gateway.host = "bad host!".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn blank_bearer_token_fails_validation() {
        let mut config = KibitzConfig::default();
        config.gateway.bearer_token = Some(String::new());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "bearer_token"));
    }
}
