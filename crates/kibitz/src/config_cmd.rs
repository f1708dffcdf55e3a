// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `kibitz config` command implementation.

use kibitz_config::KibitzConfig;
use kibitz_core::KibitzError;

/// The effective configuration as TOML, secrets replaced by `[redacted]`.
pub fn render_config(config: &KibitzConfig) -> Result<String, KibitzError> {
    toml::to_string_pretty(&config.redacted())
        .map_err(|e| KibitzError::Internal(format!("failed to render configuration: {e}")))
}

pub fn run_config(config: &KibitzConfig) -> Result<(), KibitzError> {
    println!("{}", render_config(config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_config_hides_secrets() {
        let mut config = KibitzConfig::default();
        config.groupme.access_token = Some("gm-secret".into());
        config.openai.api_key = Some("sk-secret".into());

        let rendered = render_config(&config).unwrap();
        assert!(!rendered.contains("gm-secret"));
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("[redacted]"));
        assert!(rendered.contains("trigger_keyword"));
    }
}
