// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `kibitz serve` command implementation.
//!
//! Wires the GroupMe platform, the OpenAI generator and the persisted
//! behavior settings into a [`BotService`], serves the operator API, and
//! coordinates graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use kibitz_agent::{BotService, EngineOptions, SettingsHandle, ThreadRandom, shutdown};
use kibitz_config::{KibitzConfig, SettingsStore};
use kibitz_core::KibitzError;
use kibitz_gateway::{GatewayState, ServerConfig, start_server};
use kibitz_groupme::GroupMePlatform;
use kibitz_openai::OpenAiGenerator;
use tracing::{error, info, warn};

/// Assembles the engine from configuration.
pub async fn build_service(config: &KibitzConfig) -> Result<Arc<BotService>, KibitzError> {
    let platform = Arc::new(GroupMePlatform::new(&config.groupme)?);
    let generator = Arc::new(OpenAiGenerator::new(config).await?);

    let store = SettingsStore::new(&config.settings.path);
    let settings = Arc::new(SettingsHandle::load(store)?);
    let snapshot = settings.snapshot();
    info!(
        path = %config.settings.path,
        random_messages_per_day = snapshot.random_messages_per_day,
        polling_interval_seconds = snapshot.polling_interval_seconds,
        "behavior settings loaded"
    );

    Ok(Arc::new(BotService::new(
        platform,
        generator,
        settings,
        Arc::new(ThreadRandom),
        EngineOptions::from(&config.agent),
    )))
}

/// Runs the bot until SIGINT/SIGTERM.
pub async fn run_serve(config: KibitzConfig) -> Result<(), KibitzError> {
    init_tracing(&config.agent.log_level);
    info!(name = %config.agent.name, "starting kibitz serve");

    let service = build_service(&config).await?;
    let cancel = shutdown::install_signal_handler();

    if config.agent.autostart {
        service.start();
    } else {
        info!("autostart disabled, waiting for POST /api/bot/start");
    }

    let gateway = if config.gateway.enabled {
        let server_config = ServerConfig::from(&config.gateway);
        let state = GatewayState::new(service.clone());
        let gateway_cancel = cancel.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = start_server(&server_config, state, gateway_cancel.clone()).await {
                error!(error = %e, "gateway failed, shutting down");
                gateway_cancel.cancel();
            }
        }))
    } else {
        info!("operator gateway disabled by configuration");
        None
    };

    cancel.cancelled().await;
    info!("shutdown requested");

    if let Some(handle) = gateway
        && let Err(e) = handle.await
    {
        warn!(error = %e, "gateway task ended abnormally");
    }

    let drain_timeout = Duration::from_secs(config.agent.drain_timeout_secs);
    if !service.shutdown(drain_timeout).await {
        warn!(
            timeout_secs = config.agent.drain_timeout_secs,
            "generation batches still running at shutdown"
        );
    }

    info!("kibitz serve shutdown complete");
    Ok(())
}

/// `RUST_LOG` overrides `agent.log_level`.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("kibitz={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn build_service_requires_groupme_token() {
        let mut config = KibitzConfig::default();
        config.groupme.access_token = None;
        config.openai.api_key = Some("sk-test".into());

        let err = build_service(&config).await.err().unwrap();
        assert!(matches!(err, KibitzError::Platform { .. }));
    }

    #[tokio::test]
    async fn build_service_with_credentials_starts_stopped() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = KibitzConfig::default();
        config.groupme.access_token = Some("gm-test".into());
        config.openai.api_key = Some("sk-test".into());
        config.settings.path = dir.path().join("settings.toml").display().to_string();

        let service = build_service(&config).await.unwrap();
        assert!(!service.is_running());
        assert_eq!(service.settings().polling_interval_seconds, 120);
    }
}
