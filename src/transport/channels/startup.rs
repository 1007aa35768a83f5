use crate::config::Config;
use crate::error::ConfigError;
use crate::session::{Controller, EditRetryPolicy};
use anyhow::{Context, Result};
use std::sync::Arc;

use super::dispatch::{SESSION_WORKER_IDLE, SessionDispatcher};
use super::runtime::{channel_backoff_settings, spawn_supervised_listener};
use super::telegram::TelegramChannel;
use super::traits::{Channel, InboundMessage};

fn build_channel(config: &Config) -> Result<Arc<dyn Channel>> {
    let token = config.bot_token().ok_or(ConfigError::MissingCredential)?;
    Ok(Arc::new(TelegramChannel::from_config(token, &config.telegram)))
}

/// Verify the token against the Bot API without starting the conversation loop.
pub async fn check_channel(config: &Config) -> Result<()> {
    let channel = build_channel(config)?;
    if channel.health_check().await {
        println!("✓ {} channel reachable", channel.name());
        Ok(())
    } else {
        anyhow::bail!("{} channel health check failed", channel.name())
    }
}

/// Run the bot until Ctrl-C.
pub async fn start_bot(config: Arc<Config>) -> Result<()> {
    let channel = build_channel(&config)?;
    if !channel.health_check().await {
        tracing::warn!(
            "Channel {} failed its health check; polling anyway",
            channel.name()
        );
    }

    let controller = Arc::new(Controller::new(
        Arc::clone(&channel),
        EditRetryPolicy::from(&config.reliability),
    ));
    let mut dispatcher = SessionDispatcher::new(controller, SESSION_WORKER_IDLE);

    let (initial_backoff_secs, max_backoff_secs) = channel_backoff_settings(&config.reliability);
    let (tx, mut rx) = tokio::sync::mpsc::channel::<InboundMessage>(100);
    let handle = spawn_supervised_listener(
        Arc::clone(&channel),
        tx,
        initial_backoff_secs,
        max_backoff_secs,
    );

    tracing::info!(channel = channel.name(), "shift checklist bot started");

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            msg = rx.recv() => match msg {
                Some(msg) => dispatcher.dispatch(msg),
                None => break,
            },
            signal = &mut shutdown => {
                signal.context("failed to listen for shutdown signal")?;
                tracing::info!("shutdown requested");
                break;
            }
        }
    }

    drop(rx);
    handle.abort();
    let _ = handle.await;
    Ok(())
}
