use crate::config::ReliabilityConfig;
use crate::transport::channels::traits::{Channel, InboundMessage};
use std::sync::Arc;
use std::time::Duration;

const MIN_CHANNEL_INITIAL_BACKOFF_SECS: u64 = 1;

pub(crate) fn channel_backoff_settings(reliability: &ReliabilityConfig) -> (u64, u64) {
    let initial_backoff_secs = reliability
        .channel_initial_backoff_secs
        .max(MIN_CHANNEL_INITIAL_BACKOFF_SECS);
    let max_backoff_secs = reliability
        .channel_max_backoff_secs
        .max(initial_backoff_secs);

    (initial_backoff_secs, max_backoff_secs)
}

/// Run `ch.listen` forever, restarting it with exponential backoff until the
/// receiving side of `tx` is gone.
pub(crate) fn spawn_supervised_listener(
    ch: Arc<dyn Channel>,
    tx: tokio::sync::mpsc::Sender<InboundMessage>,
    initial_backoff_secs: u64,
    max_backoff_secs: u64,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let component = format!("channel:{}", ch.name());
        let mut backoff = initial_backoff_secs.max(1);
        let max_backoff = max_backoff_secs.max(backoff);

        loop {
            tracing::debug!(component, "channel listener starting");
            let result = ch.listen(tx.clone()).await;

            if tx.is_closed() {
                break;
            }

            match result {
                Ok(()) => {
                    tracing::warn!("Channel {} exited unexpectedly; restarting", ch.name());
                    // Clean exit -- reset backoff since the listener ran successfully
                    backoff = initial_backoff_secs.max(1);
                }
                Err(e) => {
                    tracing::error!("Channel {} error: {e}; restarting", ch.name());
                }
            }

            tokio::time::sleep(Duration::from_secs(backoff)).await;
            // Double backoff AFTER sleeping so first error uses initial_backoff
            backoff = backoff.saturating_mul(2).min(max_backoff);
        }
    })
}
