use super::SessionKey;
use crate::checklist::{Conversation, Effect, Phase, View, render};
use crate::config::ReliabilityConfig;
use crate::error::{ChecklistError, DeliveryAction, TransportError};
use crate::transport::channels::traits::{Channel, InboundMessage};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::OwnedMutexGuard;

const DELIVERY_NOTICE: &str =
    "⚠️ Could not update the checklist message. Your answer was saved.";

/// How a failed checklist edit is retried. Only the edit is repeated; the
/// recorded answer is never replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditRetryPolicy {
    pub retries: u32,
    pub delay: Duration,
}

impl Default for EditRetryPolicy {
    fn default() -> Self {
        Self::from(&ReliabilityConfig::default())
    }
}

impl From<&ReliabilityConfig> for EditRetryPolicy {
    fn from(reliability: &ReliabilityConfig) -> Self {
        Self {
            retries: reliability.edit_retries,
            delay: Duration::from_millis(reliability.edit_retry_delay_ms),
        }
    }
}

type Slot = Arc<tokio::sync::Mutex<Conversation>>;

/// Owns every live conversation and drives them through the transition
/// table, one event at a time per session.
pub struct Controller {
    channel: Arc<dyn Channel>,
    sessions: Mutex<HashMap<SessionKey, Slot>>,
    retry: EditRetryPolicy,
}

impl Controller {
    pub fn new(channel: Arc<dyn Channel>, retry: EditRetryPolicy) -> Self {
        Self {
            channel,
            sessions: Mutex::new(HashMap::new()),
            retry,
        }
    }

    /// Process one inbound event and return the phase the session ended in.
    ///
    /// Transport failures are returned after the state change is kept.
    pub async fn handle(&self, msg: &InboundMessage) -> Result<Phase, ChecklistError> {
        if let Some(selection_id) = &msg.selection_id
            && let Err(error) = self.channel.acknowledge_selection(selection_id).await
        {
            tracing::warn!(session = %msg.session, %error, "failed to acknowledge selection");
        }

        let (slot, mut conv) = self.lock_session(&msg.session).await;
        let before = conv.phase();
        let transition = conv.apply(&msg.event);

        if let Some(rejection) = &transition.rejection {
            tracing::debug!(
                session = %msg.session,
                phase = before.label(),
                %rejection,
                "input rejected"
            );
        } else if before != conv.phase() {
            tracing::info!(
                session = %msg.session,
                from = before.label(),
                to = conv.phase().label(),
                "conversation transition"
            );
        }

        let mut outcome = Ok(());
        for effect in transition.effects {
            if let Err(error) = self.execute(&msg.chat_id, &mut conv, effect).await {
                outcome = Err(error);
                break;
            }
        }

        let phase = conv.phase();
        if matches!(phase, Phase::Idle | Phase::Done) {
            self.evict(&msg.session, &slot);
            if phase == Phase::Done {
                tracing::info!(session = %msg.session, "checklist completed");
            }
        }
        drop(conv);

        outcome.map(|()| phase)
    }

    /// Number of conversations currently held in memory.
    pub fn session_count(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Snapshot of a session's conversation, if one is live.
    pub async fn conversation(&self, key: &SessionKey) -> Option<Conversation> {
        let slot = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()?;
        let conv = slot.lock().await;
        Some(conv.clone())
    }

    async fn lock_session(&self, key: &SessionKey) -> (Slot, OwnedMutexGuard<Conversation>) {
        loop {
            let slot = Arc::clone(
                self.sessions
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .entry(key.clone())
                    .or_default(),
            );
            let guard = Arc::clone(&slot).lock_owned().await;

            // The slot may have been evicted while we waited for it.
            let current = self
                .sessions
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get(key)
                .is_some_and(|live| Arc::ptr_eq(live, &slot));
            if current {
                return (slot, guard);
            }
        }
    }

    fn evict(&self, key: &SessionKey, slot: &Slot) {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        if sessions.get(key).is_some_and(|live| Arc::ptr_eq(live, slot)) {
            sessions.remove(key);
        }
    }

    async fn execute(
        &self,
        chat_id: &str,
        conv: &mut Conversation,
        effect: Effect,
    ) -> Result<(), ChecklistError> {
        match effect {
            Effect::Reply(view) => {
                self.send(chat_id, &view).await?;
                Ok(())
            }
            Effect::SendChecklist => self.send_checklist(chat_id, conv).await,
            Effect::EditChecklist => {
                let Some(state) = conv.state() else {
                    return Ok(());
                };
                let Some(target) = state.active_message().cloned() else {
                    // The first send never landed; deliver the current view instead.
                    return self.send_checklist(chat_id, conv).await;
                };
                let view = render(state);
                if let Err(error) = self.edit_with_retry(&target, &view).await {
                    tracing::error!(chat_id, message_id = target.message_id, %error, "checklist edit failed");
                    if conv.is_finished() {
                        // The session is evicted after this event, so the
                        // summary has to land now or never.
                        self.send(chat_id, &view).await?;
                        tracing::info!(chat_id, "checklist summary re-sent as a new message");
                        return Ok(());
                    }
                    if let Err(notice_error) = self.send(chat_id, &View::new(DELIVERY_NOTICE, None)).await {
                        tracing::warn!(chat_id, error = %notice_error, "failed to send delivery notice");
                    }
                    return Err(error);
                }
                Ok(())
            }
        }
    }

    async fn send(
        &self,
        chat_id: &str,
        view: &View,
    ) -> Result<crate::checklist::MessageRef, ChecklistError> {
        self.channel
            .send(chat_id, view)
            .await
            .map_err(|source| ChecklistError::TransportDeliveryFailure {
                action: DeliveryAction::Send,
                attempts: 1,
                source,
            })
    }

    async fn send_checklist(
        &self,
        chat_id: &str,
        conv: &mut Conversation,
    ) -> Result<(), ChecklistError> {
        let Some(state) = conv.state_mut() else {
            return Ok(());
        };
        let view = render(state);
        let message = self.send(chat_id, &view).await?;
        state.attach_message(message);
        Ok(())
    }

    async fn edit_with_retry(
        &self,
        target: &crate::checklist::MessageRef,
        view: &View,
    ) -> Result<(), ChecklistError> {
        let max_attempts = self.retry.retries.saturating_add(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.channel.edit_message(target, view).await {
                Ok(()) => return Ok(()),
                Err(error) if error.is_not_modified() => return Ok(()),
                Err(error) if attempt < max_attempts && is_retryable(&error) => {
                    tracing::warn!(
                        message_id = target.message_id,
                        attempt,
                        %error,
                        "checklist edit failed; retrying"
                    );
                    tokio::time::sleep(self.retry.delay).await;
                }
                Err(source) => {
                    return Err(ChecklistError::TransportDeliveryFailure {
                        action: DeliveryAction::Edit,
                        attempts: attempt,
                        source,
                    });
                }
            }
        }
    }
}

fn is_retryable(error: &TransportError) -> bool {
    !matches!(error, TransportError::Unsupported(_))
}
