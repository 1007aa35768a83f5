#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use shiftcheck::checklist::{Conversation, InboundEvent, MessageRef, Phase, View};
use shiftcheck::session::{Controller, EditRetryPolicy, SessionKey};
use shiftcheck::transport::channels::{Channel, InboundMessage};
use shiftcheck::{ChecklistError, TransportError};

pub const CHAT_ID: &str = "4242";
pub const USER_ID: &str = "7";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Send { message_id: i64, view: View },
    Edit { message_id: i64, view: View },
}

impl Outbound {
    pub fn view(&self) -> &View {
        match self {
            Self::Send { view, .. } | Self::Edit { view, .. } => view,
        }
    }
}

/// In-memory transport that records everything the controller emits.
#[derive(Default)]
pub struct RecordingChannel {
    outbound: Mutex<Vec<Outbound>>,
    next_id: AtomicI64,
}

impl RecordingChannel {
    pub fn outbound(&self) -> Vec<Outbound> {
        self.outbound.lock().unwrap().clone()
    }

    pub fn last(&self) -> Outbound {
        self.outbound().last().cloned().expect("nothing was sent")
    }

    pub fn sends(&self) -> usize {
        self.outbound()
            .iter()
            .filter(|o| matches!(o, Outbound::Send { .. }))
            .count()
    }
}

impl Channel for RecordingChannel {
    fn name(&self) -> &str {
        "recording"
    }

    fn send<'a>(
        &'a self,
        chat_id: &'a str,
        view: &'a View,
    ) -> Pin<Box<dyn Future<Output = Result<MessageRef, TransportError>> + Send + 'a>> {
        Box::pin(async move {
            let message_id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            self.outbound.lock().unwrap().push(Outbound::Send {
                message_id,
                view: view.clone(),
            });
            Ok(MessageRef {
                chat_id: chat_id.to_string(),
                message_id,
            })
        })
    }

    fn edit_message<'a>(
        &'a self,
        target: &'a MessageRef,
        view: &'a View,
    ) -> Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + 'a>> {
        Box::pin(async move {
            self.outbound.lock().unwrap().push(Outbound::Edit {
                message_id: target.message_id,
                view: view.clone(),
            });
            Ok(())
        })
    }

    fn listen<'a>(
        &'a self,
        _tx: tokio::sync::mpsc::Sender<InboundMessage>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move { Ok(()) })
    }
}

/// One employee talking to the controller.
pub struct Harness {
    pub channel: Arc<RecordingChannel>,
    pub controller: Controller,
    pub key: SessionKey,
}

impl Harness {
    pub fn new() -> Self {
        let channel = Arc::new(RecordingChannel::default());
        let controller = Controller::new(
            channel.clone(),
            EditRetryPolicy {
                retries: 0,
                delay: Duration::ZERO,
            },
        );
        Self {
            channel,
            controller,
            key: SessionKey::new(CHAT_ID, USER_ID),
        }
    }

    pub async fn send(&self, event: InboundEvent) -> Result<Phase, ChecklistError> {
        let selection_id = matches!(event, InboundEvent::Selection(_)).then(|| "cb".to_string());
        self.controller
            .handle(&InboundMessage {
                session: self.key.clone(),
                chat_id: CHAT_ID.to_string(),
                event,
                selection_id,
            })
            .await
    }

    pub async fn start(&self) -> Phase {
        self.send(InboundEvent::StartSession).await.unwrap()
    }

    pub async fn text(&self, body: &str) -> Phase {
        self.send(InboundEvent::Text(body.to_string())).await.unwrap()
    }

    pub async fn press(&self, tag: &str) -> Phase {
        self.send(InboundEvent::Selection(tag.to_string()))
            .await
            .unwrap()
    }

    pub async fn cancel(&self) -> Phase {
        self.send(InboundEvent::Cancel).await.unwrap()
    }

    pub async fn conversation(&self) -> Option<Conversation> {
        self.controller.conversation(&self.key).await
    }
}
