use crate::checklist::{InboundEvent, MessageRef, View};
use crate::error::TransportError;
use crate::session::SessionKey;
use std::future::Future;
use std::pin::Pin;

/// An inbound event received from a channel, tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Conversation identity: one per user per chat.
    pub session: SessionKey,
    /// Chat to reply into.
    pub chat_id: String,
    pub event: InboundEvent,
    /// Transport handle of a button press that must be acknowledged.
    pub selection_id: Option<String>,
}

/// Core channel trait: the transport adapter the controller talks to
pub trait Channel: Send + Sync {
    /// Human-readable channel name
    fn name(&self) -> &str;

    /// Send a new message and return its handle
    fn send<'a>(
        &'a self,
        chat_id: &'a str,
        view: &'a View,
    ) -> Pin<Box<dyn Future<Output = Result<MessageRef, TransportError>> + Send + 'a>>;

    /// Replace the text and controls of a message sent earlier
    fn edit_message<'a>(
        &'a self,
        _target: &'a MessageRef,
        _view: &'a View,
    ) -> Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + 'a>> {
        Box::pin(async move { Err(TransportError::Unsupported("message editing")) })
    }

    /// Acknowledge a button press so the client stops showing a spinner
    fn acknowledge_selection<'a>(
        &'a self,
        _selection_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + 'a>> {
        Box::pin(async move { Ok(()) })
    }

    /// Start listening for inbound events (long-running)
    fn listen<'a>(
        &'a self,
        tx: tokio::sync::mpsc::Sender<InboundMessage>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

    /// Check if channel is healthy
    fn health_check<'a>(&'a self) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(async move { true })
    }
}
