use super::{TelegramChannel, parse_update, reply_markup};
use crate::checklist::{Controls, MessageRef, View};
use crate::error::TransportError;
use crate::transport::channels::traits::{Channel, InboundMessage};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

impl TelegramChannel {
    fn message_body(view: &View) -> Value {
        let mut body = serde_json::json!({
            "text": view.text,
            "parse_mode": "Markdown"
        });
        if let Some(controls) = view.controls {
            body["reply_markup"] = reply_markup(controls);
        }
        body
    }

    async fn send_view(&self, chat_id: &str, view: &View) -> Result<MessageRef, TransportError> {
        let mut body = Self::message_body(view);
        body["chat_id"] = Value::from(chat_id);

        let result = self.call("sendMessage", &body).await?;
        let message_id = result
            .get("message_id")
            .and_then(Value::as_i64)
            .ok_or_else(|| TransportError::MalformedResponse {
                method: "sendMessage".into(),
                reason: "missing message_id".into(),
            })?;
        let chat_id = result
            .get("chat")
            .and_then(|c| c.get("id"))
            .and_then(Value::as_i64)
            .map_or_else(|| chat_id.to_string(), |id| id.to_string());

        Ok(MessageRef {
            chat_id,
            message_id,
        })
    }

    async fn edit_view(&self, target: &MessageRef, view: &View) -> Result<(), TransportError> {
        // Only inline keyboards survive an edit; omitting reply_markup drops them.
        let edit_view = View {
            text: view.text.clone(),
            controls: view.controls.filter(|c| *c == Controls::Confirm),
        };
        let mut body = Self::message_body(&edit_view);
        body["chat_id"] = Value::from(target.chat_id.as_str());
        body["message_id"] = Value::from(target.message_id);

        self.call("editMessageText", &body).await?;
        Ok(())
    }

    async fn poll_updates(&self, offset: i64) -> Result<Vec<Value>, TransportError> {
        let body = serde_json::json!({
            "offset": offset,
            "timeout": self.poll_timeout_secs,
            "allowed_updates": ["message", "callback_query"]
        });
        match self.call("getUpdates", &body).await? {
            Value::Array(updates) => Ok(updates),
            _ => Err(TransportError::MalformedResponse {
                method: "getUpdates".into(),
                reason: "result is not an array".into(),
            }),
        }
    }
}

impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn send<'a>(
        &'a self,
        chat_id: &'a str,
        view: &'a View,
    ) -> Pin<Box<dyn Future<Output = Result<MessageRef, TransportError>> + Send + 'a>> {
        Box::pin(self.send_view(chat_id, view))
    }

    fn edit_message<'a>(
        &'a self,
        target: &'a MessageRef,
        view: &'a View,
    ) -> Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + 'a>> {
        Box::pin(self.edit_view(target, view))
    }

    fn acknowledge_selection<'a>(
        &'a self,
        selection_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + 'a>> {
        Box::pin(async move {
            self.call(
                "answerCallbackQuery",
                &serde_json::json!({ "callback_query_id": selection_id }),
            )
            .await?;
            Ok(())
        })
    }

    fn listen<'a>(
        &'a self,
        tx: tokio::sync::mpsc::Sender<InboundMessage>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let mut offset: i64 = 0;

            tracing::info!("Telegram channel listening for updates...");

            loop {
                let updates = match self.poll_updates(offset).await {
                    Ok(updates) => updates,
                    Err(e) => {
                        tracing::warn!("Telegram poll error: {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                        continue;
                    }
                };

                for update in &updates {
                    // Advance offset past this update
                    if let Some(uid) = update.get("update_id").and_then(Value::as_i64) {
                        offset = uid + 1;
                    }

                    let Some(msg) = parse_update(update) else {
                        continue;
                    };

                    if tx.send(msg).await.is_err() {
                        return Ok(());
                    }
                }
            }
        })
    }

    fn health_check<'a>(&'a self) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(async move {
            self.call("getMe", &serde_json::json!({}))
                .await
                .inspect_err(|e| tracing::warn!("Telegram getMe failed: {e}"))
                .is_ok()
        })
    }
}
