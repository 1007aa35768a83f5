pub mod handler;

use crate::checklist::{Controls, InboundEvent, NO_TAG, ShiftKind, YES_TAG};
use crate::config::TelegramConfig;
use crate::error::TransportError;
use crate::session::SessionKey;
use crate::transport::channels::traits::InboundMessage;
use serde_json::Value;
use std::time::Duration;


const CONNECT_TIMEOUT_SECS: u64 = 10;
/// Headroom on top of the long-poll wait before a request counts as hung.
const REQUEST_TIMEOUT_MARGIN_SECS: u64 = 15;

/// Upper bound for any Bot API call; must outlast a full `getUpdates` wait.
pub(crate) fn request_timeout(poll_timeout_secs: u64) -> Duration {
    Duration::from_secs(poll_timeout_secs.saturating_add(REQUEST_TIMEOUT_MARGIN_SECS))
}

fn build_client(request_timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(request_timeout)
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Telegram channel: long-polls the Bot API for updates
pub struct TelegramChannel {
    bot_token: String,
    api_base_url: String,
    poll_timeout_secs: u64,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(bot_token: String, api_base_url: String, poll_timeout_secs: u64) -> Self {
        Self::with_request_timeout(
            bot_token,
            api_base_url,
            poll_timeout_secs,
            request_timeout(poll_timeout_secs),
        )
    }

    fn with_request_timeout(
        bot_token: String,
        api_base_url: String,
        poll_timeout_secs: u64,
        request_timeout: Duration,
    ) -> Self {
        Self {
            bot_token,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            poll_timeout_secs,
            client: build_client(request_timeout),
        }
    }

    pub fn from_config(bot_token: &str, config: &TelegramConfig) -> Self {
        Self::new(
            bot_token.to_string(),
            config.api_base_url.clone(),
            config.poll_timeout_secs,
        )
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base_url, self.bot_token)
    }

    /// POST a Bot API method and unwrap the `result` field of the reply.
    async fn call(&self, method: &str, body: &Value) -> Result<Value, TransportError> {
        let resp = self
            .client
            .post(self.api_url(method))
            .json(body)
            .send()
            .await?;
        let status = resp.status();
        let text = resp.text().await?;

        let parsed: Option<Value> = serde_json::from_str(&text).ok();
        let ok = parsed
            .as_ref()
            .and_then(|v| v.get("ok"))
            .and_then(Value::as_bool)
            .unwrap_or(false);

        if !status.is_success() || !ok {
            let description = parsed
                .as_ref()
                .and_then(|v| v.get("description"))
                .and_then(Value::as_str)
                .map_or(text.clone(), str::to_string);
            return Err(TransportError::Api {
                method: method.to_string(),
                status: status.as_u16(),
                description,
            });
        }

        parsed
            .and_then(|mut v| v.get_mut("result").map(Value::take))
            .ok_or_else(|| TransportError::MalformedResponse {
                method: method.to_string(),
                reason: "missing result".into(),
            })
    }
}

/// Bot API `reply_markup` for the given controls.
pub(crate) fn reply_markup(controls: Controls) -> Value {
    match controls {
        Controls::ShiftMenu => {
            let rows: Vec<Value> = ShiftKind::ALL
                .iter()
                .map(|kind| serde_json::json!([{ "text": kind.menu_label() }]))
                .collect();
            serde_json::json!({
                "keyboard": rows,
                "resize_keyboard": true,
                "one_time_keyboard": true
            })
        }
        Controls::DismissMenu => serde_json::json!({ "remove_keyboard": true }),
        Controls::Confirm => serde_json::json!({
            "inline_keyboard": [[
                {"text": "✅ Yes", "callback_data": YES_TAG},
                {"text": "❌ No", "callback_data": NO_TAG}
            ]]
        }),
    }
}

/// Map a bot command to its event. `/start@MyBot payload` counts as `/start`.
fn parse_command(text: &str) -> Option<InboundEvent> {
    let command = text.split_whitespace().next()?;
    let command = command.split('@').next().unwrap_or(command);
    match command {
        "/start" => Some(InboundEvent::StartSession),
        "/cancel" => Some(InboundEvent::Cancel),
        _ => None,
    }
}

fn id_string(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_i64).map(|id| id.to_string())
}

/// Translate one `getUpdates` entry into an inbound message.
///
/// Returns `None` for updates the checklist does not care about (stickers,
/// edits, unknown commands).
pub(crate) fn parse_update(update: &Value) -> Option<InboundMessage> {
    if let Some(callback) = update.get("callback_query") {
        let selection_id = callback.get("id").and_then(Value::as_str)?.to_string();
        let user_id = id_string(callback.get("from").and_then(|f| f.get("id")))?;
        let chat_id = id_string(
            callback
                .get("message")
                .and_then(|m| m.get("chat"))
                .and_then(|c| c.get("id")),
        )
        .unwrap_or_else(|| user_id.clone());
        let tag = callback
            .get("data")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        return Some(InboundMessage {
            session: SessionKey::new(chat_id.clone(), user_id),
            chat_id,
            event: InboundEvent::Selection(tag),
            selection_id: Some(selection_id),
        });
    }

    let message = update.get("message")?;
    let text = message.get("text").and_then(Value::as_str)?;
    let chat_id = id_string(message.get("chat").and_then(|c| c.get("id")))?;
    let user_id = id_string(message.get("from").and_then(|f| f.get("id")))
        .unwrap_or_else(|| chat_id.clone());

    let event = if text.starts_with('/') {
        let Some(event) = parse_command(text) else {
            tracing::debug!(chat_id = %chat_id, command = text, "ignoring unsupported command");
            return None;
        };
        event
    } else {
        InboundEvent::Text(text.to_string())
    };

    Some(InboundMessage {
        session: SessionKey::new(chat_id.clone(), user_id),
        chat_id,
        event,
        selection_id: None,
    })
}
