use std::sync::Arc;

use serde_json::{Value, json};
use shiftcheck::checklist::{InboundEvent, Phase, ShiftKind, YES_TAG};
use shiftcheck::session::{Controller, EditRetryPolicy, SessionKey};
use shiftcheck::transport::channels::{InboundMessage, TelegramChannel};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_bot_api() -> MockServer {
    let server = MockServer::start().await;
    let sent = json!({
        "ok": true,
        "result": {"message_id": 42, "chat": {"id": 900}, "text": "x"}
    });
    for api_method in ["sendMessage", "editMessageText"] {
        Mock::given(method("POST"))
            .and(path(format!("/bot123:ABC/{api_method}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(sent.clone()))
            .mount(&server)
            .await;
    }
    Mock::given(method("POST"))
        .and(path("/bot123:ABC/answerCallbackQuery"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": true})))
        .mount(&server)
        .await;
    server
}

fn inbound(event: InboundEvent) -> InboundMessage {
    let selection_id = matches!(event, InboundEvent::Selection(_)).then(|| "cb-1".to_string());
    InboundMessage {
        session: SessionKey::new("900", "1"),
        chat_id: "900".into(),
        event,
        selection_id,
    }
}

async fn request_log(server: &MockServer) -> Vec<(String, Value)> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|req| {
            let api_method = req.url.path().rsplit('/').next().unwrap().to_string();
            let body: Value = serde_json::from_slice(&req.body).unwrap();
            (api_method, body)
        })
        .collect()
}

#[tokio::test]
async fn checklist_flow_over_bot_api() {
    let server = mock_bot_api().await;
    let channel = Arc::new(TelegramChannel::new("123:ABC".into(), server.uri(), 1));
    let controller = Controller::new(channel, EditRetryPolicy::default());

    controller.handle(&inbound(InboundEvent::StartSession)).await.unwrap();
    controller
        .handle(&inbound(InboundEvent::Text(ShiftKind::Opening.menu_label().into())))
        .await
        .unwrap();
    controller
        .handle(&inbound(InboundEvent::Text("Alex".into())))
        .await
        .unwrap();
    let phase = controller
        .handle(&inbound(InboundEvent::Selection(YES_TAG.into())))
        .await
        .unwrap();
    assert_eq!(phase, Phase::AskingTasks);

    let log = request_log(&server).await;
    let methods: Vec<&str> = log.iter().map(|(m, _)| m.as_str()).collect();
    assert_eq!(
        methods,
        vec![
            "sendMessage",
            "sendMessage",
            "sendMessage",
            "answerCallbackQuery",
            "editMessageText"
        ]
    );

    let (_, welcome) = &log[0];
    assert_eq!(welcome["chat_id"], "900");
    assert!(welcome["reply_markup"]["keyboard"].is_array());

    let (_, ask_name) = &log[1];
    assert_eq!(ask_name["reply_markup"]["remove_keyboard"], true);

    let (_, checklist) = &log[2];
    assert_eq!(checklist["parse_mode"], "Markdown");
    assert_eq!(checklist["reply_markup"]["inline_keyboard"][0][0]["callback_data"], "yes");

    let (_, edit) = &log[4];
    assert_eq!(edit["message_id"], 42);
    assert_eq!(edit["chat_id"], "900");
    assert!(edit["text"].as_str().unwrap().contains("✅ 1. "));
    assert!(edit["text"].as_str().unwrap().contains("Question 2/8:"));
}
