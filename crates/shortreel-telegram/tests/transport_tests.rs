// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram transport tests against a wiremock stand-in for the Bot API.

use shortreel_config::model::TelegramConfig;
use shortreel_core::traits::{ChatTransport, PluginAdapter};
use shortreel_core::types::{HealthStatus, UpdateKind};
use shortreel_telegram::TelegramTransport;
use wiremock::matchers::{body_string_contains, method, path_regex};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn transport(server: &MockServer) -> TelegramTransport {
    let config = TelegramConfig {
        bot_token: Some("123:test".into()),
        request_timeout_secs: 5,
        poll_timeout_secs: 1,
        ..TelegramConfig::default()
    };
    TelegramTransport::new(&config)
        .unwrap()
        .with_api_url(&server.uri())
        .unwrap()
}

fn message_json(message_id: i32, chat_id: i64, text: &str) -> serde_json::Value {
    serde_json::json!({
        "message_id": message_id,
        "date": 1700000000i64,
        "chat": { "id": chat_id, "type": "private", "first_name": "Ann" },
        "from": { "id": chat_id, "is_bot": false, "first_name": "Ann" },
        "text": text,
    })
}

fn ok(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true, "result": result }))
}

fn api_error(code: u16, description: &str) -> ResponseTemplate {
    ResponseTemplate::new(code).set_body_json(serde_json::json!({
        "ok": false,
        "error_code": code,
        "description": description,
    }))
}

#[tokio::test]
async fn get_updates_converts_messages_and_callbacks() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path_regex("(?i)/bot[^/]+/getupdates$"))
        .respond_with(ok(serde_json::json!([
            { "update_id": 100, "message": message_json(1, 999, "/review") },
            {
                "update_id": 101,
                "callback_query": {
                    "id": "cb-1",
                    "from": { "id": 999, "is_bot": false, "first_name": "Ann" },
                    "message": message_json(2, 999, "video"),
                    "chat_instance": "-1",
                    "data": "approve",
                },
            },
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let updates = transport(&server).get_updates(100).await.unwrap();
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0].update_id, 100);
    assert!(matches!(&updates[0].kind, UpdateKind::Message(m) if m.text == "/review"));
    assert_eq!(updates[1].update_id, 101);
    assert!(matches!(&updates[1].kind, UpdateKind::Callback(q) if q.data == "approve"));

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("\"offset\":100"), "body was {body}");
}

#[tokio::test]
async fn get_updates_surfaces_api_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path_regex("(?i)/bot[^/]+/getupdates$"))
        .respond_with(api_error(502, "Bad Gateway"))
        .mount(&server)
        .await;

    let err = transport(&server).get_updates(0).await.unwrap_err();
    assert!(err.to_string().contains("failed to fetch updates"), "{err}");
}

#[tokio::test]
async fn send_message_falls_back_to_plain_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path_regex("(?i)/bot[^/]+/sendmessage$"))
        .and(body_string_contains("parse_mode"))
        .respond_with(api_error(
            400,
            "Bad Request: can't parse entities: Can't find end of the entity starting at byte offset 4",
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path_regex("(?i)/bot[^/]+/sendmessage$"))
        .and(|req: &Request| !String::from_utf8_lossy(&req.body).contains("parse_mode"))
        .respond_with(ok(message_json(5, 999, "T1 done")))
        .expect(1)
        .mount(&server)
        .await;

    transport(&server)
        .send_message(999, "*T1* done_")
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    let retry = String::from_utf8_lossy(&requests[1].body);
    assert!(retry.contains("T1 done_"), "retry body was {retry}");
}

#[tokio::test]
async fn send_message_reports_other_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path_regex("(?i)/bot[^/]+/sendmessage$"))
        .respond_with(api_error(403, "Forbidden: bot was blocked by the user"))
        .expect(1)
        .mount(&server)
        .await;

    let err = transport(&server).send_message(1, "hi").await.unwrap_err();
    assert!(err.to_string().contains("failed to send message"), "{err}");
}

#[tokio::test]
async fn send_video_fails_without_network_when_file_is_missing() {
    let server = MockServer::start().await;

    let err = transport(&server)
        .send_video(999, std::path::Path::new("/nonexistent/1.mp4"), "*T1*", None)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("1.mp4"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn health_check_reports_unauthorized_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path_regex("(?i)/bot[^/]+/getme$"))
        .respond_with(api_error(401, "Unauthorized"))
        .mount(&server)
        .await;

    let status = transport(&server).health_check().await.unwrap();
    assert!(matches!(status, HealthStatus::Unhealthy(_)));
}
