// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator API tests driven through the router with `oneshot`.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use kibitz_gateway::{GatewayState, build_router};
use kibitz_test_utils::{MockGenerator, TestHarness};
use serde_json::{Value, json};
use tower::ServiceExt;

fn router(harness: &TestHarness, token: Option<&str>) -> Router {
    build_router(
        GatewayState::new(harness.service.clone()),
        token.map(String::from),
    )
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    call_with_auth(app, method, uri, body, None).await
}

async fn call_with_auth(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn generate(app: &Router) -> Value {
    let (status, body) = call(app, "POST", "/api/generate/test", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    body["message"].clone()
}

#[tokio::test]
async fn health_is_public_even_with_token() {
    let harness = TestHarness::builder().build().unwrap();
    let app = router(&harness, Some("s3cret"));

    let (status, body) = call(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["bot_controller"], "available");
}

#[tokio::test]
async fn api_routes_require_configured_token() {
    let harness = TestHarness::builder().build().unwrap();
    let app = router(&harness, Some("s3cret"));

    let (status, body) = call(&app, "GET", "/api/status", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = call_with_auth(&app, "GET", "/api/status", None, Some("wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call_with_auth(&app, "GET", "/api/status", None, Some("s3cret")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["running"], false);
}

#[tokio::test]
async fn status_reports_group_and_probability() {
    let harness = TestHarness::builder().build().unwrap();
    let app = router(&harness, None);

    let (status, body) = call(&app, "GET", "/api/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bot_server_set"], true);
    assert_eq!(body["bot_server_info"]["name"], "Mock Group");
    assert_eq!(body["probability_per_cycle"], 0.0069);
    assert_eq!(body["pending_messages"], 0);
}

#[tokio::test]
async fn generated_message_appears_in_queue() {
    let harness = TestHarness::builder().build().unwrap();
    let app = router(&harness, None);

    let message = generate(&app).await;
    assert_eq!(message["message_type"], "manual");
    assert_eq!(message["generating"], false);
    assert_eq!(message["generated_messages"].as_array().unwrap().len(), 3);

    let (status, queue) = call(&app, "GET", "/api/messages", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(queue.as_array().unwrap().len(), 1);
    assert_eq!(queue[0]["id"], message["id"]);
}

#[tokio::test]
async fn select_then_send_delivers_and_finalizes() {
    let generator = MockGenerator::with_script(vec![
        Ok("first".into()),
        Ok("second".into()),
        Ok("third".into()),
    ]);
    let harness = TestHarness::builder()
        .with_generator(generator)
        .build()
        .unwrap();
    let app = router(&harness, None);

    let message = generate(&app).await;
    let id = message["id"].as_str().unwrap();
    let chosen = message["generated_messages"][1].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/messages/{id}/select"),
        Some(json!({"option_index": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = call(&app, "POST", &format!("/api/messages/{id}/send"), None).await;
    assert_eq!(status, StatusCode::OK);

    let sent = harness.platform.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text, chosen);

    let (status, body) = call(&app, "POST", &format!("/api/messages/{id}/send"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (_, queue) = call(&app, "GET", "/api/messages", None).await;
    assert!(queue.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn select_defaults_to_first_option() {
    let harness = TestHarness::builder().build().unwrap();
    let app = router(&harness, None);

    let message = generate(&app).await;
    let id = message["id"].as_str().unwrap();

    let (status, _) = call(
        &app,
        "POST",
        &format!("/api/messages/{id}/select"),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, queue) = call(&app, "GET", "/api/messages", None).await;
    assert_eq!(queue[0]["selected_message"], "mock response");
}

#[tokio::test]
async fn out_of_range_selection_is_rejected() {
    let harness = TestHarness::builder().build().unwrap();
    let app = router(&harness, None);

    let message = generate(&app).await;
    let id = message["id"].as_str().unwrap();

    for index in [3, -1] {
        let (status, body) = call(
            &app,
            "POST",
            &format!("/api/messages/{id}/select"),
            Some(json!({"option_index": index})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "index {index}");
        assert!(body["error"].as_str().unwrap().contains("out of range"));
    }

    let (_, queue) = call(&app, "GET", "/api/messages", None).await;
    assert!(queue[0]["selected_message"].is_null());
}

#[tokio::test]
async fn unknown_message_is_not_found() {
    let harness = TestHarness::builder().build().unwrap();
    let app = router(&harness, None);

    let (status, body) = call(&app, "POST", "/api/messages/12345/delete", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = call(&app, "POST", "/api/messages/not-a-number/send", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_from_queue() {
    let harness = TestHarness::builder().build().unwrap();
    let app = router(&harness, None);

    let message = generate(&app).await;
    let id = message["id"].as_str().unwrap();

    let (status, _) = call(&app, "POST", &format!("/api/messages/{id}/delete"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, queue) = call(&app, "GET", "/api/messages", None).await;
    assert!(queue.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn platform_failure_on_send_is_bad_gateway() {
    let harness = TestHarness::builder().build().unwrap();
    let app = router(&harness, None);
    harness.platform.fail_sends(Some("network down")).await;

    let message = generate(&app).await;
    let id = message["id"].as_str().unwrap();
    call(
        &app,
        "POST",
        &format!("/api/messages/{id}/select"),
        Some(json!({"option_index": 0})),
    )
    .await;

    let (status, body) = call(&app, "POST", &format!("/api/messages/{id}/send"), None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("network down"));

    let (_, queue) = call(&app, "GET", "/api/messages", None).await;
    assert_eq!(queue.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn config_update_is_validated_as_a_whole() {
    let harness = TestHarness::builder().build().unwrap();
    let app = router(&harness, None);

    let (status, body) = call(
        &app,
        "POST",
        "/api/config",
        Some(json!({"random_messages_per_day": 10.0, "polling_interval_seconds": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("polling interval must be greater than 0 seconds")
    );

    let (_, config) = call(&app, "GET", "/api/config", None).await;
    assert_eq!(config["random_messages_per_day"], 5.0);
    assert_eq!(config["polling_interval_seconds"], 120);

    let (status, body) = call(
        &app,
        "POST",
        "/api/config",
        Some(json!({"polling_interval_seconds": 300})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, config) = call(&app, "GET", "/api/config", None).await;
    assert_eq!(config["polling_interval_seconds"], 300);
}

#[tokio::test]
async fn unknown_config_field_is_bad_request() {
    let harness = TestHarness::builder().build().unwrap();
    let app = router(&harness, None);

    let (status, body) = call(
        &app,
        "POST",
        "/api/config",
        Some(json!({"polling_interval": 30})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn bot_server_requires_group_id() {
    let harness = TestHarness::builder().build().unwrap();
    let app = router(&harness, None);

    let (status, body) = call(&app, "POST", "/api/bot/server", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Group ID is required");

    let (status, _) = call(
        &app,
        "POST",
        "/api/bot/server",
        Some(json!({"group_id": "g-42"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(harness.platform.group().await.as_deref(), Some("g-42"));
}

#[tokio::test]
async fn start_and_stop_toggle_running() {
    let harness = TestHarness::builder().build().unwrap();
    let app = router(&harness, None);

    let (_, body) = call(&app, "POST", "/api/bot/start", None).await;
    assert_eq!(body["changed"], true);
    assert_eq!(body["running"], true);

    let (_, body) = call(&app, "POST", "/api/bot/start", None).await;
    assert_eq!(body["changed"], false);

    let (_, body) = call(&app, "POST", "/api/bot/stop", None).await;
    assert_eq!(body["changed"], true);
    assert_eq!(body["running"], false);

    let (_, body) = call(&app, "POST", "/api/bot/stop", None).await;
    assert_eq!(body["changed"], false);
}
