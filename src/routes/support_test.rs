use super::*;
use crate::routes::app;
use crate::routes::test_support::json_request;
use crate::state::test_helpers;
use axum::http::Method;
use serde_json::json;

#[tokio::test]
async fn fresh_transcript_is_greeting() {
    let app = app(test_helpers::test_app_state());
    let (status, body) = json_request(app, Method::GET, "/api/support/messages", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    assert_eq!(body["messages"][0]["role"], "assistant");
    assert_eq!(body["status"], "idle");
}

#[tokio::test]
async fn send_returns_question_and_reply() {
    let state = test_helpers::test_app_state();
    let (status, body) = json_request(
        app(state.clone()),
        Method::POST,
        "/api/support/messages",
        Some(json!({ "content": "How much does it cost?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["question"]["role"], "user");
    assert_eq!(body["question"]["content"], "How much does it cost?");
    assert!(
        body["reply"]["content"]
            .as_str()
            .unwrap()
            .starts_with("KnoxEngage offers several pricing tiers")
    );
    assert_eq!(body["reply"]["sources"], json!(["kb-pricing"]));

    let (_, transcript) = json_request(app(state), Method::GET, "/api/support/messages", None).await;
    assert_eq!(transcript["messages"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn blank_message_is_rejected() {
    let app = app(test_helpers::test_app_state());
    let (status, body) = json_request(
        app,
        Method::POST,
        "/api/support/messages",
        Some(json!({ "content": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E_EMPTY_MESSAGE");
}

#[tokio::test]
async fn feedback_marks_reply() {
    let state = test_helpers::test_app_state();
    let (_, body) = json_request(
        app(state.clone()),
        Method::POST,
        "/api/support/messages",
        Some(json!({ "content": "security" })),
    )
    .await;
    let reply_id = body["reply"]["id"].as_str().unwrap().to_string();

    let (status, transcript) = json_request(
        app(state),
        Method::POST,
        &format!("/api/support/messages/{reply_id}/feedback"),
        Some(json!({ "helpful": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(transcript["messages"][2]["helpful"], true);
    assert!(transcript["messages"][1].get("helpful").is_none());
}

#[tokio::test]
async fn feedback_on_unknown_message_is_permissive() {
    let app = app(test_helpers::test_app_state());
    let (status, body) = json_request(
        app,
        Method::POST,
        &format!("/api/support/messages/{}/feedback", Uuid::new_v4()),
        Some(json!({ "helpful": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn feedback_on_user_message_is_rejected() {
    let state = test_helpers::test_app_state();
    let (_, body) = json_request(
        app(state.clone()),
        Method::POST,
        "/api/support/messages",
        Some(json!({ "content": "hello" })),
    )
    .await;
    let question_id = body["question"]["id"].as_str().unwrap().to_string();

    let (status, body) = json_request(
        app(state),
        Method::POST,
        &format!("/api/support/messages/{question_id}/feedback"),
        Some(json!({ "helpful": true })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E_FEEDBACK_NOT_ALLOWED");
}

#[tokio::test]
async fn reset_restores_greeting() {
    let state = test_helpers::test_app_state();
    json_request(
        app(state.clone()),
        Method::POST,
        "/api/support/messages",
        Some(json!({ "content": "setup" })),
    )
    .await;
    let (status, body) = json_request(app(state), Method::POST, "/api/support/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    assert_eq!(body["status"], "idle");
}

#[tokio::test]
async fn suggestions_are_listed() {
    let app = app(test_helpers::test_app_state());
    let (status, body) = json_request(app, Method::GET, "/api/support/suggestions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["questions"][1], "What is Smart Send-Time?");
}

#[test]
fn pending_reply_maps_to_conflict() {
    let err = chat_error_to_api(ChatError::ReplyPending);
    assert_eq!(err.status, StatusCode::CONFLICT);
    assert_eq!(err.code, "E_REPLY_PENDING");
}

#[tokio::test]
async fn feedback_on_malformed_id_is_permissive() {
    let app = app(test_helpers::test_app_state());
    let (status, body) = json_request(
        app,
        Method::POST,
        "/api/support/messages/not-a-uuid/feedback",
        Some(json!({ "helpful": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    assert_eq!(body["status"], "idle");
}

#[tokio::test]
async fn send_without_content_is_bad_request() {
    let app = app(test_helpers::test_app_state());
    let (status, body) = json_request(
        app,
        Method::POST,
        "/api/support/messages",
        Some(json!({ "text": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E_INVALID_BODY");
}
