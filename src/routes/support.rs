//! Support chat routes.
//!
//! `POST /api/support/messages` holds the request open for the reply delay
//! and answers with both the question and the reply.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::extract::{ApiJson, ApiPath};
use crate::services::support::{self, ChatError};
use crate::state::{AppState, ChatMessage, ChatStatus};

#[derive(Serialize)]
pub struct TranscriptResponse {
    pub messages: Vec<ChatMessage>,
    pub status: ChatStatus,
}

#[derive(Serialize)]
pub struct ExchangeResponse {
    pub question: ChatMessage,
    /// `null` when the chat was reset before the reply arrived.
    pub reply: Option<ChatMessage>,
}

#[derive(Serialize)]
pub struct SuggestionsResponse {
    pub questions: Vec<&'static str>,
}

#[derive(Deserialize)]
pub struct SendBody {
    pub content: String,
}

#[derive(Deserialize)]
pub struct FeedbackBody {
    pub helpful: bool,
}

pub(crate) fn chat_error_to_api(err: ChatError) -> ApiError {
    let status = match err {
        ChatError::EmptyMessage | ChatError::FeedbackNotAllowed(_) => StatusCode::BAD_REQUEST,
        ChatError::ReplyPending => StatusCode::CONFLICT,
        ChatError::MessageNotFound(_) => StatusCode::NOT_FOUND,
    };
    ApiError::from_code(status, &err)
}

async fn transcript_response(state: &AppState) -> Json<TranscriptResponse> {
    let (messages, status) = support::transcript(state).await;
    Json(TranscriptResponse { messages, status })
}

pub async fn messages(State(state): State<AppState>) -> Json<TranscriptResponse> {
    transcript_response(&state).await
}

pub async fn send(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SendBody>,
) -> Result<Json<ExchangeResponse>, ApiError> {
    let exchange = support::send_message(&state, &body.content)
        .await
        .map_err(chat_error_to_api)?;
    Ok(Json(ExchangeResponse { question: exchange.question, reply: exchange.reply }))
}

/// Rate a reply. An unknown or malformed message id leaves the transcript as it was.
pub async fn feedback(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(body): ApiJson<FeedbackBody>,
) -> Result<Json<TranscriptResponse>, ApiError> {
    let Ok(id) = Uuid::parse_str(&id) else {
        debug!(message_id = %id, "support: feedback ignored, not a message id");
        return Ok(transcript_response(&state).await);
    };
    match support::record_feedback(&state, id, body.helpful).await {
        Ok(_) => {}
        Err(e @ ChatError::MessageNotFound(_)) => debug!(error = %e, "support: feedback ignored"),
        Err(e) => return Err(chat_error_to_api(e)),
    }
    Ok(transcript_response(&state).await)
}

pub async fn reset(State(state): State<AppState>) -> Json<TranscriptResponse> {
    support::reset(&state).await;
    transcript_response(&state).await
}

pub async fn suggestions() -> Json<SuggestionsResponse> {
    Json(SuggestionsResponse { questions: support::suggested_questions() })
}

#[cfg(test)]
#[path = "support_test.rs"]
mod tests;
