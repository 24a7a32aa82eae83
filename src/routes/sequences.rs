//! Sequence editor routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::extract::{ApiJson, ApiJsonOrDefault, ApiPath};
use crate::services::editor::{self, SequenceView, StepForm};
use crate::services::sequence::{self, MoveDirection, SequenceError, StepPatch};
use crate::state::{AppState, SequenceStatus, Step};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceListResponse {
    pub sequences: Vec<SequenceView>,
    pub active_id: Option<String>,
}

#[derive(Serialize)]
pub struct StepAddedResponse {
    pub step: Step,
    pub sequence: SequenceView,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct CreateSequenceBody {
    pub name: String,
    pub description: String,
}

#[derive(Deserialize)]
pub struct StatusBody {
    pub status: SequenceStatus,
}

#[derive(Deserialize)]
pub struct MoveBody {
    pub direction: MoveDirection,
}

pub(crate) fn sequence_error_to_api(err: SequenceError) -> ApiError {
    let status = match err {
        SequenceError::SequenceNotFound(_) | SequenceError::StepNotFound { .. } => StatusCode::NOT_FOUND,
        SequenceError::MissingTaskDescription
        | SequenceError::InvalidSendTime(_)
        | SequenceError::UnknownTemplate(_) => StatusCode::BAD_REQUEST,
    };
    ApiError::from_code(status, &err)
}

type ViewResult = Result<Json<SequenceView>, ApiError>;

fn view(result: Result<crate::state::Sequence, SequenceError>) -> ViewResult {
    result
        .map(|seq| Json(SequenceView::build(&seq)))
        .map_err(sequence_error_to_api)
}

/// `GET /api/sequences`: every sequence plus the active selection.
pub async fn list(State(state): State<AppState>) -> Json<SequenceListResponse> {
    let (sequences, active_id) = sequence::list_sequences(&state).await;
    Json(SequenceListResponse { sequences: sequences.iter().map(SequenceView::build).collect(), active_id })
}

/// `POST /api/sequences`: create a draft sequence and select it. The body is optional.
pub async fn create(
    State(state): State<AppState>,
    ApiJsonOrDefault(body): ApiJsonOrDefault<CreateSequenceBody>,
) -> (StatusCode, Json<SequenceView>) {
    let seq = sequence::create_sequence(&state, &body.name, &body.description).await;
    (StatusCode::CREATED, Json(SequenceView::build(&seq)))
}

/// `GET /api/sequences/active`: the selected sequence, or `null`.
pub async fn active(State(state): State<AppState>) -> Json<Option<SequenceView>> {
    Json(sequence::active_sequence(&state).await.as_ref().map(SequenceView::build))
}

/// `GET /api/sequences/:id`
pub async fn get_one(State(state): State<AppState>, ApiPath(id): ApiPath<String>) -> ViewResult {
    view(sequence::get_sequence(&state, &id).await)
}

/// `POST /api/sequences/:id/select`
pub async fn select(State(state): State<AppState>, ApiPath(id): ApiPath<String>) -> ViewResult {
    view(sequence::select_sequence(&state, &id).await)
}

/// `PATCH /api/sequences/:id/status`
pub async fn set_status(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(body): ApiJson<StatusBody>,
) -> ViewResult {
    view(sequence::set_status(&state, &id, body.status).await)
}

/// `POST /api/sequences/:id/steps`: submit the step form.
pub async fn add_step(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(form): ApiJson<StepForm>,
) -> Result<(StatusCode, Json<StepAddedResponse>), ApiError> {
    let (step, seq) = editor::submit_step(&state, &id, form)
        .await
        .map_err(sequence_error_to_api)?;
    Ok((StatusCode::CREATED, Json(StepAddedResponse { step, sequence: SequenceView::build(&seq) })))
}

/// `PATCH /api/sequences/:id/steps/:step_id`
pub async fn update_step(
    State(state): State<AppState>,
    ApiPath((id, step_id)): ApiPath<(String, String)>,
    ApiJson(patch): ApiJson<StepPatch>,
) -> ViewResult {
    view(sequence::update_step(&state, &id, &step_id, patch).await)
}

/// `DELETE /api/sequences/:id/steps/:step_id`
pub async fn remove_step(
    State(state): State<AppState>,
    ApiPath((id, step_id)): ApiPath<(String, String)>,
) -> ViewResult {
    view(sequence::remove_step(&state, &id, &step_id).await)
}

/// `POST /api/sequences/:id/steps/:step_id/move`
pub async fn move_step(
    State(state): State<AppState>,
    ApiPath((id, step_id)): ApiPath<(String, String)>,
    ApiJson(body): ApiJson<MoveBody>,
) -> ViewResult {
    view(sequence::move_step(&state, &id, &step_id, body.direction).await)
}

/// `POST /api/sequences/:id/steps/:step_id/smart-send`
pub async fn toggle_smart_send(
    State(state): State<AppState>,
    ApiPath((id, step_id)): ApiPath<(String, String)>,
) -> ViewResult {
    view(sequence::toggle_smart_send_time(&state, &id, &step_id).await)
}

#[cfg(test)]
#[path = "sequences_test.rs"]
mod tests;
