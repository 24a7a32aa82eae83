//! Read-only reference data routes.

use axum::extract::State;
use axum::response::Json;
use serde::Serialize;

use crate::services::catalog::{EmailTemplate, KnowledgeArticle, ResponsibleAiData};
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsibleAiResponse {
    #[serde(flatten)]
    pub data: ResponsibleAiData,
    pub open_violations: usize,
}

pub async fn templates(State(state): State<AppState>) -> Json<Vec<EmailTemplate>> {
    Json(state.catalog.templates.clone())
}

pub async fn knowledge(State(state): State<AppState>) -> Json<Vec<KnowledgeArticle>> {
    Json(state.catalog.knowledge.clone())
}

/// Policies, audit log and violations, plus the count still unresolved.
pub async fn responsible_ai(State(state): State<AppState>) -> Json<ResponsibleAiResponse> {
    let data = state.catalog.responsible_ai.clone();
    let open_violations = data.open_violations().count();
    Json(ResponsibleAiResponse { data, open_violations })
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
