//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The dashboard shell talks to the core through this JSON API. Handlers
//! translate user intents into named service operations and return
//! render-ready projections; they hold no business rules of their own.

pub mod catalog;
pub mod extract;
pub mod sequences;
pub mod support;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/sequences", get(sequences::list).post(sequences::create))
        .route("/api/sequences/active", get(sequences::active))
        .route("/api/sequences/{id}", get(sequences::get_one))
        .route("/api/sequences/{id}/select", post(sequences::select))
        .route("/api/sequences/{id}/status", patch(sequences::set_status))
        .route("/api/sequences/{id}/steps", post(sequences::add_step))
        .route(
            "/api/sequences/{id}/steps/{step_id}",
            patch(sequences::update_step).delete(sequences::remove_step),
        )
        .route("/api/sequences/{id}/steps/{step_id}/move", post(sequences::move_step))
        .route("/api/sequences/{id}/steps/{step_id}/smart-send", post(sequences::toggle_smart_send))
        .route("/api/templates", get(catalog::templates))
        .route("/api/knowledge", get(catalog::knowledge))
        .route("/api/responsible-ai", get(catalog::responsible_ai))
        .route("/api/support/messages", get(support::messages).post(support::send))
        .route("/api/support/messages/{id}/feedback", post(support::feedback))
        .route("/api/support/reset", post(support::reset))
        .route("/api/support/suggestions", get(support::suggestions))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use tower::ServiceExt;

    /// Send one request through the router and decode the JSON body.
    pub async fn json_request(
        app: Router,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let body = body.map_or_else(Body::empty, |v| Body::from(v.to_string()));
        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
