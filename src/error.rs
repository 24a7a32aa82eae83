//! Error codes and HTTP error bodies.
//!
//! DESIGN
//! ======
//! Every service error enum implements `ErrorCode` so failures carry a
//! grepable `E_*` code alongside the human-readable message. Route
//! handlers convert service errors into `ApiError`, which renders as a
//! `{ "code", "message" }` JSON body with the matching status.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

// =============================================================================
// ERROR CODES
// =============================================================================

/// Grepable error code for structured error responses.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;
}

// =============================================================================
// API ERROR
// =============================================================================

/// Wire shape of an error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// An error ready to be sent to the shell.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    /// Build from any typed service error.
    pub fn from_code(status: StatusCode, err: &(impl ErrorCode + ?Sized)) -> Self {
        Self { status, code: err.error_code(), message: err.to_string() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { code: self.code, message: self.message };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
