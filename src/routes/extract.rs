//! Request extractors that reject with `ApiError`.
//!
//! DESIGN
//! ======
//! Axum's own `Json` and `Path` reject with plain-text bodies (mostly 422).
//! These wrappers run the same extraction and turn any rejection into a
//! 400 with the usual `{ "code", "message" }` body.

use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::Json;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

pub const E_INVALID_BODY: &str = "E_INVALID_BODY";
pub const E_INVALID_PATH: &str = "E_INVALID_PATH";

fn invalid(code: &'static str, message: String) -> ApiError {
    ApiError { status: StatusCode::BAD_REQUEST, code, message }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        invalid(E_INVALID_BODY, rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        invalid(E_INVALID_PATH, rejection.body_text())
    }
}

// =============================================================================
// EXTRACTORS
// =============================================================================

/// JSON body.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// JSON body where an empty body means `T::default()`.
/// The content type is not checked.
pub struct ApiJsonOrDefault<T>(pub T);

impl<S, T> FromRequest<S> for ApiJsonOrDefault<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| invalid(E_INVALID_BODY, e.body_text()))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }
        serde_json::from_slice(&bytes)
            .map(Self)
            .map_err(|e| invalid(E_INVALID_BODY, e.to_string()))
    }
}

/// Path parameters.
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}
