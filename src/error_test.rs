use super::*;

#[derive(Debug, thiserror::Error)]
#[error("not found")]
struct NotFound;

impl ErrorCode for NotFound {
    fn error_code(&self) -> &'static str {
        "E_NOT_FOUND"
    }
}

#[test]
fn from_code_copies_code_and_message() {
    let err = ApiError::from_code(StatusCode::NOT_FOUND, &NotFound);
    assert_eq!(err.status, StatusCode::NOT_FOUND);
    assert_eq!(err.code, "E_NOT_FOUND");
    assert_eq!(err.message, "not found");
}

#[tokio::test]
async fn into_response_renders_json_body() {
    let response = ApiError::from_code(StatusCode::BAD_REQUEST, &NotFound).into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["code"], "E_NOT_FOUND");
    assert_eq!(json["message"], "not found");
}
