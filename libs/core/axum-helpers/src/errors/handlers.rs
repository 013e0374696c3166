use axum::{
    Json,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};

use super::{ErrorCode, ErrorResponse};

/// Router fallback returning the standard JSON error body.
pub async fn not_found(uri: Uri) -> Response {
    tracing::debug!(%uri, "No route matched");
    let body = ErrorResponse::new(
        ErrorCode::RouteNotFound,
        ErrorCode::RouteNotFound.default_message(),
    );

    (StatusCode::NOT_FOUND, Json(body)).into_response()
}
