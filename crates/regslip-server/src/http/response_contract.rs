// SPDX-License-Identifier: Apache-2.0

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use regslip_api::{ApiError, ApiErrorCode};
use serde_json::{json, Value};

#[must_use]
pub(crate) fn api_error_status(code: ApiErrorCode) -> StatusCode {
    match code {
        ApiErrorCode::ValidationFailed
        | ApiErrorCode::InvalidFieldValue
        | ApiErrorCode::MissingUploadPart => StatusCode::BAD_REQUEST,
        ApiErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        ApiErrorCode::RegistrantNotFound => StatusCode::NOT_FOUND,
        ApiErrorCode::NotReady => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[must_use]
pub(crate) fn api_error_response(status: StatusCode, err: ApiError) -> Response {
    let body = Json(json!({"error": err}));
    (status, body).into_response()
}

#[must_use]
pub(crate) fn api_error(code: ApiErrorCode, message: &str, details: Value) -> ApiError {
    ApiError::new(code, message, details, "req-unknown")
}
