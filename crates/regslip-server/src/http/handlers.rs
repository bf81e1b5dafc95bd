// SPDX-License-Identifier: Apache-2.0

use axum::body::Body;
use axum::extract::multipart::{Multipart, MultipartError};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use regslip_api::{
    parse_submission, registrant_dto, ApiError, ApiErrorCode, RelayAcceptedDto, RelayUserDto,
    RosterSummaryDto, SubmitRegistrantDto,
};
use regslip_pdf::{render_slip, slip_filename};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::request_support::{
    if_none_match, is_draining, make_request_id, propagated_request_id, with_request_id,
};
use super::response_contract::{api_error, api_error_response, api_error_status};
use crate::relay::RelayError;
use crate::{AppState, CRATE_NAME};

pub(crate) async fn healthz_handler(State(state): State<AppState>) -> impl IntoResponse {
    let request_id = make_request_id(&state);
    let started = Instant::now();
    let resp = (StatusCode::OK, "ok").into_response();
    state
        .metrics
        .observe_request("/healthz", StatusCode::OK, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

pub(crate) async fn readyz_handler(State(state): State<AppState>) -> impl IntoResponse {
    let request_id = make_request_id(&state);
    let started = Instant::now();
    let (status, body) = if state.ready.load(Ordering::Relaxed) && !is_draining(&state) {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not-ready")
    };
    let resp = (status, body).into_response();
    state
        .metrics
        .observe_request("/readyz", status, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

pub(crate) async fn version_handler(State(state): State<AppState>) -> impl IntoResponse {
    let request_id = make_request_id(&state);
    let started = Instant::now();
    let payload = json!({
        "server": {
            "crate": CRATE_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "config_schema_version": crate::config::CONFIG_SCHEMA_VERSION,
        },
        "roster_prefix": state.api.roster_prefix,
    });
    let resp = Json(payload).into_response();
    state
        .metrics
        .observe_request("/v1/version", StatusCode::OK, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

pub(crate) async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let request_id = make_request_id(&state);
    let text = state.metrics.render_prometheus().await;
    let mut resp = (StatusCode::OK, text).into_response();
    resp.headers_mut().insert(
        "content-type",
        HeaderValue::from_static("text/plain; version=0.0.4"),
    );
    with_request_id(resp, &request_id)
}

/// Accepts a submission body, validates every field, and appends the
/// registrant to the roster. Rejected bodies leave the roster untouched.
pub(crate) async fn submit_registrant_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SubmitRegistrantDto>, JsonRejection>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    if is_draining(&state) {
        let resp = draining_response(&state, "/v1/registrants", started).await;
        return with_request_id(resp, &request_id);
    }
    let Json(dto) = match payload {
        Ok(v) => v,
        Err(rejection) => {
            let err = api_error(
                ApiErrorCode::ValidationFailed,
                "request body is not a valid submission",
                json!({"message": rejection.body_text()}),
            )
            .with_request_id(&request_id);
            let resp = api_error_response(StatusCode::BAD_REQUEST, err);
            state
                .metrics
                .observe_request("/v1/registrants", StatusCode::BAD_REQUEST, started.elapsed())
                .await;
            return with_request_id(resp, &request_id);
        }
    };

    let submission = match parse_submission(&dto) {
        Ok(v) => v,
        Err(field_errors) => {
            info!(request_id = %request_id, errors = field_errors.len(), "submission rejected");
            let err = ApiError::validation_failed(json!(field_errors)).with_request_id(&request_id);
            let resp = api_error_response(StatusCode::BAD_REQUEST, err);
            state
                .metrics
                .observe_request("/v1/registrants", StatusCode::BAD_REQUEST, started.elapsed())
                .await;
            return with_request_id(resp, &request_id);
        }
    };

    let mut roster = state.roster.lock().await;
    let accepted = match roster.add(submission, Utc::now()) {
        Ok(registrant) => registrant_dto(registrant),
        Err(e) => {
            let err = api_error(
                ApiErrorCode::Internal,
                "roster assignment failed",
                json!({"message": e.to_string()}),
            )
            .with_request_id(&request_id);
            let resp = api_error_response(api_error_status(ApiErrorCode::Internal), err);
            state
                .metrics
                .observe_request(
                    "/v1/registrants",
                    StatusCode::INTERNAL_SERVER_ERROR,
                    started.elapsed(),
                )
                .await;
            return with_request_id(resp, &request_id);
        }
    };
    let summary = roster_summary(&roster);
    drop(roster);

    info!(request_id = %request_id, id = %accepted.id, "registrant accepted");
    let resp = (
        StatusCode::CREATED,
        Json(json!({"registrant": accepted, "roster": summary})),
    )
        .into_response();
    state
        .metrics
        .observe_request("/v1/registrants", StatusCode::CREATED, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

pub(crate) async fn list_registrants_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let roster = state.roster.lock().await;
    let registrants: Vec<_> = roster.entries().iter().map(registrant_dto).collect();
    let summary = roster_summary(&roster);
    drop(roster);

    let payload = json!({"registrants": registrants, "roster": summary});
    let etag = format!(
        "\"{:x}\"",
        Sha256::digest(serde_json::to_vec(&payload).unwrap_or_default())
    );
    if if_none_match(&headers).as_deref() == Some(etag.as_str()) {
        let mut resp = StatusCode::NOT_MODIFIED.into_response();
        if let Ok(v) = HeaderValue::from_str(&etag) {
            resp.headers_mut().insert("etag", v);
        }
        state
            .metrics
            .observe_request("/v1/registrants", StatusCode::NOT_MODIFIED, started.elapsed())
            .await;
        return with_request_id(resp, &request_id);
    }
    let mut resp = Json(payload).into_response();
    if let Ok(v) = HeaderValue::from_str(&etag) {
        resp.headers_mut().insert("etag", v);
    }
    state
        .metrics
        .observe_request("/v1/registrants", StatusCode::OK, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

/// Renders the acknowledgment slip for the Nth accepted registrant and
/// streams it back as a PDF attachment.
pub(crate) async fn slip_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(sequence): Path<u32>,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    let registrant = { state.roster.lock().await.get(sequence).cloned() };
    let Some(registrant) = registrant else {
        let err = ApiError::registrant_not_found(sequence).with_request_id(&request_id);
        let resp = api_error_response(StatusCode::NOT_FOUND, err);
        state
            .metrics
            .observe_request(
                "/v1/registrants/{sequence}/slip",
                StatusCode::NOT_FOUND,
                started.elapsed(),
            )
            .await;
        return with_request_id(resp, &request_id);
    };

    let filename = slip_filename(registrant.full_name.as_str(), &state.org.acronym);
    let org = Arc::clone(&state.org);
    let generated_at = Utc::now();
    let rendered = tokio::task::spawn_blocking(move || {
        render_slip(&registrant, &org, generated_at)
    })
    .await;
    let bytes = match rendered {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e)) => {
            let err = api_error(
                ApiErrorCode::Internal,
                "slip rendering failed",
                json!({"message": e.to_string()}),
            )
            .with_request_id(&request_id);
            let resp = api_error_response(StatusCode::INTERNAL_SERVER_ERROR, err);
            state
                .metrics
                .observe_request(
                    "/v1/registrants/{sequence}/slip",
                    StatusCode::INTERNAL_SERVER_ERROR,
                    started.elapsed(),
                )
                .await;
            return with_request_id(resp, &request_id);
        }
        Err(e) => {
            let err = api_error(
                ApiErrorCode::Internal,
                "slip rendering task failed",
                json!({"message": e.to_string()}),
            )
            .with_request_id(&request_id);
            let resp = api_error_response(StatusCode::INTERNAL_SERVER_ERROR, err);
            state
                .metrics
                .observe_request(
                    "/v1/registrants/{sequence}/slip",
                    StatusCode::INTERNAL_SERVER_ERROR,
                    started.elapsed(),
                )
                .await;
            return with_request_id(resp, &request_id);
        }
    };

    let mut resp = Response::new(Body::from(bytes));
    resp.headers_mut()
        .insert("content-type", HeaderValue::from_static("application/pdf"));
    if let Ok(v) = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\"")) {
        resp.headers_mut().insert("content-disposition", v);
    }
    state
        .metrics
        .observe_request(
            "/v1/registrants/{sequence}/slip",
            StatusCode::OK,
            started.elapsed(),
        )
        .await;
    with_request_id(resp, &request_id)
}

/// Forwards a caller-supplied PDF to the messaging provider. The document
/// bytes pass through untouched; the handler only builds the caption.
pub(crate) async fn relay_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);
    if is_draining(&state) {
        let resp = draining_response(&state, "/v1/relay", started).await;
        return with_request_id(resp, &request_id);
    }

    let mut file: Option<(String, Vec<u8>)> = None;
    let mut user_raw: Option<String> = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                let err = multipart_error(&e).with_request_id(&request_id);
                let status = api_error_status(err.code);
                let resp = api_error_response(status, err);
                state
                    .metrics
                    .observe_request("/v1/relay", status, started.elapsed())
                    .await;
                return with_request_id(resp, &request_id);
            }
        };
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field
                    .file_name()
                    .map_or_else(|| "document.pdf".to_string(), str::to_string);
                match field.bytes().await {
                    Ok(bytes) => file = Some((filename, bytes.to_vec())),
                    Err(e) => {
                        let err = multipart_error(&e).with_request_id(&request_id);
                        let status = api_error_status(err.code);
                        let resp = api_error_response(status, err);
                        state
                            .metrics
                            .observe_request("/v1/relay", status, started.elapsed())
                            .await;
                        return with_request_id(resp, &request_id);
                    }
                }
            }
            Some("user") => match field.text().await {
                Ok(text) => user_raw = Some(text),
                Err(e) => {
                    let err = multipart_error(&e).with_request_id(&request_id);
                    let status = api_error_status(err.code);
                    let resp = api_error_response(status, err);
                    state
                        .metrics
                        .observe_request("/v1/relay", status, started.elapsed())
                        .await;
                    return with_request_id(resp, &request_id);
                }
            },
            _ => {}
        }
    }

    let Some((filename, bytes)) = file else {
        let err = ApiError::missing_upload_part("file").with_request_id(&request_id);
        let resp = api_error_response(StatusCode::BAD_REQUEST, err);
        state
            .metrics
            .observe_request("/v1/relay", StatusCode::BAD_REQUEST, started.elapsed())
            .await;
        return with_request_id(resp, &request_id);
    };
    let Some(user_raw) = user_raw else {
        let err = ApiError::missing_upload_part("user").with_request_id(&request_id);
        let resp = api_error_response(StatusCode::BAD_REQUEST, err);
        state
            .metrics
            .observe_request("/v1/relay", StatusCode::BAD_REQUEST, started.elapsed())
            .await;
        return with_request_id(resp, &request_id);
    };
    let user: RelayUserDto = match serde_json::from_str(&user_raw) {
        Ok(v) => v,
        Err(e) => {
            let err = api_error(
                ApiErrorCode::InvalidFieldValue,
                "user part is not a valid record",
                json!({"message": e.to_string()}),
            )
            .with_request_id(&request_id);
            let resp = api_error_response(StatusCode::BAD_REQUEST, err);
            state
                .metrics
                .observe_request("/v1/relay", StatusCode::BAD_REQUEST, started.elapsed())
                .await;
            return with_request_id(resp, &request_id);
        }
    };

    let Some(backend) = state.relay.clone() else {
        let err = api_error(
            ApiErrorCode::ProviderUnavailable,
            "relay backend is not configured",
            json!({}),
        )
        .with_request_id(&request_id);
        let resp = api_error_response(StatusCode::INTERNAL_SERVER_ERROR, err);
        state
            .metrics
            .observe_request(
                "/v1/relay",
                StatusCode::INTERNAL_SERVER_ERROR,
                started.elapsed(),
            )
            .await;
        return with_request_id(resp, &request_id);
    };

    let caption = crate::relay::format_caption(&user, &state.org, Utc::now());
    let document = crate::relay::RelayDocument {
        filename,
        bytes,
        caption,
    };
    match backend.send_document(document).await {
        Ok(receipt) => {
            info!(request_id = %request_id, message_id = receipt.message_id, "document relayed");
            let resp = (
                StatusCode::OK,
                Json(RelayAcceptedDto {
                    success: true,
                    message_id: receipt.message_id,
                    message: "registration document relayed successfully".to_string(),
                }),
            )
                .into_response();
            state
                .metrics
                .observe_request("/v1/relay", StatusCode::OK, started.elapsed())
                .await;
            with_request_id(resp, &request_id)
        }
        Err(e) => {
            warn!(request_id = %request_id, error = %e, "relay failed");
            let (code, message) = match &e {
                RelayError::Rejected(_) => {
                    (ApiErrorCode::ProviderRejected, "provider rejected the document")
                }
                RelayError::Transport(_) => {
                    (ApiErrorCode::ProviderUnavailable, "provider unreachable")
                }
            };
            let err = api_error(code, message, json!({"message": e.to_string()}))
                .with_request_id(&request_id);
            let resp = api_error_response(StatusCode::INTERNAL_SERVER_ERROR, err);
            state
                .metrics
                .observe_request(
                    "/v1/relay",
                    StatusCode::INTERNAL_SERVER_ERROR,
                    started.elapsed(),
                )
                .await;
            with_request_id(resp, &request_id)
        }
    }
}

fn roster_summary(roster: &regslip_model::Roster) -> RosterSummaryDto {
    RosterSummaryDto {
        count: roster.count(),
        last_added: roster
            .last_added()
            .map(|r| r.full_name.as_str().to_string()),
    }
}

fn multipart_error(err: &MultipartError) -> ApiError {
    let message = err.to_string();
    if message.contains("length limit") {
        api_error(
            ApiErrorCode::PayloadTooLarge,
            "multipart body exceeds configured limit",
            json!({}),
        )
    } else {
        api_error(
            ApiErrorCode::ValidationFailed,
            "malformed multipart body",
            json!({"message": message}),
        )
    }
}

async fn draining_response(state: &AppState, route: &str, started: Instant) -> Response {
    let err = api_error(
        ApiErrorCode::NotReady,
        "server draining; refusing new requests",
        json!({}),
    );
    let resp = api_error_response(StatusCode::SERVICE_UNAVAILABLE, err);
    state
        .metrics
        .observe_request(route, StatusCode::SERVICE_UNAVAILABLE, started.elapsed())
        .await;
    resp
}
