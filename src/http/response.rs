//! Response envelopes.
//!
//! # Responsibilities
//! - Wrap handler payloads as `{ "data": ... }` with status 200
//! - Render failures as `{ "error": ... }` with the mapped status
//! - Attach `Access-Control-Allow-Origin: *` to every response
//!
//! # Design Decisions
//! - Envelopes are built here only; the pipeline never writes bodies itself
//! - A payload that fails to serialize is reported as an internal error

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::{translate, DomainError, INTERNAL_ERROR_MESSAGE};
use crate::routing::body::BodyIssue;
use crate::routing::param::PathParseError;

/// JSON envelope used for all responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Envelope<T, E> {
    Data(T),
    Error(E),
}

/// 200 `{ "data": payload }`.
pub fn data<T: Serialize>(payload: T) -> Response {
    match serde_json::to_value(payload) {
        Ok(value) => json(StatusCode::OK, Envelope::<_, ()>::Data(value)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize handler payload");
            error_message(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
        }
    }
}

/// Translated domain error.
pub fn domain_error(error: &DomainError) -> Response {
    let translated = translate(error);
    error_message(translated.status, &translated.message)
}

/// 400 with the schema's issue list.
pub fn body_issues(issues: &[BodyIssue]) -> Response {
    json(StatusCode::BAD_REQUEST, Envelope::<(), _>::Error(issues))
}

/// 400 `{ "error": "Invalid url path" }`.
pub fn invalid_path() -> Response {
    error_message(StatusCode::BAD_REQUEST, &PathParseError.to_string())
}

/// `{ "error": reason }` for requests the transport rejects before the pipeline
/// runs (wrong method, unreadable or oversized body).
pub fn transport_error(status: StatusCode) -> Response {
    error_message(status, status.canonical_reason().unwrap_or("Request Rejected"))
}

fn error_message(status: StatusCode, message: &str) -> Response {
    json(status, Envelope::<(), _>::Error(message))
}

fn json<T: Serialize, E: Serialize>(status: StatusCode, envelope: Envelope<T, E>) -> Response {
    let mut response = (status, Json(envelope)).into_response();
    allow_any_origin(&mut response);
    response
}

/// Mark a response as readable from any origin.
pub fn allow_any_origin(response: &mut Response) {
    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
}
