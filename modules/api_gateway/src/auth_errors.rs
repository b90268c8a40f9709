//! Translation of upstream authentication-failure bodies.
//!
//! JWT guards upstream of this layer report failures as `{"error": "<key>"}`.
//! Recognized keys are rewritten into a JSON:API errors document built from
//! the `jwt.error_messages` configuration, and the response status follows
//! the translated error. Unrecognized bodies pass through untouched; the
//! envelope layer still wraps whatever comes out of here.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use serde_json::Value;
use tracing::warn;

use jsonapi_acl::JwtConfig;
use jsonapi_core::document::errors_document;
use jsonapi_core::error::from_template;

const DEFAULT_STATUS: u16 = 401;
const DEFAULT_TITLE: &str = "Unauthorised";

/// Recognized failure keys with their hard-default details.
const JWT_ERROR_KEYS: [(&str, &str); 4] = [
    ("token_not_provided", "Access token not provided"),
    ("token_expired", "Access token is expired"),
    ("token_invalid", "Access token is invalid"),
    ("user_not_found", "No user for given access token"),
];

pub async fn translate_jwt_errors(
    State(jwt): State<Arc<JwtConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    let (mut parts, body) = response.into_parts();

    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => return Response::from_parts(parts, Body::empty()),
    };

    let failure_key = serde_json::from_slice::<Value>(&bytes)
        .ok()
        .as_ref()
        .and_then(|content| content.get("error"))
        .and_then(Value::as_str)
        .and_then(|key| {
            JWT_ERROR_KEYS
                .iter()
                .find(|(known, _)| *known == key)
                .map(|(known, default_detail)| (known.to_string(), *default_detail))
        });

    let Some((key, default_detail)) = failure_key else {
        return Response::from_parts(parts, Body::from(bytes));
    };

    let error = from_template(
        &jwt.error_messages,
        &key,
        DEFAULT_STATUS,
        DEFAULT_TITLE,
        default_detail,
    );
    warn!(key = %key, status = error.status, "translated JWT failure response");

    parts.status = StatusCode::from_u16(error.status).unwrap_or(StatusCode::UNAUTHORIZED);
    parts.headers.remove(header::CONTENT_LENGTH);
    let body = serde_json::to_vec(&Value::Object(errors_document(&[error]))).unwrap_or_default();
    Response::from_parts(parts, Body::from(body))
}
