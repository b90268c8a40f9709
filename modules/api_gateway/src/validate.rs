//! Inbound request validation
//! (<https://jsonapi.org/format/#content-negotiation-clients>).
//!
//! Checks run in order and short-circuit on the first failure: Content-Type
//! presence, Content-Type exactness, Accept negotiation, then document shape
//! for the verbs that carry one. A failing request never reaches a handler.

use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderMap, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::warn;

use jsonapi_core::document::{assemble, errors_document, JSONAPI_MEDIA_TYPE};
use jsonapi_core::error::{build_error_objects, predominant_status_code, ErrorMessage, ErrorObject};

const MEDIA_TYPE_PARAMS_DETAIL: &str = "Clients MUST send all JSON API data in request documents with the header Content-Type: application/vnd.api+json without any media type parameters.";
const ACCEPT_DETAIL: &str = "Clients that include the JSON API media type in their Accept header MUST specify the media type there at least once without any media type parameters.";
const MISSING_DATA_DETAIL: &str = "The request MUST include a single resource object as primary data.";
const MISSING_TYPE_DETAIL: &str = "The request resource object MUST contain at least a type member.";
const MISSING_ID_DETAIL: &str = "The request resource object for a PATCH request MUST contain an id member.";

/// Validate headers and, for POST/PATCH, the request document. Returns an
/// empty list when the request may proceed.
pub fn validate_request(
    method: &Method,
    headers: &HeaderMap,
    body: Option<&Value>,
) -> Vec<ErrorObject> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let Some(content_type) = content_type else {
        return build_error_objects(
            vec![ErrorMessage::titled(
                "Invalid request missing Content-Type header",
                MEDIA_TYPE_PARAMS_DETAIL,
            )],
            400,
        );
    };

    if content_type != JSONAPI_MEDIA_TYPE {
        return build_error_objects(
            vec![ErrorMessage::titled(
                "Invalid request Content-Type header",
                MEDIA_TYPE_PARAMS_DETAIL,
            )],
            415,
        );
    }

    if let Some(accept) = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()) {
        if !accept_includes_json_api(accept) {
            return build_error_objects(
                vec![ErrorMessage::titled("Invalid request Accept header", ACCEPT_DETAIL)],
                406,
            );
        }
    }

    if matches!(*method, Method::POST | Method::PATCH) {
        return validate_document(method, body);
    }

    Vec::new()
}

/// The Accept header must list the JSON:API media type at least once without
/// parameters.
fn accept_includes_json_api(accept: &str) -> bool {
    accept
        .split(',')
        .any(|media_range| media_range.trim() == JSONAPI_MEDIA_TYPE)
}

fn validate_document(method: &Method, body: Option<&Value>) -> Vec<ErrorObject> {
    let data = body.and_then(|document| document.get("data"));
    let Some(data) = data else {
        return build_error_objects(
            vec![ErrorMessage::titled("Invalid request", MISSING_DATA_DETAIL)],
            422,
        );
    };

    match data {
        Value::Array(resource_objects) => resource_objects
            .iter()
            .flat_map(|object| validate_resource_object(object, method))
            .collect(),
        single => validate_resource_object(single, method),
    }
}

fn validate_resource_object(resource_object: &Value, method: &Method) -> Vec<ErrorObject> {
    if resource_object.get("type").is_none() {
        return build_error_objects(
            vec![ErrorMessage::titled("Invalid request", MISSING_TYPE_DETAIL)],
            422,
        );
    }

    if *method == Method::PATCH && resource_object.get("id").is_none() {
        return build_error_objects(
            vec![ErrorMessage::titled("Invalid request", MISSING_ID_DETAIL)],
            422,
        );
    }

    Vec::new()
}

/// Middleware form of [`validate_request`]: buffers the body for the verbs
/// that carry one and responds with a JSON:API errors document at the
/// predominant status code when validation fails.
pub async fn validate_json_api_request(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();

    let request = if matches!(parts.method, Method::POST | Method::PATCH) {
        let bytes = match axum::body::to_bytes(body, usize::MAX).await {
            Ok(bytes) => bytes,
            Err(_) => {
                return error_response(build_error_objects(
                    vec![ErrorMessage::titled(
                        "Invalid request",
                        "Unable to read the request body.",
                    )],
                    400,
                ));
            }
        };
        let document = serde_json::from_slice::<Value>(&bytes).ok();
        let errors = validate_request(&parts.method, &parts.headers, document.as_ref());
        if !errors.is_empty() {
            return rejected(&parts, errors);
        }
        Request::from_parts(parts, Body::from(bytes))
    } else {
        let errors = validate_request(&parts.method, &parts.headers, None);
        if !errors.is_empty() {
            return rejected(&parts, errors);
        }
        Request::from_parts(parts, body)
    };

    next.run(request).await
}

fn rejected(parts: &http::request::Parts, errors: Vec<ErrorObject>) -> Response {
    warn!(
        method = %parts.method,
        path = %parts.uri.path(),
        count = errors.len(),
        "rejected request failing JSON API validation"
    );
    error_response(errors)
}

/// Assemble an errors document response at the predominant status code.
pub(crate) fn error_response(errors: Vec<ErrorObject>) -> Response {
    let status = predominant_status_code(&errors, 422);
    let partial = errors_document(&errors);
    // an errors document always satisfies the top-level invariants
    let document = assemble(partial.clone()).unwrap_or(partial);

    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::UNPROCESSABLE_ENTITY);
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, JSONAPI_MEDIA_TYPE)
        .body(Body::from(
            serde_json::to_vec(&Value::Object(document)).unwrap_or_default(),
        ))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    fn json_api_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(JSONAPI_MEDIA_TYPE),
        );
        headers
    }

    #[test]
    fn missing_content_type_is_400() {
        let errors = validate_request(&Method::GET, &HeaderMap::new(), None);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].status, 400);
        assert_eq!(
            errors[0].title.as_deref(),
            Some("Invalid request missing Content-Type header")
        );
    }

    #[test]
    fn wrong_content_type_is_415() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        let errors = validate_request(&Method::GET, &headers, None);
        assert_eq!(errors[0].status, 415);
    }

    #[test]
    fn media_type_with_parameters_is_415() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/vnd.api+json; charset=utf-8"),
        );
        let errors = validate_request(&Method::GET, &headers, None);
        assert_eq!(errors[0].status, 415);
    }

    #[test]
    fn accept_without_parameter_free_media_type_is_406() {
        let mut headers = json_api_headers();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/vnd.api+json;q=0.9"),
        );
        let errors = validate_request(&Method::GET, &headers, None);
        assert_eq!(errors[0].status, 406);
        assert_eq!(errors[0].title.as_deref(), Some("Invalid request Accept header"));
    }

    #[test]
    fn accept_listing_the_media_type_once_plain_passes() {
        let mut headers = json_api_headers();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/html, application/vnd.api+json"),
        );
        assert!(validate_request(&Method::GET, &headers, None).is_empty());
    }

    #[test]
    fn post_without_data_member_is_422() {
        let errors = validate_request(&Method::POST, &json_api_headers(), Some(&json!({})));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].status, 422);
        assert_eq!(errors[0].detail.as_deref(), Some(MISSING_DATA_DETAIL));
    }

    #[test]
    fn post_resource_object_requires_type() {
        let body = json!({"data": {"attributes": {"name": "x"}}});
        let errors = validate_request(&Method::POST, &json_api_headers(), Some(&body));
        assert_eq!(errors[0].status, 422);
        assert_eq!(errors[0].detail.as_deref(), Some(MISSING_TYPE_DETAIL));
    }

    #[test]
    fn patch_resource_object_requires_id() {
        let body = json!({"data": {"type": "projects", "attributes": {}}});
        let errors = validate_request(&Method::PATCH, &json_api_headers(), Some(&body));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].status, 422);
        assert_eq!(errors[0].title.as_deref(), Some("Invalid request"));
        assert_eq!(errors[0].detail.as_deref(), Some(MISSING_ID_DETAIL));
    }

    #[test]
    fn patch_with_type_and_id_passes() {
        let body = json!({"data": {"type": "projects", "id": "1"}});
        assert!(validate_request(&Method::PATCH, &json_api_headers(), Some(&body)).is_empty());
    }

    #[test]
    fn array_data_validates_every_resource_object() {
        let body = json!({"data": [
            {"type": "projects", "id": "1"},
            {"attributes": {}},
            {"type": "projects"}
        ]});
        let errors = validate_request(&Method::PATCH, &json_api_headers(), Some(&body));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].detail.as_deref(), Some(MISSING_TYPE_DETAIL));
        assert_eq!(errors[1].detail.as_deref(), Some(MISSING_ID_DETAIL));
    }

    #[test]
    fn get_requests_skip_document_validation() {
        assert!(validate_request(&Method::GET, &json_api_headers(), None).is_empty());
    }
}
