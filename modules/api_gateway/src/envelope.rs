//! Response envelope enforcement.
//!
//! Every outgoing JSON body is passed through the document assembler
//! so that no response leaves the service without the `jsonapi` member and a
//! valid data/errors/meta combination. A body violating the top-level
//! invariants is a collaborator bug and becomes a 500 errors document.
//! Non-JSON bodies pass through untouched; the JSON:API media type header is
//! stamped either way.

use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use serde_json::Value;
use tracing::error;

use jsonapi_core::document::{assemble, errors_document, DocumentError, JSONAPI_MEDIA_TYPE};
use jsonapi_core::error::ErrorObject;

const INVALID_DOCUMENT_DETAIL: &str = "Response is not valid according to JSON API specs";

pub async fn enforce_response_envelope(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    let (mut parts, body) = response.into_parts();

    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => return invalid_document_response(),
    };

    let body = match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(partial)) => match assemble(partial) {
            Ok(document) => Body::from(
                serde_json::to_vec(&Value::Object(document)).unwrap_or_default(),
            ),
            Err(err) => {
                error!(error = %err, "outgoing response violates the JSON API document invariants");
                return invalid_document_response_for(err);
            }
        },
        // a decodable body that is not an object cannot carry the required
        // top-level members
        Ok(_) => {
            error!("outgoing response body is JSON but not a document object");
            return invalid_document_response_for(DocumentError::MissingPrimaryMember);
        }
        // only bodies that are not JSON at all pass through unchanged
        Err(_) => Body::from(bytes),
    };

    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(JSONAPI_MEDIA_TYPE),
    );
    Response::from_parts(parts, body)
}

fn invalid_document_response() -> Response {
    build_500(ErrorObject::new(500)
        .with_title("Invalid response document")
        .with_detail(INVALID_DOCUMENT_DETAIL))
}

fn invalid_document_response_for(err: DocumentError) -> Response {
    build_500(
        ErrorObject::new(500)
            .with_title("Invalid response document")
            .with_detail(format!("{INVALID_DOCUMENT_DETAIL}: {err}")),
    )
}

fn build_500(error: ErrorObject) -> Response {
    let partial = errors_document(&[error]);
    let document = assemble(partial.clone()).unwrap_or(partial);
    let body = serde_json::to_vec(&Value::Object(document)).unwrap_or_default();

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(JSONAPI_MEDIA_TYPE),
    );
    response
}
