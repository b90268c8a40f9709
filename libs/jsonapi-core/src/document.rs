//! Top-level document assembly
//! (<https://jsonapi.org/format/#document-top-level>).

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::error::ErrorObject;

pub const JSONAPI_VERSION: &str = "1.0";

/// The JSON:API media type, sent as `Content-Type` on every response that
/// passes assembly.
pub const JSONAPI_MEDIA_TYPE: &str = "application/vnd.api+json";

/// An invalid partial document is a collaborator bug, not a client error;
/// the gateway surfaces it as a 500.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("the members `data` and `errors` must not coexist in the same document")]
    DataAndErrors,
    #[error("a document must contain at least one of `data`, `errors` or `meta`")]
    MissingPrimaryMember,
}

/// Wrap a partial document into a validated top-level JSON:API document.
///
/// Rejects documents carrying both `data` and `errors`, or none of
/// `data`/`errors`/`meta`. Valid input is deep-merged over the
/// `{"jsonapi": {"version": "1.0"}}` base; array members under matching keys
/// concatenate instead of replacing.
pub fn assemble(partial: Map<String, Value>) -> Result<Map<String, Value>, DocumentError> {
    if partial.contains_key("data") && partial.contains_key("errors") {
        return Err(DocumentError::DataAndErrors);
    }
    if !partial.contains_key("data")
        && !partial.contains_key("errors")
        && !partial.contains_key("meta")
    {
        return Err(DocumentError::MissingPrimaryMember);
    }

    let mut document = Map::new();
    document.insert("jsonapi".to_string(), json!({ "version": JSONAPI_VERSION }));
    merge_into(&mut document, partial);
    Ok(document)
}

fn merge_into(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, incoming) in source {
        match (target.get_mut(&key), incoming) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                merge_into(existing, incoming);
            }
            (Some(Value::Array(existing)), Value::Array(mut incoming)) => {
                existing.append(&mut incoming);
            }
            (slot, incoming) => {
                if let Some(slot) = slot {
                    *slot = incoming;
                } else {
                    target.insert(key, incoming);
                }
            }
        }
    }
}

/// Build the partial document for a failure response: `{"errors": [...]}`.
pub fn errors_document(errors: &[ErrorObject]) -> Map<String, Value> {
    let mut partial = Map::new();
    partial.insert(
        "errors".to_string(),
        serde_json::to_value(errors).unwrap_or_else(|_| Value::Array(Vec::new())),
    );
    partial
}
