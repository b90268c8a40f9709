//! JSON:API error objects (<https://jsonapi.org/format/#error-objects>) and
//! the builders that produce them from raw messages, attribute validation
//! failures, or configuration-driven templates.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// A single member of a top-level `errors` array.
///
/// Only `status` is always present; every other member is emitted only when
/// the source message supplied it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ErrorSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// The `source` member of an error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

impl ErrorSource {
    pub fn pointer(pointer: impl Into<String>) -> Self {
        Self {
            pointer: Some(pointer.into()),
            parameter: None,
        }
    }
}

impl ErrorObject {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            id: None,
            about: None,
            code: None,
            detail: None,
            links: None,
            meta: None,
            pointer: None,
            parameter: None,
            source: None,
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_source(mut self, source: ErrorSource) -> Self {
        self.source = Some(source);
        self
    }
}

/// A raw error message, as produced by collaborators (validators, the ACL
/// evaluator, auth translation). All members are optional; `status` falls
/// back to the HTTP code supplied to [`build_error_objects`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorMessage {
    pub status: Option<u16>,
    pub id: Option<String>,
    pub about: Option<String>,
    pub code: Option<String>,
    pub detail: Option<String>,
    pub links: Option<serde_json::Value>,
    pub meta: Option<serde_json::Value>,
    pub pointer: Option<String>,
    pub parameter: Option<String>,
    pub source: Option<ErrorSource>,
    pub title: Option<String>,
}

impl ErrorMessage {
    /// Shorthand for the common title + detail case.
    pub fn titled(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            detail: Some(detail.into()),
            ..Self::default()
        }
    }
}

/// Build error objects from raw messages, copying only the members each
/// message provides and defaulting `status` to `default_status`.
pub fn build_error_objects(messages: Vec<ErrorMessage>, default_status: u16) -> Vec<ErrorObject> {
    messages
        .into_iter()
        .map(|m| ErrorObject {
            status: m.status.unwrap_or(default_status),
            id: m.id,
            about: m.about,
            code: m.code,
            detail: m.detail,
            links: m.links,
            meta: m.meta,
            pointer: m.pointer,
            parameter: m.parameter,
            source: m.source,
            title: m.title,
        })
        .collect()
}

/// Build one error object per invalid attribute.
///
/// The first message for a field becomes `detail`, the source pointer is
/// `/data/attributes/<field>`, and the status is 409 when any message for the
/// field mentions a uniqueness violation, otherwise `default_status`.
pub fn from_validation_errors(
    field_errors: &BTreeMap<String, Vec<String>>,
    default_status: u16,
) -> Vec<ErrorObject> {
    field_errors
        .iter()
        .map(|(field, messages)| {
            let status = messages.iter().fold(default_status, |carry, message| {
                if message.contains("unique") {
                    409
                } else {
                    carry
                }
            });

            ErrorObject {
                status,
                detail: messages.first().cloned(),
                source: Some(ErrorSource::pointer(format!("/data/attributes/{field}"))),
                title: Some("Invalid Attribute".to_string()),
                ..ErrorObject::new(status)
            }
        })
        .collect()
}

/// A configured error-message member that either applies uniformly to every
/// message key or is looked up per key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageOverride<T> {
    Uniform(T),
    PerKey(HashMap<String, T>),
}

impl<T: Clone> MessageOverride<T> {
    pub fn resolve(&self, key: &str) -> Option<T> {
        match self {
            MessageOverride::Uniform(value) => Some(value.clone()),
            MessageOverride::PerKey(map) => map.get(key).cloned(),
        }
    }
}

/// The `error_messages` section of an ACL or JWT configuration namespace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ErrorMessages {
    pub status_code: Option<MessageOverride<u16>>,
    pub title: Option<MessageOverride<String>>,
    pub detail: Option<MessageOverride<String>>,
}

impl ErrorMessages {
    pub fn per_key_detail<I, K, V>(status: u16, title: &str, details: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            status_code: Some(MessageOverride::Uniform(status)),
            title: Some(MessageOverride::Uniform(title.to_string())),
            detail: Some(MessageOverride::PerKey(
                details
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            )),
        }
    }
}

/// Build an error object from a configured message template, falling back
/// per member to the supplied hard defaults when the configuration has no
/// value for `key`.
pub fn from_template(
    messages: &ErrorMessages,
    key: &str,
    default_status: u16,
    default_title: &str,
    default_detail: &str,
) -> ErrorObject {
    let status = messages
        .status_code
        .as_ref()
        .and_then(|o| o.resolve(key))
        .unwrap_or(default_status);
    let title = messages
        .title
        .as_ref()
        .and_then(|o| o.resolve(key))
        .unwrap_or_else(|| default_title.to_string());
    let detail = messages
        .detail
        .as_ref()
        .and_then(|o| o.resolve(key))
        .unwrap_or_else(|| default_detail.to_string());

    ErrorObject::new(status).with_title(title).with_detail(detail)
}

/// Pick the overall HTTP status for a multi-error response: the status that
/// occurs most often wins, but when more than one distinct status shares the
/// maximum count the tie-break status is returned instead.
///
/// Clients depend on this exact tie-break, so it is deliberately not the
/// "return the highest status" rule one might expect.
pub fn predominant_status_code(errors: &[ErrorObject], tie_break_status: u16) -> u16 {
    let mut counts: HashMap<u16, usize> = HashMap::new();
    for error in errors {
        *counts.entry(error.status).or_default() += 1;
    }

    let Some(max_count) = counts.values().copied().max() else {
        return tie_break_status;
    };

    let mut at_max = counts
        .iter()
        .filter(|(_, c)| **c == max_count)
        .map(|(status, _)| *status);
    match (at_max.next(), at_max.next()) {
        (Some(status), None) => status,
        _ => tie_break_status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_error_objects_defaults_status_and_copies_members() {
        let errors = build_error_objects(
            vec![
                ErrorMessage::titled("Invalid request", "missing data"),
                ErrorMessage {
                    status: Some(409),
                    code: Some("conflict".to_string()),
                    ..ErrorMessage::default()
                },
            ],
            422,
        );

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].status, 422);
        assert_eq!(errors[0].title.as_deref(), Some("Invalid request"));
        assert_eq!(errors[1].status, 409);
        assert_eq!(errors[1].code.as_deref(), Some("conflict"));
        assert!(errors[1].title.is_none());
    }

    #[test]
    fn error_object_serialization_skips_absent_members() {
        let error = ErrorObject::new(403).with_title("Forbidden");
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json, serde_json::json!({"status": 403, "title": "Forbidden"}));
    }

    #[test]
    fn validation_errors_become_pointer_scoped_objects() {
        let mut fields = BTreeMap::new();
        fields.insert(
            "email".to_string(),
            vec!["The email has already been taken (unique).".to_string()],
        );
        fields.insert("name".to_string(), vec!["The name field is required.".to_string()]);

        let errors = from_validation_errors(&fields, 422);

        assert_eq!(errors.len(), 2);
        let email = &errors[0];
        assert_eq!(email.status, 409);
        assert_eq!(
            email.source.as_ref().unwrap().pointer.as_deref(),
            Some("/data/attributes/email")
        );
        assert_eq!(email.title.as_deref(), Some("Invalid Attribute"));

        let name = &errors[1];
        assert_eq!(name.status, 422);
        assert_eq!(name.detail.as_deref(), Some("The name field is required."));
    }

    #[test]
    fn template_prefers_config_then_defaults() {
        let messages = ErrorMessages::per_key_detail(
            403,
            "Forbidden",
            [("check_ownership_fail", "User does not own target resource")],
        );

        let error = from_template(&messages, "check_ownership_fail", 400, "Bad Request", "nope");
        assert_eq!(error.status, 403);
        assert_eq!(error.title.as_deref(), Some("Forbidden"));
        assert_eq!(error.detail.as_deref(), Some("User does not own target resource"));

        let fallback = from_template(&messages, "unknown_key", 400, "Bad Request", "nope");
        assert_eq!(fallback.status, 403);
        assert_eq!(fallback.detail.as_deref(), Some("nope"));
    }

    #[test]
    fn uniform_override_applies_to_every_key() {
        let messages = ErrorMessages {
            detail: Some(MessageOverride::Uniform("Denied".to_string())),
            ..ErrorMessages::default()
        };
        let error = from_template(&messages, "anything", 403, "Forbidden", "default");
        assert_eq!(error.detail.as_deref(), Some("Denied"));
    }

    #[test]
    fn predominant_status_returns_majority() {
        let errors = vec![
            ErrorObject::new(409),
            ErrorObject::new(409),
            ErrorObject::new(422),
        ];
        assert_eq!(predominant_status_code(&errors, 422), 409);
    }

    #[test]
    fn predominant_status_single_error() {
        assert_eq!(predominant_status_code(&[ErrorObject::new(403)], 422), 403);
    }

    #[test]
    fn predominant_status_repeated_single_value() {
        let errors = vec![ErrorObject::new(409); 3];
        assert_eq!(predominant_status_code(&errors, 422), 409);
    }

    #[test]
    fn predominant_status_tie_uses_tie_break() {
        let errors = vec![
            ErrorObject::new(409),
            ErrorObject::new(409),
            ErrorObject::new(400),
            ErrorObject::new(400),
            ErrorObject::new(422),
        ];
        assert_eq!(predominant_status_code(&errors, 422), 422);
    }

    #[test]
    fn predominant_status_empty_list_uses_tie_break() {
        assert_eq!(predominant_status_code(&[], 422), 422);
    }
}
