//! Resource object serialization
//! (<https://jsonapi.org/format/#document-resource-objects>).

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::links::{relationship_object, RelationshipObject, ResourceLinks};
use crate::registry::ResourceType;

/// A serialized resource object. With `attributes`/`relationships`/`links`
/// all absent this doubles as a resource identifier object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceObject {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationships: Option<BTreeMap<String, RelationshipObject>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<ResourceLinks>,
}

/// Keys never copied into `attributes`: identity and pivot members, and any
/// foreign key (`*_id`).
fn is_internal_key(key: &str) -> bool {
    key == "id" || key == "type" || key == "pivot" || key.ends_with("_id")
}

fn stringify_id(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Serialize a raw attribute map into a resource object.
///
/// `is_minimal` restricts the output to `type` + `id` (plus relationship
/// stubs when requested); full objects additionally carry the filtered
/// attributes and, when provided, a `links` member.
pub fn serialize_resource_object(
    data: &Map<String, Value>,
    resource_type: &ResourceType,
    base_url: &str,
    links: Option<ResourceLinks>,
    include_relationships: bool,
    is_minimal: bool,
) -> ResourceObject {
    let attributes = (!is_minimal).then(|| {
        data.iter()
            .filter(|(key, _)| !is_internal_key(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect::<Map<String, Value>>()
    });

    let relationships = (include_relationships && !resource_type.default_relationships.is_empty())
        .then(|| {
            resource_type
                .default_relationships
                .iter()
                .map(|name| (name.clone(), relationship_object(name, base_url)))
                .collect::<BTreeMap<String, RelationshipObject>>()
        });

    ResourceObject {
        id: stringify_id(data.get("id")),
        type_: resource_type.name.clone(),
        attributes,
        relationships,
        links: if is_minimal { None } else { links },
    }
}
