//! Link derivation from request URLs (<https://jsonapi.org/format/#document-links>).
//!
//! The URL path shape decides which links a document carries. Shapes are
//! matched in order against the end of the request base URL:
//!
//! - `.../{type}/{id}/relationships/{name}` — relationship endpoint
//! - `.../{type}/{id}/{name}` — sub-resource endpoint
//! - `.../{type}/{id}` — single primary resource
//! - `.../{type}` — primary resource collection

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathShape {
    Relationship,
    SubResource,
    Resource,
    Collection,
    Other,
}

fn relationship_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/\w+/\d+/relationships/\w+$").unwrap())
}

fn sub_resource_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/\w+/\d+/\w+$").unwrap())
}

fn resource_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/\w+/\d+$").unwrap())
}

fn collection_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/\w+$").unwrap())
}

/// Classify a request base URL by its path shape.
pub fn classify(base_url: &str) -> PathShape {
    if relationship_re().is_match(base_url) {
        PathShape::Relationship
    } else if sub_resource_re().is_match(base_url) {
        PathShape::SubResource
    } else if resource_re().is_match(base_url) {
        PathShape::Resource
    } else if collection_re().is_match(base_url) {
        PathShape::Collection
    } else {
        PathShape::Other
    }
}

/// Top-level `links` member of a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopLevelLinks {
    #[serde(rename = "self")]
    pub self_: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related: Option<String>,
}

/// Per-resource-object `links` member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceLinks {
    #[serde(rename = "self")]
    pub self_: String,
}

/// A relationship object: `self` points at the relationship endpoint,
/// `related` at the related resource endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationshipObject {
    pub links: RelationshipLinks,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationshipLinks {
    #[serde(rename = "self")]
    pub self_: String,
    pub related: String,
}

/// Derive the document's top-level `self`/`related` links from the request
/// base URL. On collection-shaped URLs a known resource id is appended to
/// `self` (a just-created resource's canonical URL).
pub fn top_level_links(base_url: &str, resource_id: Option<&str>) -> TopLevelLinks {
    match classify(base_url) {
        PathShape::Relationship => TopLevelLinks {
            self_: base_url.to_string(),
            related: Some(base_url.replace("relationships/", "")),
        },
        PathShape::SubResource | PathShape::Resource => TopLevelLinks {
            self_: base_url.to_string(),
            related: None,
        },
        PathShape::Collection | PathShape::Other => TopLevelLinks {
            self_: match resource_id {
                Some(id) => format!("{base_url}/{id}"),
                None => base_url.to_string(),
            },
            related: None,
        },
    }
}

/// Derive a resource object's own `self` link.
///
/// Relationship endpoints return resource identifier objects (no links), and
/// a single primary resource carries its link at the top level instead, so
/// both yield `None`. Sub-resource URLs are rewritten to the related type's
/// collection URL before the id is appended.
pub fn resource_object_links(base_url: &str, resource_id: &str) -> Option<ResourceLinks> {
    static STRIP_RE: OnceLock<Regex> = OnceLock::new();
    let strip_re = STRIP_RE.get_or_init(|| Regex::new(r"/\w+/\d+(/\w+)$").unwrap());

    match classify(base_url) {
        PathShape::Relationship | PathShape::Resource => None,
        PathShape::SubResource => {
            let collection_url = strip_re.replace(base_url, "$1");
            Some(ResourceLinks {
                self_: format!("{collection_url}/{resource_id}"),
            })
        }
        PathShape::Collection => Some(ResourceLinks {
            self_: format!("{base_url}/{resource_id}"),
        }),
        PathShape::Other => None,
    }
}

/// Build a relationship object for a named sub-resource of `base_url`.
pub fn relationship_object(sub_resource_name: &str, base_url: &str) -> RelationshipObject {
    RelationshipObject {
        links: RelationshipLinks {
            self_: format!("{base_url}/relationships/{sub_resource_name}"),
            related: format!("{base_url}/{sub_resource_name}"),
        },
    }
}
