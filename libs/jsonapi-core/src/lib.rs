//! # jsonapi-core
//!
//! Building blocks for JSON:API (jsonapi.org, v1.0) response documents:
//!
//! - error objects and the predominant-status-code selection rule
//! - `self`/`related`/pagination link derivation from request URLs
//! - resource object serialization (full and minimal)
//! - top-level document assembly with the data/errors/meta invariants
//! - page-number based pagination links and meta counts
//! - a resource-type registry with typed relationship descriptors
//!
//! Everything here is a pure function of its inputs; no component holds
//! request-scoped or process-wide mutable state.

pub mod document;
pub mod error;
pub mod links;
pub mod pagination;
pub mod registry;
pub mod resource;

pub use document::{assemble, errors_document, DocumentError, JSONAPI_MEDIA_TYPE, JSONAPI_VERSION};
pub use error::{
    build_error_objects, from_template, from_validation_errors, predominant_status_code,
    ErrorMessage, ErrorMessages, ErrorObject, ErrorSource, MessageOverride,
};
pub use links::{
    classify, relationship_object, resource_object_links, top_level_links, PathShape,
    RelationshipObject, ResourceLinks, TopLevelLinks,
};
pub use pagination::{
    pagination_links, pagination_meta, pagination_options, PageQuery, PageState, PaginationLinks,
    PaginationOptions, PAGINATION_LIMIT,
};
pub use registry::{
    RegistryError, RelationshipDescriptor, RelationshipKind, RelationshipStore, ResourceType,
    ResourceTypeRegistry,
};
pub use resource::{serialize_resource_object, ResourceObject};
