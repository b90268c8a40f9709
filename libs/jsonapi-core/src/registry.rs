//! Static resource-type registry.
//!
//! Resource types are registered once at process start and read-only
//! afterwards. Relationships are declared as typed descriptors (to-one /
//! to-many) rather than resolved reflectively at request time; linkage
//! mutation is delegated to the data-access layer through
//! [`RelationshipStore`].

use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown resource type `{0}`")]
    UnknownType(String),
    #[error("resource type `{resource_type}` has no relationship `{name}`")]
    UnknownRelationship { resource_type: String, name: String },
    #[error("`{operation}` is not supported on {kind:?} relationship `{name}`")]
    KindMismatch {
        operation: &'static str,
        kind: RelationshipKind,
        name: String,
    },
    #[error("relationship store error: {0}")]
    Store(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipKind {
    ToOne,
    ToMany,
}

/// A declared relationship of a resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipDescriptor {
    pub name: String,
    pub related_type: String,
    pub kind: RelationshipKind,
}

/// Linkage operations supplied by the data-access collaborator. Implementors
/// persist relationship changes; this crate only routes the calls through the
/// matching descriptor.
pub trait RelationshipStore {
    /// Current related id(s) for a resource's relationship.
    fn related_ids(
        &self,
        resource_id: &str,
        relationship: &RelationshipDescriptor,
    ) -> Result<Vec<String>, RegistryError>;

    /// Point a to-one relationship at `related_id`.
    fn associate(
        &self,
        resource_id: &str,
        relationship: &RelationshipDescriptor,
        related_id: &str,
    ) -> Result<(), RegistryError>;

    /// Replace the full membership of a to-many relationship.
    fn sync(
        &self,
        resource_id: &str,
        relationship: &RelationshipDescriptor,
        related_ids: &[String],
    ) -> Result<(), RegistryError>;

    /// Remove the given members from a to-many relationship.
    fn detach(
        &self,
        resource_id: &str,
        relationship: &RelationshipDescriptor,
        related_ids: &[String],
    ) -> Result<(), RegistryError>;
}

impl RelationshipDescriptor {
    pub fn to_one(name: impl Into<String>, related_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            related_type: related_type.into(),
            kind: RelationshipKind::ToOne,
        }
    }

    pub fn to_many(name: impl Into<String>, related_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            related_type: related_type.into(),
            kind: RelationshipKind::ToMany,
        }
    }

    pub fn related_ids(
        &self,
        store: &dyn RelationshipStore,
        resource_id: &str,
    ) -> Result<Vec<String>, RegistryError> {
        store.related_ids(resource_id, self)
    }

    /// Associate is only meaningful for to-one relationships.
    pub fn associate(
        &self,
        store: &dyn RelationshipStore,
        resource_id: &str,
        related_id: &str,
    ) -> Result<(), RegistryError> {
        self.require_kind("associate", RelationshipKind::ToOne)?;
        store.associate(resource_id, self, related_id)
    }

    /// Sync replaces the membership of a to-many relationship.
    pub fn sync(
        &self,
        store: &dyn RelationshipStore,
        resource_id: &str,
        related_ids: &[String],
    ) -> Result<(), RegistryError> {
        self.require_kind("sync", RelationshipKind::ToMany)?;
        store.sync(resource_id, self, related_ids)
    }

    /// Detach removes members from a to-many relationship.
    pub fn detach(
        &self,
        store: &dyn RelationshipStore,
        resource_id: &str,
        related_ids: &[String],
    ) -> Result<(), RegistryError> {
        self.require_kind("detach", RelationshipKind::ToMany)?;
        store.detach(resource_id, self, related_ids)
    }

    fn require_kind(
        &self,
        operation: &'static str,
        expected: RelationshipKind,
    ) -> Result<(), RegistryError> {
        if self.kind == expected {
            Ok(())
        } else {
            Err(RegistryError::KindMismatch {
                operation,
                kind: self.kind,
                name: self.name.clone(),
            })
        }
    }
}

/// A named entity kind exposed through the API.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceType {
    /// The wire-level `type` member, e.g. `"projects"`.
    pub name: String,
    /// Backing table/collection name.
    pub table: String,
    /// Attribute names exposed through the API.
    pub attributes: Vec<String>,
    /// Per-attribute validation rule expressions, consumed by the host's
    /// validator.
    pub validation_rules: HashMap<String, String>,
    /// Column holding the owning user id.
    pub owner_key: String,
    /// Relationship names included on every full resource object.
    pub default_relationships: Vec<String>,
    /// Whether instances of this type are their own owner (e.g. users).
    pub is_self_owned: bool,
    relationships: HashMap<String, RelationshipDescriptor>,
}

impl ResourceType {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            attributes: Vec::new(),
            validation_rules: HashMap::new(),
            owner_key: "user_id".to_string(),
            default_relationships: Vec::new(),
            is_self_owned: false,
            relationships: HashMap::new(),
        }
    }

    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_validation_rule(mut self, field: impl Into<String>, rule: impl Into<String>) -> Self {
        self.validation_rules.insert(field.into(), rule.into());
        self
    }

    pub fn with_owner_key(mut self, owner_key: impl Into<String>) -> Self {
        self.owner_key = owner_key.into();
        self
    }

    pub fn self_owned(mut self) -> Self {
        self.is_self_owned = true;
        self
    }

    /// Declare a relationship and expose it on full resource objects.
    pub fn with_default_relationship(mut self, descriptor: RelationshipDescriptor) -> Self {
        self.default_relationships.push(descriptor.name.clone());
        self.relationships.insert(descriptor.name.clone(), descriptor);
        self
    }

    /// Declare a relationship without including it by default.
    pub fn with_relationship(mut self, descriptor: RelationshipDescriptor) -> Self {
        self.relationships.insert(descriptor.name.clone(), descriptor);
        self
    }

    pub fn relationship(&self, name: &str) -> Result<&RelationshipDescriptor, RegistryError> {
        self.relationships
            .get(name)
            .ok_or_else(|| RegistryError::UnknownRelationship {
                resource_type: self.name.clone(),
                name: name.to_string(),
            })
    }
}

/// All resource types known to the API, keyed by wire-level type name.
#[derive(Debug, Default)]
pub struct ResourceTypeRegistry {
    types: HashMap<String, ResourceType>,
}

impl ResourceTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, resource_type: ResourceType) {
        self.types.insert(resource_type.name.clone(), resource_type);
    }

    pub fn get(&self, name: &str) -> Result<&ResourceType, RegistryError> {
        self.types
            .get(name)
            .ok_or_else(|| RegistryError::UnknownType(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }
}
