//! Seams between the evaluator and the host's user/data models.
//!
//! The host implements these traits over its own model types; the evaluator
//! only ever sees trait objects, so it stays independent of any ORM.

use crate::role::Role;

/// Anything that carries a role set. Users implement it directly; resources
/// owned by a user expose their owner through it.
pub trait RoleHolder {
    fn roles(&self) -> &[Role];
}

/// The authenticated user an access check runs for.
pub trait Principal: RoleHolder {
    fn id(&self) -> &str;

    /// Whether this user holds the named permission (route-name shaped,
    /// e.g. `projects.update`).
    fn can(&self, action: &str) -> bool;

    /// Whether this user owns the given resource.
    fn owns(&self, resource: &dyn Resource) -> bool;
}

/// A resource instance an access check targets.
pub trait Resource {
    /// Wire-level resource type name, e.g. `"projects"`; used to look the
    /// type up in the registry.
    fn type_name(&self) -> &str;

    fn id(&self) -> &str;

    /// The resource owner's role set, when the data layer resolved one.
    fn owner(&self) -> Option<&dyn RoleHolder>;

    /// The resource's own role set; consulted instead of [`Resource::owner`]
    /// when the registry marks the type as self-owned.
    fn as_role_holder(&self) -> Option<&dyn RoleHolder> {
        None
    }
}
