//! # jsonapi-acl
//!
//! Per-resource access control for the JSON:API gateway: a permission gate,
//! an ownership gate with a role-hierarchy override, and the mapping from
//! route names to relationship-scoped permission names.
//!
//! An access decision is a list of JSON:API error objects; an empty list
//! means access is granted. Gates short-circuit: the first failing gate's
//! errors are returned and no later gate runs.

pub mod config;
pub mod evaluator;
pub mod principal;
pub mod role;

pub use config::{AclConfig, JwtConfig};
pub use evaluator::{related_permission_name, AccessControlEvaluator, AclError};
pub use principal::{Principal, Resource, RoleHolder};
pub use role::{highest_role_hierarchy, Role};
