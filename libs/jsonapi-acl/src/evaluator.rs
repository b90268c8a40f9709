//! The access-control decision engine.
//!
//! Gate order per access attempt: permission gate, then ownership gate. Each
//! gate is individually switched by [`AclConfig`]; a disabled gate always
//! passes. Failures are reported as JSON:API error objects built from the
//! configured message templates.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use jsonapi_core::error::{from_template, ErrorObject};
use jsonapi_core::registry::ResourceTypeRegistry;

use crate::config::AclConfig;
use crate::principal::{Principal, Resource, RoleHolder};
use crate::role::highest_role_hierarchy;

const DEFAULT_TEMPLATE_STATUS: u16 = 403;
const DEFAULT_TEMPLATE_TITLE: &str = "Forbidden";
const DEFAULT_TEMPLATE_DETAIL: &str = "An error occurred";

/// Route-name verbs recognized by [`related_permission_name`], in match
/// order.
const ROUTE_VERBS: [&str; 5] = ["index", "view", "store", "update", "delete"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AclError {
    #[error("no recognized verb in route name `{0}`")]
    InvalidRouteName(String),
}

pub struct AccessControlEvaluator {
    config: AclConfig,
    registry: Arc<ResourceTypeRegistry>,
}

impl AccessControlEvaluator {
    pub fn new(config: AclConfig, registry: Arc<ResourceTypeRegistry>) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &AclConfig {
        &self.config
    }

    /// Run the permission gate, then the ownership gate, returning the first
    /// failing gate's errors. An empty list means access is granted. The
    /// `check_access` master switch disables both gates at once.
    pub fn access_check(
        &self,
        route_name: &str,
        user: &dyn Principal,
        resource: &dyn Resource,
    ) -> Vec<ErrorObject> {
        if !self.config.check_access {
            return Vec::new();
        }

        let errors = self.permission_check(route_name, user);
        if !errors.is_empty() {
            return errors;
        }

        let errors = self.ownership_check(user, resource);
        if !errors.is_empty() {
            return errors;
        }

        Vec::new()
    }

    /// Passes when permission checking is disabled or the user holds the
    /// permission named after the route.
    pub fn permission_check(&self, route_name: &str, user: &dyn Principal) -> Vec<ErrorObject> {
        if !self.config.check_permission {
            return Vec::new();
        }

        if user.can(route_name) {
            return Vec::new();
        }

        debug!(route = route_name, user = user.id(), "permission check failed");
        vec![self.template_error("check_permission_fail")]
    }

    /// Passes when ownership checking is disabled, the user owns the
    /// resource, or the user's role hierarchy overrides the owner's.
    pub fn ownership_check(&self, user: &dyn Principal, resource: &dyn Resource) -> Vec<ErrorObject> {
        if !self.config.check_ownership {
            return Vec::new();
        }

        if user.owns(resource) {
            return Vec::new();
        }

        if let Some(owner) = self.resolve_owner(resource) {
            if self.role_hierarchy_override(user, owner) {
                debug!(
                    user = user.id(),
                    resource = resource.id(),
                    "ownership check passed via role hierarchy override"
                );
                return Vec::new();
            }
        }

        debug!(
            user = user.id(),
            resource_type = resource.type_name(),
            resource = resource.id(),
            "ownership check failed"
        );
        vec![self.template_error("check_ownership_fail")]
    }

    /// Self-owned types answer for themselves; everything else defers to the
    /// owner association resolved by the data layer.
    fn resolve_owner<'a>(&self, resource: &'a dyn Resource) -> Option<&'a dyn RoleHolder> {
        let is_self_owned = self
            .registry
            .get(resource.type_name())
            .map(|t| t.is_self_owned)
            .unwrap_or(false);

        if is_self_owned {
            resource.as_role_holder()
        } else {
            resource.owner()
        }
    }

    /// A user's highest hierarchical role must be strictly above the owner's
    /// for the override to apply, and only when the hierarchy is enabled.
    fn role_hierarchy_override(&self, user: &dyn RoleHolder, owner: &dyn RoleHolder) -> bool {
        if !self.config.use_role_hierarchy {
            return false;
        }
        highest_role_hierarchy(user.roles()) > highest_role_hierarchy(owner.roles())
    }

    fn template_error(&self, key: &str) -> ErrorObject {
        from_template(
            &self.config.error_messages,
            key,
            DEFAULT_TEMPLATE_STATUS,
            DEFAULT_TEMPLATE_TITLE,
            DEFAULT_TEMPLATE_DETAIL,
        )
    }
}

/// The permission name guarding a relationship touched during `route_name`.
///
/// Writing a project's owner during `projects.store` requires
/// `projects.relationships.owner.update`; `store` maps to `update`, every
/// other verb keeps its name. Route names that are already
/// relationship-scoped are returned unchanged.
pub fn related_permission_name(route_name: &str, relationship_name: &str) -> Result<String, AclError> {
    if route_name.contains("relationships") {
        return Ok(route_name.to_string());
    }

    let verb = ROUTE_VERBS
        .iter()
        .filter_map(|verb| route_name.find(verb).map(|pos| (pos, *verb)))
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, verb)| verb)
        .ok_or_else(|| AclError::InvalidRouteName(route_name.to_string()))?;

    let route_prefix = route_name.replace(&format!(".{verb}"), "");
    let mapped_verb = if verb == "store" { "update" } else { verb };

    Ok(format!(
        "{route_prefix}.relationships.{relationship_name}.{mapped_verb}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AclConfig;
    use crate::role::Role;
    use jsonapi_core::registry::{ResourceType, ResourceTypeRegistry};

    struct TestUser {
        id: String,
        roles: Vec<Role>,
        permissions: Vec<String>,
        owned: Vec<String>,
    }

    impl RoleHolder for TestUser {
        fn roles(&self) -> &[Role] {
            &self.roles
        }
    }

    impl Principal for TestUser {
        fn id(&self) -> &str {
            &self.id
        }

        fn can(&self, action: &str) -> bool {
            self.permissions.iter().any(|p| p == action)
        }

        fn owns(&self, resource: &dyn Resource) -> bool {
            self.owned.iter().any(|id| id == resource.id())
        }
    }

    struct TestProject {
        id: String,
        owner_roles: Option<Vec<Role>>,
    }

    impl Resource for TestProject {
        fn type_name(&self) -> &str {
            "projects"
        }

        fn id(&self) -> &str {
            &self.id
        }

        fn owner(&self) -> Option<&dyn RoleHolder> {
            self.owner_roles.as_ref().map(|_| self as &dyn RoleHolder)
        }
    }

    impl RoleHolder for TestProject {
        fn roles(&self) -> &[Role] {
            self.owner_roles.as_deref().unwrap_or(&[])
        }
    }

    fn registry() -> Arc<ResourceTypeRegistry> {
        let mut registry = ResourceTypeRegistry::new();
        registry.register(ResourceType::new("projects", "projects"));
        registry.register(ResourceType::new("users", "users").self_owned());
        Arc::new(registry)
    }

    fn user(roles: Vec<Role>, permissions: Vec<&str>, owned: Vec<&str>) -> TestUser {
        TestUser {
            id: "1".to_string(),
            roles,
            permissions: permissions.into_iter().map(String::from).collect(),
            owned: owned.into_iter().map(String::from).collect(),
        }
    }

    fn acl(check_permission: bool, check_ownership: bool, use_role_hierarchy: bool) -> AclConfig {
        AclConfig {
            check_access: true,
            check_permission,
            check_ownership,
            use_role_hierarchy,
            ..AclConfig::default()
        }
    }

    #[test]
    fn disabled_gates_always_pass() {
        let evaluator = AccessControlEvaluator::new(acl(false, false, false), registry());
        let user = user(vec![], vec![], vec![]);
        let project = TestProject { id: "9".to_string(), owner_roles: None };
        assert!(evaluator.access_check("projects.update", &user, &project).is_empty());
    }

    #[test]
    fn master_switch_off_skips_every_gate() {
        let config = AclConfig {
            check_access: false,
            check_permission: true,
            check_ownership: true,
            ..AclConfig::default()
        };
        let evaluator = AccessControlEvaluator::new(config, registry());
        let user = user(vec![], vec![], vec![]);
        let project = TestProject { id: "9".to_string(), owner_roles: None };
        assert!(evaluator.access_check("projects.update", &user, &project).is_empty());
    }

    #[test]
    fn permission_gate_denies_with_configured_detail() {
        let evaluator = AccessControlEvaluator::new(acl(true, false, false), registry());
        let user = user(vec![], vec!["projects.view"], vec![]);
        let project = TestProject { id: "9".to_string(), owner_roles: None };

        let errors = evaluator.access_check("projects.update", &user, &project);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].status, 403);
        assert_eq!(
            errors[0].detail.as_deref(),
            Some("User does not have permission to perform this action on the target resource")
        );
    }

    #[test]
    fn permission_gate_passes_for_held_permission() {
        let evaluator = AccessControlEvaluator::new(acl(true, false, false), registry());
        let user = user(vec![], vec!["projects.update"], vec![]);
        assert!(evaluator.permission_check("projects.update", &user).is_empty());
    }

    #[test]
    fn ownership_gate_passes_for_owner() {
        let evaluator = AccessControlEvaluator::new(acl(false, true, false), registry());
        let user = user(vec![], vec![], vec!["9"]);
        let project = TestProject { id: "9".to_string(), owner_roles: None };
        assert!(evaluator.ownership_check(&user, &project).is_empty());
    }

    #[test]
    fn ownership_failure_without_hierarchy_is_denied_regardless_of_roles() {
        let evaluator = AccessControlEvaluator::new(acl(false, true, false), registry());
        let user = user(vec![Role::hierarchical("admin", 9)], vec![], vec![]);
        let project = TestProject {
            id: "9".to_string(),
            owner_roles: Some(vec![Role::hierarchical("member", 1)]),
        };

        let errors = evaluator.ownership_check(&user, &project);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].status, 403);
        assert_eq!(errors[0].detail.as_deref(), Some("User does not own target resource"));
    }

    #[test]
    fn higher_role_overrides_failed_ownership_when_enabled() {
        let evaluator = AccessControlEvaluator::new(acl(false, true, true), registry());
        let admin = user(vec![Role::hierarchical("admin", 3)], vec![], vec![]);
        let project = TestProject {
            id: "9".to_string(),
            owner_roles: Some(vec![Role::hierarchical("member", 1)]),
        };
        assert!(evaluator.ownership_check(&admin, &project).is_empty());
    }

    #[test]
    fn equal_hierarchy_does_not_override() {
        let evaluator = AccessControlEvaluator::new(acl(false, true, true), registry());
        let peer = user(vec![Role::hierarchical("member", 1)], vec![], vec![]);
        let project = TestProject {
            id: "9".to_string(),
            owner_roles: Some(vec![Role::hierarchical("member", 1)]),
        };
        assert_eq!(evaluator.ownership_check(&peer, &project).len(), 1);
    }

    #[test]
    fn unresolvable_owner_fails_the_override() {
        let evaluator = AccessControlEvaluator::new(acl(false, true, true), registry());
        let admin = user(vec![Role::hierarchical("admin", 3)], vec![], vec![]);
        let project = TestProject { id: "9".to_string(), owner_roles: None };
        assert_eq!(evaluator.ownership_check(&admin, &project).len(), 1);
    }

    #[test]
    fn self_owned_type_uses_its_own_roles() {
        struct TargetUser {
            roles: Vec<Role>,
        }
        impl RoleHolder for TargetUser {
            fn roles(&self) -> &[Role] {
                &self.roles
            }
        }
        impl Resource for TargetUser {
            fn type_name(&self) -> &str {
                "users"
            }
            fn id(&self) -> &str {
                "2"
            }
            fn owner(&self) -> Option<&dyn RoleHolder> {
                None
            }
            fn as_role_holder(&self) -> Option<&dyn RoleHolder> {
                Some(self)
            }
        }

        let evaluator = AccessControlEvaluator::new(acl(false, true, true), registry());
        let admin = user(vec![Role::hierarchical("admin", 3)], vec![], vec![]);
        let target = TargetUser {
            roles: vec![Role::hierarchical("member", 1)],
        };
        assert!(evaluator.ownership_check(&admin, &target).is_empty());
    }

    #[test]
    fn related_permission_maps_store_to_update() {
        assert_eq!(
            related_permission_name("projects.store", "owner").unwrap(),
            "projects.relationships.owner.update"
        );
    }

    #[test]
    fn related_permission_keeps_other_verbs() {
        assert_eq!(
            related_permission_name("projects.delete", "tasks").unwrap(),
            "projects.relationships.tasks.delete"
        );
        assert_eq!(
            related_permission_name("projects.view", "owner").unwrap(),
            "projects.relationships.owner.view"
        );
    }

    #[test]
    fn relationship_scoped_route_names_pass_through() {
        assert_eq!(
            related_permission_name("tasks.relationships.owner.update", "owner").unwrap(),
            "tasks.relationships.owner.update"
        );
    }

    #[test]
    fn unrecognized_verb_is_an_error() {
        assert_eq!(
            related_permission_name("projects.frobnicate", "owner"),
            Err(AclError::InvalidRouteName("projects.frobnicate".to_string()))
        );
    }
}
