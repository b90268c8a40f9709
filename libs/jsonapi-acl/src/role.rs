use serde::{Deserialize, Serialize};

/// A named role with an optional position in the role hierarchy.
///
/// Roles with `is_hierarchical: false` never participate in hierarchy
/// comparisons, whatever their `hierarchy` value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    pub hierarchy: i64,
    pub is_hierarchical: bool,
}

impl Role {
    pub fn hierarchical(name: impl Into<String>, hierarchy: i64) -> Self {
        Self {
            name: name.into(),
            hierarchy,
            is_hierarchical: true,
        }
    }

    pub fn flat(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hierarchy: 0,
            is_hierarchical: false,
        }
    }
}

/// The highest `hierarchy` value among a user's hierarchical roles, or 0
/// when none of them are hierarchical.
pub fn highest_role_hierarchy(roles: &[Role]) -> i64 {
    roles
        .iter()
        .filter(|role| role.is_hierarchical)
        .map(|role| role.hierarchy)
        .fold(0, i64::max)
}
