//! ACL and JWT error-message configuration.
//!
//! Every switch defaults to off, so a missing configuration section yields a
//! fully permissive evaluator; hosts opt in per gate.

use serde::{Deserialize, Serialize};

use jsonapi_core::error::ErrorMessages;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AclConfig {
    /// Master switch; when off no gate runs at all.
    pub check_access: bool,
    pub check_ownership: bool,
    pub check_permission: bool,
    /// Lets a strictly higher-ranked role pass a failed ownership check.
    pub use_role_hierarchy: bool,
    pub error_messages: ErrorMessages,
}

impl Default for AclConfig {
    fn default() -> Self {
        Self {
            check_access: false,
            check_ownership: false,
            check_permission: false,
            use_role_hierarchy: false,
            error_messages: ErrorMessages::per_key_detail(
                403,
                "Forbidden",
                [
                    (
                        "check_ownership_fail",
                        "User does not own target resource",
                    ),
                    (
                        "check_permission_fail",
                        "User does not have permission to perform this action on the target resource",
                    ),
                ],
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct JwtConfig {
    pub error_messages: ErrorMessages,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            error_messages: ErrorMessages::per_key_detail(
                401,
                "Unauthorised",
                [
                    ("token_not_provided", "Access token not provided."),
                    ("token_expired", "Access token is expired."),
                    ("token_invalid", "Access token is invalid."),
                    ("user_not_found", "No user for given access token."),
                ],
            ),
        }
    }
}
