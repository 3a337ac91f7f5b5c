//! Capability context for permission-gated rendering and authorization.
//!
//! A [`Capabilities`] value is built once per request from the acting user's
//! roles and permissions, then passed explicitly to whatever needs to ask
//! `can(..)` (navigation, action buttons, handler guards).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The set of roles and permissions held by the acting user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub roles: BTreeSet<String>,
    pub permissions: BTreeSet<String>,
}

impl Capabilities {
    pub fn new<R, P>(roles: R, permissions: P) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the user holds `permission`.
    pub fn can(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Whether the user holds any permission in a `|`-separated list
    /// (e.g. `"view-users|edit-users"`).
    pub fn can_any(&self, permissions: &str) -> bool {
        permissions
            .split('|')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .any(|p| self.can(p))
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Reject with [`CoreError::Forbidden`] unless `permission` is held.
    pub fn require(&self, permission: &str) -> Result<(), CoreError> {
        if self.can(permission) {
            Ok(())
        } else {
            Err(CoreError::Forbidden(format!(
                "Permission '{permission}' required"
            )))
        }
    }

    /// Reject unless any permission in the `|`-separated list is held.
    pub fn require_any(&self, permissions: &str) -> Result<(), CoreError> {
        if self.can_any(permissions) {
            Ok(())
        } else {
            Err(CoreError::Forbidden(format!(
                "One of '{permissions}' required"
            )))
        }
    }

    pub fn require_role(&self, role: &str) -> Result<(), CoreError> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(CoreError::Forbidden(format!("{role} role required")))
        }
    }
}
