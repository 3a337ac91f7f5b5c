//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Authenticated user plus their [`Capabilities`](warden_core::capability::Capabilities).
//! - [`rbac::RequirePermission`] -- Requires one permission (or any of a `|` list).
//! - [`rbac::RequireSuperAdmin`] -- Requires the `Super Admin` role.

pub mod auth;
pub mod rbac;
