//! Permission- and role-based access control extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects with 403 Forbidden when the
//! user's capabilities do not satisfy the gate, so authorization is enforced
//! at the type level in handler signatures.

use std::marker::PhantomData;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use warden_core::roles::{PERM_DELETE_USERS, PERM_EDIT_USERS, PERM_VIEW_USERS, ROLE_SUPER_ADMIN};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// A named permission gate. `PERMISSIONS` may list alternatives separated
/// by `|`; holding any one of them passes.
pub trait Gate {
    const PERMISSIONS: &'static str;
}

pub struct ViewUsers;
pub struct EditUsers;
pub struct DeleteUsers;

impl Gate for ViewUsers {
    const PERMISSIONS: &'static str = PERM_VIEW_USERS;
}

impl Gate for EditUsers {
    const PERMISSIONS: &'static str = PERM_EDIT_USERS;
}

impl Gate for DeleteUsers {
    const PERMISSIONS: &'static str = PERM_DELETE_USERS;
}

/// Requires the permission(s) named by `G`.
///
/// ```ignore
/// async fn list(RequirePermission(user, ..): RequirePermission<ViewUsers>) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequirePermission<G: Gate>(pub AuthUser, pub PhantomData<G>);

impl<G: Gate + Send + Sync> FromRequestParts<AppState> for RequirePermission<G> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        user.capabilities.require_any(G::PERMISSIONS)?;
        Ok(RequirePermission(user, PhantomData))
    }
}

/// Requires the `Super Admin` role. Rejects with 403 Forbidden otherwise.
pub struct RequireSuperAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireSuperAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        user.capabilities.require_role(ROLE_SUPER_ADMIN)?;
        Ok(RequireSuperAdmin(user))
    }
}
