//! Handlers for role and permission management.
//!
//! All handlers require the `Super Admin` role via [`RequireSuperAdmin`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use warden_core::error::CoreError;
use warden_core::roles::validate_name;
use warden_core::types::DbId;
use warden_db::models::permission::Permission;
use warden_db::models::role::{Role, RoleWithPermissions};
use warden_db::models::user::UserResponse;
use warden_db::repositories::{PermissionRepo, RoleRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireSuperAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/roles` and `POST /admin/permissions`.
#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

/// Request body for `POST /admin/assign-role`.
#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub user_id: DbId,
    pub role_name: String,
}

/// Request body for `POST /admin/roles/{id}/permissions`.
#[derive(Debug, Deserialize)]
pub struct GrantPermissionRequest {
    pub permission_name: String,
}

/// Everything the access control page renders.
#[derive(Debug, Serialize)]
pub struct AccessControlOverview {
    pub roles: Vec<RoleWithPermissions>,
    pub permissions: Vec<Permission>,
    pub users: Vec<UserResponse>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/access-control
pub async fn overview(
    State(state): State<AppState>,
    RequireSuperAdmin(_admin): RequireSuperAdmin,
) -> AppResult<Json<DataResponse<AccessControlOverview>>> {
    let roles = RoleRepo::list_with_permissions(&state.pool).await?;
    let permissions = PermissionRepo::list(&state.pool).await?;

    let users = UserRepo::list_all(&state.pool).await?;
    let ids: Vec<DbId> = users.iter().map(|u| u.id).collect();
    let mut user_roles = UserRepo::role_names_for(&state.pool, &ids).await?;
    let users = users
        .into_iter()
        .map(|u| {
            let names = user_roles.remove(&u.id).unwrap_or_default();
            UserResponse::from_user(u, names)
        })
        .collect();

    Ok(Json(DataResponse {
        data: AccessControlOverview {
            roles,
            permissions,
            users,
        },
    }))
}

/// POST /api/v1/admin/roles
pub async fn create_role(
    State(state): State<AppState>,
    RequireSuperAdmin(admin): RequireSuperAdmin,
    Json(input): Json<NameRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Role>>)> {
    let name = validate_name(&input.name).map_err(|msg| CoreError::field("name", msg))?;
    let role = RoleRepo::create(&state.pool, &name).await?;
    tracing::info!(role_id = role.id, name = %role.name, created_by = admin.user_id, "Role created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: role })))
}

/// POST /api/v1/admin/permissions
pub async fn create_permission(
    State(state): State<AppState>,
    RequireSuperAdmin(admin): RequireSuperAdmin,
    Json(input): Json<NameRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Permission>>)> {
    let name = validate_name(&input.name).map_err(|msg| CoreError::field("name", msg))?;
    let permission = PermissionRepo::create(&state.pool, &name).await?;
    tracing::info!(
        permission_id = permission.id,
        name = %permission.name,
        created_by = admin.user_id,
        "Permission created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: permission })))
}

/// POST /api/v1/admin/assign-role
///
/// Adds the role to the user's existing roles; returns the user's role names.
pub async fn assign_role(
    State(state): State<AppState>,
    RequireSuperAdmin(admin): RequireSuperAdmin,
    Json(input): Json<AssignRoleRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, input.user_id)
        .await?
        .ok_or_else(|| CoreError::field("user_id", "The selected user id is invalid."))?;
    let role = RoleRepo::find_by_name(&state.pool, input.role_name.trim())
        .await?
        .ok_or_else(|| CoreError::field("role_name", "The selected role name is invalid."))?;

    let added = RoleRepo::assign_to_user(&state.pool, user.id, role.id).await?;
    tracing::info!(
        user_id = user.id,
        role = %role.name,
        added,
        assigned_by = admin.user_id,
        "Role assigned"
    );

    let roles = RoleRepo::names_for_user(&state.pool, user.id).await?;
    Ok(Json(DataResponse {
        data: UserResponse::from_user(user, roles),
    }))
}

/// POST /api/v1/admin/roles/{id}/permissions
///
/// Grants a permission to a role; returns the role with its permissions.
pub async fn grant_permission(
    State(state): State<AppState>,
    RequireSuperAdmin(admin): RequireSuperAdmin,
    Path(role_id): Path<DbId>,
    Json(input): Json<GrantPermissionRequest>,
) -> AppResult<Json<DataResponse<RoleWithPermissions>>> {
    let role = RoleRepo::find_by_id(&state.pool, role_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Role",
            id: role_id,
        }))?;
    let permission = PermissionRepo::find_by_name(&state.pool, input.permission_name.trim())
        .await?
        .ok_or_else(|| {
            CoreError::field("permission_name", "The selected permission name is invalid.")
        })?;

    RoleRepo::give_permission(&state.pool, role.id, permission.id).await?;
    tracing::info!(
        role = %role.name,
        permission = %permission.name,
        granted_by = admin.user_id,
        "Permission granted"
    );

    let with_permissions = RoleRepo::list_with_permissions(&state.pool)
        .await?
        .into_iter()
        .find(|r| r.id == role.id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Role",
            id: role_id,
        }))?;
    Ok(Json(DataResponse {
        data: with_permissions,
    }))
}
