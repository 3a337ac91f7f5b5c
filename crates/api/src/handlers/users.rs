//! Handlers for the `/admin/users` resource: the paginated data table,
//! single-user CRUD and bulk actions.
//!
//! Every handler is gated by a permission extractor from [`rbac`](crate::middleware::rbac).

use std::collections::BTreeSet;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;
use warden_core::bulk::{exclude_acting_user, BulkAction, BulkGuard};
use warden_core::error::CoreError;
use warden_core::list_query::PageResult;
use warden_core::types::{nullable_field, DbId, Timestamp};
use warden_core::users::{normalize_email, validate_password_strength, USERS_TABLE};
use warden_db::models::user::{CreateUser, UpdateUser, User, UserResponse};
use warden_db::repositories::{RoleRepo, UserRepo};

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{DeleteUsers, EditUsers, RequirePermission, ViewUsers};
use crate::query::ListQuery;
use crate::response::{BulkOutcome, DataResponse};
use crate::state::AppState;

/// Path that pagination links point at.
pub const USERS_PATH: &str = "/api/v1/admin/users";

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 255, message = "The name field is required."))]
    pub name: String,
    #[validate(
        email(message = "The email must be a valid email address."),
        length(max = 255, message = "The email may not be greater than 255 characters.")
    )]
    pub email: String,
    pub password: String,
    pub email_verified_at: Option<Timestamp>,
    pub is_active: Option<bool>,
}

/// Request body for `PUT /admin/users/{id}`. A blank `password` keeps the
/// current one.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 255, message = "The name field is required."))]
    pub name: String,
    #[validate(
        email(message = "The email must be a valid email address."),
        length(max = 255, message = "The email may not be greater than 255 characters.")
    )]
    pub email: String,
    pub password: Option<String>,
    /// Missing keeps the current value; `null` clears it.
    #[serde(default, deserialize_with = "nullable_field")]
    pub email_verified_at: Option<Option<Timestamp>>,
    pub is_active: Option<bool>,
}

/// Request body for `POST /admin/users/bulk-delete`.
#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<DbId>,
}

/// Request body for `POST /admin/users/bulk-action`.
#[derive(Debug, Deserialize)]
pub struct BulkActionRequest {
    pub action: String,
    pub ids: Vec<DbId>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/users
///
/// One page of users filtered, searched and sorted per the list query string.
pub async fn list_users(
    State(state): State<AppState>,
    _gate: RequirePermission<ViewUsers>,
    query: ListQuery,
) -> AppResult<Json<PageResult<UserResponse>>> {
    let filters = query.filter_state(&USERS_TABLE);
    let resolved = USERS_TABLE.resolve(&filters)?;

    let (users, total) = UserRepo::list_page(&state.pool, &resolved).await?;
    let ids: Vec<DbId> = users.iter().map(|u| u.id).collect();
    let mut roles = UserRepo::role_names_for(&state.pool, &ids).await?;

    let data: Vec<UserResponse> = users
        .into_iter()
        .map(|u| {
            let user_roles = roles.remove(&u.id).unwrap_or_default();
            UserResponse::from_user(u, user_roles)
        })
        .collect();

    tracing::debug!(
        total,
        page = filters.page,
        per_page = filters.per_page,
        "Listed users"
    );

    let total = u64::try_from(total).unwrap_or(0);
    Ok(Json(PageResult::new(data, total, &filters, USERS_PATH)))
}

/// POST /api/v1/admin/users
///
/// Create a user. Returns the new user with 201 Created.
pub async fn create_user(
    State(state): State<AppState>,
    RequirePermission(admin, ..): RequirePermission<EditUsers>,
    Json(mut input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    input.name = input.name.trim().to_string();
    input.email = normalize_email(&input.email);
    input.validate()?;
    validate_password_strength(&input.password)
        .map_err(|msg| CoreError::field("password", msg))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name: input.name,
            email: input.email,
            password_hash,
            is_active: input.is_active.unwrap_or(true),
            email_verified_at: input.email_verified_at,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, created_by = admin.user_id, "User created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from_user(user, Vec::new()),
        }),
    ))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    _gate: RequirePermission<ViewUsers>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = find_user(&state, id).await?;
    let response = user_to_response(&state, user).await?;
    Ok(Json(DataResponse { data: response }))
}

/// PUT /api/v1/admin/users/{id}
///
/// Update name, email, verification time, active flag and optionally the
/// password.
pub async fn update_user(
    State(state): State<AppState>,
    RequirePermission(admin, ..): RequirePermission<EditUsers>,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateUserRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    input.name = input.name.trim().to_string();
    input.email = normalize_email(&input.email);
    input.validate()?;

    if id == admin.user_id && input.is_active == Some(false) {
        return Err(CoreError::field(
            "is_active",
            BulkGuard::OnlySelf(BulkAction::Deactivate).to_string(),
        )
        .into());
    }

    let password_hash = match input.password.as_deref().map(str::trim) {
        Some(password) if !password.is_empty() => {
            validate_password_strength(password)
                .map_err(|msg| CoreError::field("password", msg))?;
            let hashed = hash_password(password)
                .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
            Some(hashed)
        }
        _ => None,
    };

    let update = UpdateUser {
        name: Some(input.name),
        email: Some(input.email),
        password_hash,
        is_active: input.is_active,
        email_verified_at: input.email_verified_at,
    };

    let user = UserRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    tracing::info!(user_id = id, updated_by = admin.user_id, "User updated");

    let response = user_to_response(&state, user).await?;
    Ok(Json(DataResponse { data: response }))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Delete a single user. The acting user cannot delete themselves.
pub async fn delete_user(
    State(state): State<AppState>,
    RequirePermission(admin, ..): RequirePermission<DeleteUsers>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(CoreError::Validation(
            BulkGuard::OnlySelf(BulkAction::Delete).to_string(),
        )
        .into());
    }

    if UserRepo::delete(&state.pool, id).await? {
        tracing::info!(user_id = id, deleted_by = admin.user_id, "User deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "User", id }))
    }
}

/// POST /api/v1/admin/users/bulk-delete
pub async fn bulk_delete(
    State(state): State<AppState>,
    RequirePermission(admin, ..): RequirePermission<DeleteUsers>,
    Json(input): Json<BulkDeleteRequest>,
) -> AppResult<Json<DataResponse<BulkOutcome>>> {
    let outcome = run_bulk(&state, &admin, BulkAction::Delete, input.ids).await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// POST /api/v1/admin/users/bulk-action
///
/// `action` is one of `delete`, `activate` or `deactivate`.
pub async fn bulk_action(
    State(state): State<AppState>,
    RequirePermission(admin, ..): RequirePermission<DeleteUsers>,
    Json(input): Json<BulkActionRequest>,
) -> AppResult<Json<DataResponse<BulkOutcome>>> {
    let action: BulkAction = input
        .action
        .parse()
        .map_err(|msg: String| CoreError::field("action", msg))?;
    let outcome = run_bulk(&state, &admin, action, input.ids).await?;
    Ok(Json(DataResponse { data: outcome }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Validate the id list, drop the acting user and apply `action`.
async fn run_bulk(
    state: &AppState,
    admin: &AuthUser,
    action: BulkAction,
    ids: Vec<DbId>,
) -> AppResult<BulkOutcome> {
    let requested: BTreeSet<DbId> = ids.into_iter().collect();
    if requested.is_empty() {
        return Err(CoreError::field("ids", BulkGuard::NothingSelected.to_string()).into());
    }

    let requested: Vec<DbId> = requested.into_iter().collect();
    let existing = UserRepo::existing_ids(&state.pool, &requested).await?;
    if existing.len() != requested.len() {
        return Err(CoreError::field("ids", "The selected ids are invalid.").into());
    }

    let (targets, skipped_self) = exclude_acting_user(requested, &admin.user_id);
    if targets.is_empty() {
        return Err(CoreError::field("ids", BulkGuard::OnlySelf(action).to_string()).into());
    }
    let targets: Vec<DbId> = targets.into_iter().collect();

    let affected = match action {
        BulkAction::Delete => UserRepo::bulk_delete(&state.pool, &targets, admin.user_id).await?,
        BulkAction::Activate => {
            UserRepo::bulk_set_active(&state.pool, &targets, admin.user_id, true).await?
        }
        BulkAction::Deactivate => {
            UserRepo::bulk_set_active(&state.pool, &targets, admin.user_id, false).await?
        }
    };

    tracing::info!(
        action = %action,
        affected,
        skipped_self,
        acting_user = admin.user_id,
        "Bulk user action applied"
    );

    Ok(BulkOutcome {
        action,
        affected,
        skipped_self,
        message: action.success_message(),
    })
}

async fn find_user(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))
}

/// Convert a [`User`] row into a safe [`UserResponse`] with its role names.
async fn user_to_response(state: &AppState, user: User) -> AppResult<UserResponse> {
    let roles = RoleRepo::names_for_user(&state.pool, user.id).await?;
    Ok(UserResponse::from_user(user, roles))
}
