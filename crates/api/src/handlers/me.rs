//! Handlers for the acting user's own profile and sidebar.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use warden_core::capability::Capabilities;
use warden_core::error::CoreError;
use warden_core::navigation::{build_sidebar, Sidebar};
use warden_db::models::user::UserResponse;
use warden_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// The acting user with the capability context the UI gates on.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserResponse,
    pub capabilities: Capabilities,
}

/// GET /api/v1/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<MeResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    let roles: Vec<String> = auth.capabilities.roles.iter().cloned().collect();

    Ok(Json(DataResponse {
        data: MeResponse {
            user: UserResponse::from_user(user, roles),
            capabilities: auth.capabilities,
        },
    }))
}

/// GET /api/v1/me/navigation
pub async fn navigation(auth: AuthUser) -> Json<DataResponse<Sidebar>> {
    Json(DataResponse {
        data: build_sidebar(&auth.capabilities),
    })
}
