//! Route definitions for role and permission management.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::access_control;
use crate::state::AppState;

/// Routes mounted at `/admin`. All require the `Super Admin` role.
///
/// ```text
/// GET    /access-control              -> overview
/// POST   /roles                       -> create_role
/// POST   /roles/{id}/permissions      -> grant_permission
/// POST   /permissions                 -> create_permission
/// POST   /assign-role                 -> assign_role
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/access-control", get(access_control::overview))
        .route("/roles", post(access_control::create_role))
        .route(
            "/roles/{id}/permissions",
            post(access_control::grant_permission),
        )
        .route("/permissions", post(access_control::create_permission))
        .route("/assign-role", post(access_control::assign_role))
}
