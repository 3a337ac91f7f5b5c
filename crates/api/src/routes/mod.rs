pub mod access_control;
pub mod admin;
pub mod health;
pub mod me;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /me                                  acting user + capabilities
/// /me/navigation                       sidebar for the acting user
///
/// /admin/users                         list (data table), create
/// /admin/users/{id}                    get, update, delete
/// /admin/users/bulk-delete             delete selected (never self)
/// /admin/users/bulk-action             delete | activate | deactivate
///
/// /admin/access-control                roles, permissions, users
/// /admin/roles                         create role
/// /admin/roles/{id}/permissions        grant permission to role
/// /admin/permissions                   create permission
/// /admin/assign-role                   give a role to a user
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/me", me::router())
        .nest(
            "/admin",
            admin::router().merge(access_control::router()),
        )
}
