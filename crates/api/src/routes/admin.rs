//! Route definitions for the `/admin/users` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// Permissions are enforced by handler extractors.
///
/// ```text
/// GET    /users                -> list_users     (view-users)
/// POST   /users                -> create_user    (edit-users)
/// GET    /users/{id}           -> get_user       (view-users)
/// PUT    /users/{id}           -> update_user    (edit-users)
/// DELETE /users/{id}           -> delete_user    (delete-users)
/// POST   /users/bulk-delete    -> bulk_delete    (delete-users)
/// POST   /users/bulk-action    -> bulk_action    (delete-users)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/bulk-delete", post(users::bulk_delete))
        .route("/users/bulk-action", post(users::bulk_action))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
}
