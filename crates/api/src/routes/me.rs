//! Route definitions for the acting user.

use axum::routing::get;
use axum::Router;

use crate::handlers::me;
use crate::state::AppState;

/// Routes mounted at `/me`. Any authenticated user.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(me::me))
        .route("/navigation", get(me::navigation))
}
