//! Shared response envelope types for API handlers.
//!
//! Single-resource responses use a `{ "data": ... }` envelope. List endpoints
//! return a [`PageResult`](warden_core::list_query::PageResult) directly,
//! which carries `data` alongside `meta`, `links` and `filters`.

use serde::Serialize;
use warden_core::bulk::BulkAction;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Outcome of a bulk user action.
#[derive(Debug, Serialize)]
pub struct BulkOutcome {
    pub action: BulkAction,
    /// Rows deleted or whose active flag changed.
    pub affected: u64,
    /// Whether the caller's own id was dropped from the request.
    pub skipped_self: bool,
    pub message: &'static str,
}
