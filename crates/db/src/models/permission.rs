//! Permission entity model.

use serde::Serialize;
use sqlx::FromRow;
use warden_core::types::{DbId, Timestamp};

/// A permission row from the `permissions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Permission {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
