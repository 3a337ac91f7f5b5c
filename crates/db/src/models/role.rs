//! Role entity model.

use serde::Serialize;
use sqlx::FromRow;
use warden_core::types::{DbId, Timestamp};

/// A role row from the `roles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A role together with the names of the permissions it grants.
#[derive(Debug, Clone, Serialize)]
pub struct RoleWithPermissions {
    pub id: DbId,
    pub name: String,
    pub permissions: Vec<String>,
}
