//! Repository for the `permissions` table.

use sqlx::PgPool;
use warden_core::types::DbId;

use crate::models::permission::Permission;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, created_at, updated_at";

/// Provides permission lookups.
pub struct PermissionRepo;

impl PermissionRepo {
    /// Insert a new permission. Duplicate names fail with `uq_permissions_name`.
    pub async fn create(pool: &PgPool, name: &str) -> Result<Permission, sqlx::Error> {
        let query = format!("INSERT INTO permissions (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Permission>(&query)
            .bind(name)
            .fetch_one(pool)
            .await
    }

    /// Find a permission by name (case-sensitive).
    pub async fn find_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<Permission>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM permissions WHERE name = $1");
        sqlx::query_as::<_, Permission>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List all permissions ordered by ID ascending.
    pub async fn list(pool: &PgPool) -> Result<Vec<Permission>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM permissions ORDER BY id ASC");
        sqlx::query_as::<_, Permission>(&query)
            .fetch_all(pool)
            .await
    }

    /// Names of every permission `user_id` holds through any of their roles.
    pub async fn names_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT p.name
             FROM user_roles ur
             JOIN role_permissions rp ON rp.role_id = ur.role_id
             JOIN permissions p ON p.id = rp.permission_id
             WHERE ur.user_id = $1
             ORDER BY p.name ASC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
