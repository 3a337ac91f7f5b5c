//! Repository for the `roles` table and its assignment tables.

use sqlx::PgPool;
use warden_core::types::DbId;

use crate::models::role::{Role, RoleWithPermissions};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, created_at, updated_at";

/// Provides role lookups and role assignment.
pub struct RoleRepo;

impl RoleRepo {
    /// Insert a new role. Duplicate names fail with `uq_roles_name`.
    pub async fn create(pool: &PgPool, name: &str) -> Result<Role, sqlx::Error> {
        let query = format!("INSERT INTO roles (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Role>(&query)
            .bind(name)
            .fetch_one(pool)
            .await
    }

    /// Find a role by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE id = $1");
        sqlx::query_as::<_, Role>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a role by name (case-sensitive).
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE name = $1");
        sqlx::query_as::<_, Role>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List all roles with their permission names, ordered by role ID.
    pub async fn list_with_permissions(
        pool: &PgPool,
    ) -> Result<Vec<RoleWithPermissions>, sqlx::Error> {
        let rows: Vec<(DbId, String, Option<String>)> = sqlx::query_as(
            "SELECT r.id, r.name, p.name
             FROM roles r
             LEFT JOIN role_permissions rp ON rp.role_id = r.id
             LEFT JOIN permissions p ON p.id = rp.permission_id
             ORDER BY r.id ASC, p.name ASC",
        )
        .fetch_all(pool)
        .await?;

        let mut roles: Vec<RoleWithPermissions> = Vec::new();
        for (id, name, permission) in rows {
            if roles.last().map(|r| r.id) != Some(id) {
                roles.push(RoleWithPermissions {
                    id,
                    name,
                    permissions: Vec::new(),
                });
            }
            if let (Some(permission), Some(role)) = (permission, roles.last_mut()) {
                role.permissions.push(permission);
            }
        }
        Ok(roles)
    }

    /// Give `role_id` to `user_id`. Returns `false` if it was already held.
    pub async fn assign_to_user(
        pool: &PgPool,
        user_id: DbId,
        role_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(role_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Grant `permission_id` to `role_id`. Returns `false` if already granted.
    pub async fn give_permission(
        pool: &PgPool,
        role_id: DbId,
        permission_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO role_permissions (role_id, permission_id) VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(role_id)
        .bind(permission_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Names of the roles held by `user_id`, alphabetical.
    pub async fn names_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT r.name
             FROM user_roles ur
             JOIN roles r ON r.id = ur.role_id
             WHERE ur.user_id = $1
             ORDER BY r.name ASC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
