//! Repository for the `users` table.

use std::collections::BTreeMap;

use sqlx::PgPool;
use warden_core::list_query::ResolvedQuery;
use warden_core::types::DbId;

use crate::list_sql::{self, bind_values, bind_values_scalar};
use crate::models::user::{CreateUser, UpdateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, email, password_hash, is_active, email_verified_at, \
                       created_at, updated_at";

/// Provides CRUD, list and bulk operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, email, password_hash, is_active, email_verified_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(input.is_active)
            .bind(input.email_verified_at)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all users ordered by name.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users ORDER BY name ASC, id ASC");
        sqlx::query_as::<_, User>(&query).fetch_all(pool).await
    }

    /// One page of users for a resolved list query, plus the total number of
    /// matching rows across all pages.
    pub async fn list_page(
        pool: &PgPool,
        query: &ResolvedQuery,
    ) -> Result<(Vec<User>, i64), sqlx::Error> {
        let sql = list_sql::render(query, "id");

        let count_query = format!("SELECT COUNT(*)::BIGINT FROM users {}", sql.where_clause);
        let total = bind_values_scalar(sqlx::query_scalar::<_, i64>(&count_query), &sql.binds)
            .fetch_one(pool)
            .await?;

        let page_query = format!("SELECT {COLUMNS} FROM users {}", sql.page_tail());
        let rows = bind_values(sqlx::query_as::<_, User>(&page_query), &sql.binds)
            .bind(sql.limit)
            .bind(sql.offset)
            .fetch_all(pool)
            .await?;

        Ok((rows, total))
    }

    /// Update a user. Only non-`None` fields in `input` are applied;
    /// `email_verified_at: Some(None)` clears the verification.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let verified_provided = input.email_verified_at.is_some();
        let verified_value = input.email_verified_at.flatten();

        let query = format!(
            "UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                is_active = COALESCE($5, is_active),
                email_verified_at = CASE WHEN $6 THEN $7 ELSE email_verified_at END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(input.is_active)
            .bind(verified_provided)
            .bind(verified_value)
            .fetch_optional(pool)
            .await
    }

    /// Delete a user by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The subset of `ids` that exist, ascending.
    pub async fn existing_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>("SELECT id FROM users WHERE id = ANY($1) ORDER BY id")
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Delete every user in `ids` except `acting_user_id`.
    ///
    /// Returns the number of rows removed.
    pub async fn bulk_delete(
        pool: &PgPool,
        ids: &[DbId],
        acting_user_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = ANY($1) AND id <> $2")
            .bind(ids)
            .bind(acting_user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Set `is_active` on every user in `ids` except `acting_user_id`.
    ///
    /// Returns the number of rows whose flag actually changed.
    pub async fn bulk_set_active(
        pool: &PgPool,
        ids: &[DbId],
        acting_user_id: DbId,
        is_active: bool,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET is_active = $3
             WHERE id = ANY($1) AND id <> $2 AND is_active <> $3",
        )
        .bind(ids)
        .bind(acting_user_id)
        .bind(is_active)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Role names for each of `user_ids`, alphabetical per user.
    ///
    /// Users without roles are absent from the map.
    pub async fn role_names_for(
        pool: &PgPool,
        user_ids: &[DbId],
    ) -> Result<BTreeMap<DbId, Vec<String>>, sqlx::Error> {
        let rows: Vec<(DbId, String)> = sqlx::query_as(
            "SELECT ur.user_id, r.name
             FROM user_roles ur
             JOIN roles r ON r.id = ur.role_id
             WHERE ur.user_id = ANY($1)
             ORDER BY ur.user_id, r.name",
        )
        .bind(user_ids)
        .fetch_all(pool)
        .await?;

        let mut map: BTreeMap<DbId, Vec<String>> = BTreeMap::new();
        for (user_id, role) in rows {
            map.entry(user_id).or_default().push(role);
        }
        Ok(map)
    }
}
