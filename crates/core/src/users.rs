//! User list configuration and input rules shared by the API and client.

use crate::list_query::{Column, ColumnKind, TableSpec};

/// Minimum password length on create and on password change.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Data table for `/admin/users`.
pub const USERS_TABLE: TableSpec = TableSpec {
    primary_key: "id",
    columns: &[
        Column { name: "id", kind: ColumnKind::Integer },
        Column { name: "name", kind: ColumnKind::Text },
        Column { name: "email", kind: ColumnKind::Text },
        Column { name: "is_active", kind: ColumnKind::Boolean },
        Column { name: "email_verified_at", kind: ColumnKind::Timestamp },
        Column { name: "created_at", kind: ColumnKind::Timestamp },
    ],
    searchable: &["name", "email"],
    sortable: &["id", "name", "email", "created_at", "email_verified_at"],
    filterable: &["name", "email", "is_active", "email_verified_at", "created_at"],
    default_per_page: 10,
    max_per_page: 100,
};

/// Trim and lowercase an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate that a password meets minimum strength requirements.
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "The password must be at least {MIN_PASSWORD_LENGTH} characters."
        ));
    }
    Ok(())
}
