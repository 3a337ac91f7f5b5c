//! Well-known role and permission names.
//!
//! These must match the seed rows in `20260301000003_seed_roles_permissions.sql`.

pub const ROLE_SUPER_ADMIN: &str = "Super Admin";
pub const ROLE_ADMIN: &str = "Admin";
pub const ROLE_PRO: &str = "Pro";
pub const ROLE_FREE: &str = "Free";

pub const PERM_ACCESS_SETTINGS: &str = "access-settings";
pub const PERM_VIEW_USERS: &str = "view-users";
pub const PERM_EDIT_USERS: &str = "edit-users";
pub const PERM_DELETE_USERS: &str = "delete-users";

/// Maximum length of a role or permission name.
pub const MAX_NAME_LENGTH: usize = 125;

/// Validate a new role or permission name.
///
/// Names are trimmed; the trimmed name must be non-empty and at most
/// [`MAX_NAME_LENGTH`] characters.
pub fn validate_name(name: &str) -> Result<String, String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("The name field is required.".to_string());
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(format!(
            "The name may not be greater than {MAX_NAME_LENGTH} characters."
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed() {
        assert_eq!(validate_name("  Editor ").unwrap(), "Editor");
    }

    #[test]
    fn blank_name_rejected() {
        assert!(validate_name("   ").is_err());
    }

    #[test]
    fn overlong_name_rejected() {
        let name = "x".repeat(MAX_NAME_LENGTH + 1);
        let err = validate_name(&name).unwrap_err();
        assert!(err.contains("125"));
    }
}
