use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A validation failure attributable to a single input field, so the
    /// UI can render it next to that field.
    #[error("Validation failed on {field}: {message}")]
    FieldValidation { field: String, message: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a [`CoreError::FieldValidation`].
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::FieldValidation {
            field: field.into(),
            message: message.into(),
        }
    }
}
