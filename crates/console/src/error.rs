use serde::Deserialize;

/// Failures talking to the API or setting the console up.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("{message} (HTTP {status})")]
    Status {
        status: u16,
        code: String,
        message: String,
        field: Option<String>,
    },

    #[error("Could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Error body returned by the API: `{error, code, field?}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: String,
    pub code: String,
    #[serde(default)]
    pub field: Option<String>,
}

impl ConsoleError {
    /// Build a [`ConsoleError::Status`] from a failed response body, falling
    /// back to the raw text when it is not the API's JSON error shape.
    pub(crate) fn from_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(api) => ConsoleError::Status {
                status,
                code: api.code,
                message: api.error,
                field: api.field,
            },
            Err(_) => ConsoleError::Status {
                status,
                code: "HTTP_ERROR".to_string(),
                message: body.trim().to_string(),
                field: None,
            },
        }
    }
}
