use url::Url;

use crate::error::ConsoleError;

/// Console configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Base URL of the API server, without the `/api/v1` prefix.
    pub api_url: Url,
    /// Bearer token of the acting user.
    pub token: String,
    pub request_timeout_secs: u64,
}

impl ConsoleConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `WARDEN_API_URL`       | `http://localhost:3000` |
    /// | `WARDEN_TOKEN`         | required                |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                    |
    pub fn from_env() -> Result<Self, ConsoleError> {
        let raw_url =
            std::env::var("WARDEN_API_URL").unwrap_or_else(|_| "http://localhost:3000".into());
        let token = std::env::var("WARDEN_TOKEN")
            .map_err(|_| ConsoleError::Config("WARDEN_TOKEN must be set".into()))?;
        let request_timeout_secs = match std::env::var("REQUEST_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse().map_err(|_| {
                ConsoleError::Config("REQUEST_TIMEOUT_SECS must be a whole number".into())
            })?,
            Err(_) => 30,
        };
        Self::new(&raw_url, token, request_timeout_secs)
    }

    pub fn new(api_url: &str, token: String, request_timeout_secs: u64) -> Result<Self, ConsoleError> {
        let api_url = Url::parse(api_url)
            .map_err(|e| ConsoleError::Config(format!("WARDEN_API_URL is invalid: {e}")))?;
        if api_url.cannot_be_a_base() {
            return Err(ConsoleError::Config(format!(
                "WARDEN_API_URL cannot be a base URL: {api_url}"
            )));
        }
        if token.trim().is_empty() {
            return Err(ConsoleError::Config("WARDEN_TOKEN must not be empty".into()));
        }
        Ok(Self {
            api_url,
            token: token.trim().to_string(),
            request_timeout_secs,
        })
    }

    /// Absolute URL for an API path such as `/api/v1/me`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url.as_str().trim_end_matches('/'), path)
    }
}
