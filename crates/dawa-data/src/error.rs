//! HTTP client error types.

use thiserror::Error;

/// Errors that can occur when talking to the storefront API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Failed to send the request.
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Could not reach the server.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP error response without a readable error envelope.
    #[error("HTTP {status}: {message}")]
    HttpError { status: u16, message: String },

    /// The API answered with `status: "error"`.
    #[error("{message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// A 401 that token refresh could not fix, on a public resource.
    #[error("Not authenticated")]
    Unauthorized,

    /// A 401 that token refresh could not fix, on a protected resource.
    #[error("Please log in to continue ({path})")]
    LoginRequired { path: String },

    /// Failed to parse response body.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Request timeout.
    #[error("Request timed out")]
    Timeout,

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(String),
}

impl FetchError {
    /// HTTP status, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::HttpError { status, .. } | FetchError::Api { status, .. } => Some(*status),
            FetchError::Unauthorized | FetchError::LoginRequired { .. } => Some(401),
            _ => None,
        }
    }

    /// Server-provided error code, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            FetchError::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Whether the front-end should send the shopper to the login screen.
    pub fn requires_login(&self) -> bool {
        matches!(self, FetchError::LoginRequired { .. })
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::JsonError(e.to_string())
    }
}

impl From<url::ParseError> for FetchError {
    fn from(e: url::ParseError) -> Self {
        FetchError::InvalidUrl(e.to_string())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::Connection(err.to_string())
        } else if err.is_builder() {
            FetchError::InvalidUrl(err.to_string())
        } else {
            FetchError::RequestError(err.to_string())
        }
    }
}
