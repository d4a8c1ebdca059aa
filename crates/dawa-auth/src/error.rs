//! Authentication errors.

use dawa_cache::CacheError;
use dawa_commerce::checkout::ValidationErrors;
use dawa_data::FetchError;
use thiserror::Error;

use crate::CredentialField;

/// Authentication error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The form was rejected before any call was made.
    #[error("{0}")]
    Invalid(ValidationErrors<CredentialField>),

    /// Invalid credentials provided.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Sign-up was refused by the server.
    #[error("Failed to sign up: {0}")]
    SignupRejected(String),

    /// An operation needed a signed-in shopper.
    #[error("not signed in")]
    NotAuthenticated,

    /// The persisted session could not be read or written.
    #[error("session storage error: {0}")]
    Storage(#[from] CacheError),

    /// Transport or server error.
    #[error(transparent)]
    Api(#[from] FetchError),
}

impl AuthError {
    /// Check if this is an authentication failure.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials | AuthError::NotAuthenticated
        ) || matches!(self, AuthError::Api(e) if e.status() == Some(401))
    }
}
