//! Calls to the `/api/auth` endpoints.

use crate::{AuthError, AuthSession, AuthStore, LoginRequest, SignupRequest, User};
use dawa_data::{ApiClient, FetchError, Method, Response, ServerResponse, TokenStore};
use serde::Serialize;
use std::sync::Arc;

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const SIGNUP_PATH: &str = "/api/auth/signup";
pub const LOGOUT_PATH: &str = "/api/auth/logout";

/// Read an auth payload that may or may not be wrapped in the usual envelope.
fn parse_session(response: Response) -> Result<AuthSession, FetchError> {
    if !response.is_success() {
        return Err(response.into_error());
    }
    let status = response.status;
    let value: serde_json::Value = response.json()?;
    if value.get("status").is_some() {
        let envelope: ServerResponse<AuthSession> = serde_json::from_value(value)?;
        envelope.into_result(status)
    } else {
        Ok(serde_json::from_value(value)?)
    }
}

/// Login, sign-up, logout and explicit token refresh.
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: ApiClient,
    store: Arc<AuthStore>,
}

impl AuthApi {
    /// `client` should already carry `store` as its token store.
    pub fn new(client: ApiClient, store: Arc<AuthStore>) -> Self {
        Self { client, store }
    }

    pub fn store(&self) -> &AuthStore {
        &self.store
    }

    async fn post_session<B: Serialize>(&self, path: &str, body: &B) -> Result<AuthSession, FetchError> {
        let request = self.client.request(Method::Post, path)?.json(body)?;
        parse_session(self.client.send(path, request).await?)
    }

    /// Sign in and persist the session.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let request = LoginRequest::new(email, password).map_err(AuthError::Invalid)?;
        let session = match self.post_session(LOGIN_PATH, &request).await {
            Ok(session) => session,
            Err(e) if matches!(e.status(), Some(400 | 401 | 403)) => {
                tracing::info!(email = request.email(), "login rejected");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(e.into()),
        };
        let user = session.user.clone();
        self.store.sign_in(session)?;
        Ok(user)
    }

    /// Create an account and sign in with it.
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<User, AuthError> {
        let request = SignupRequest::new(name, email, password).map_err(AuthError::Invalid)?;
        let session = match self.post_session(SIGNUP_PATH, &request).await {
            Ok(session) => session,
            Err(FetchError::Api { message, .. }) => return Err(AuthError::SignupRejected(message)),
            Err(e) if matches!(e.status(), Some(400..=499)) => {
                return Err(AuthError::SignupRejected(e.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let user = session.user.clone();
        self.store.sign_in(session)?;
        Ok(user)
    }

    /// Tell the server, then forget the session locally whatever it answered.
    pub async fn logout(&self) -> Result<(), AuthError> {
        if self.store.is_authenticated() {
            let result = async {
                let request = self
                    .client
                    .request(Method::Post, LOGOUT_PATH)?
                    .json(&serde_json::json!({}))?;
                self.client.send(LOGOUT_PATH, request).await
            }
            .await;
            match result {
                Ok(resp) if resp.is_success() => {}
                Ok(resp) => tracing::warn!(status = resp.status, "logout rejected by server"),
                Err(e) => tracing::warn!(error = %e, "logout failed"),
            }
        }
        self.store.sign_out()?;
        Ok(())
    }

    /// Exchange the stored refresh token for new tokens now.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        if self.store.refresh_token().is_none() {
            return Err(AuthError::NotAuthenticated);
        }
        self.client.refresh_session().await?;
        tracing::debug!("session refreshed");
        Ok(())
    }
}
