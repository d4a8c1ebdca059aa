//! Authenticated API client.

use crate::{FetchError, Method, RequestBuilder, Response, RetryPolicy, Transport};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

/// Endpoint that exchanges a refresh token for a new access token.
pub const REFRESH_PATH: &str = "/api/auth/refresh";

/// Login, signup, logout and refresh live here. A 401 from these is an answer
/// about the credentials sent, not about the stored session.
const AUTH_PATH_PREFIX: &str = "/api/auth/";

/// Paths whose 401s send the shopper back to the login screen.
pub const DEFAULT_PROTECTED_PATHS: [&str; 3] = ["/orders", "/checkout", "/profile"];

/// Where the client reads and writes the session's tokens.
pub trait TokenStore: Send + Sync {
    fn access_token(&self) -> Option<String>;

    fn refresh_token(&self) -> Option<String>;

    /// Store a refreshed token pair. `refresh` is `None` when the server
    /// keeps the old refresh token valid.
    fn update_tokens(&self, access: String, refresh: Option<String>);

    /// Forget the session.
    fn clear(&self);
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Client for the storefront REST API.
///
/// Every request carries the current bearer token. A 401 triggers one token
/// refresh and one retry; if that does not help the session is cleared and
/// requests to protected paths fail with [`FetchError::LoginRequired`].
#[derive(Clone)]
pub struct ApiClient {
    base: Url,
    transport: Arc<dyn Transport>,
    tokens: Option<Arc<dyn TokenStore>>,
    retry: RetryPolicy,
    protected: Vec<String>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.base.as_str())
            .field("authenticated", &self.tokens.is_some())
            .field("retry", &self.retry)
            .finish()
    }
}

impl ApiClient {
    /// Create a client for `base_url`.
    pub fn new(base_url: &str, transport: Arc<dyn Transport>) -> Result<Self, FetchError> {
        let mut base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(base_url.to_string()));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            base,
            transport,
            tokens: None,
            retry: RetryPolicy::default(),
            protected: DEFAULT_PROTECTED_PATHS.iter().map(|p| p.to_string()).collect(),
        })
    }

    /// Attach the session's token store.
    pub fn with_tokens(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replace the protected path prefixes.
    pub fn with_protected_paths(mut self, paths: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.protected = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolve an API path such as `/orders?page=2` against the base URL.
    pub fn url(&self, path: &str) -> Result<Url, FetchError> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    /// Whether a 401 on `path` must send the shopper to the login screen.
    pub fn is_protected(&self, path: &str) -> bool {
        let path = normalize_path(path);
        self.protected.iter().any(|prefix| {
            path == *prefix
                || path
                    .strip_prefix(prefix.as_str())
                    .map(|rest| rest.starts_with('/'))
                    .unwrap_or(false)
        })
    }

    /// Start a request to `path`.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, FetchError> {
        Ok(RequestBuilder::new(method, self.url(path)?.as_str()).accept("application/json"))
    }

    /// GET `path` and unwrap the response envelope.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let request = self.request(Method::Get, path)?;
        self.send(path, request).await?.into_data()
    }

    /// POST a JSON body to `path` and unwrap the response envelope.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, FetchError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::Post, path)?.json(body)?;
        self.send(path, request).await?.into_data()
    }

    /// PATCH `path` without a body and unwrap the response envelope.
    pub async fn patch<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let request = self.request(Method::Patch, path)?;
        self.send(path, request).await?.into_data()
    }

    /// Send `request`, handling auth and retries.
    ///
    /// Returns the response unchanged unless it is a 401 that refresh could
    /// not fix. 401s from the auth endpoints are returned as-is and leave the
    /// stored session alone.
    pub async fn send(&self, path: &str, request: RequestBuilder) -> Result<Response, FetchError> {
        let response = self.send_with_retry(self.authorize(request.clone())).await?;
        if !response.is_unauthorized() {
            return Ok(response);
        }
        let Some(tokens) = &self.tokens else {
            return Ok(response);
        };
        if normalize_path(path).starts_with(AUTH_PATH_PREFIX) {
            return Ok(response);
        }

        tracing::debug!(path, "received 401, refreshing session");
        match self.refresh(tokens.as_ref()).await {
            Ok(access) => {
                let retried = self
                    .send_with_retry(request.bearer_auth(&access))
                    .await?;
                if !retried.is_unauthorized() {
                    return Ok(retried);
                }
                tracing::warn!(path, "still unauthorized after token refresh");
            }
            Err(e) => tracing::warn!(path, error = %e, "token refresh failed"),
        }

        tokens.clear();
        if self.is_protected(path) {
            Err(FetchError::LoginRequired {
                path: path.to_string(),
            })
        } else {
            Err(FetchError::Unauthorized)
        }
    }

    /// Refresh the session's tokens now instead of waiting for a 401.
    pub async fn refresh_session(&self) -> Result<(), FetchError> {
        let tokens = self.tokens.as_ref().ok_or(FetchError::Unauthorized)?;
        self.refresh(tokens.as_ref()).await.map(|_| ())
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.tokens.as_ref().and_then(|t| t.access_token()) {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn refresh(&self, tokens: &dyn TokenStore) -> Result<String, FetchError> {
        let refresh_token = tokens.refresh_token().ok_or(FetchError::Unauthorized)?;
        let request = self
            .request(Method::Post, REFRESH_PATH)?
            .json(&RefreshRequest {
                refresh_token: &refresh_token,
            })?;
        let refreshed: RefreshResponse = self.transport.send(request).await?.into_data()?;
        tokens.update_tokens(refreshed.access_token.clone(), refreshed.refresh_token);
        Ok(refreshed.access_token)
    }

    async fn send_with_retry(&self, request: RequestBuilder) -> Result<Response, FetchError> {
        let method = request.method();
        let mut attempt = 0;
        loop {
            let result = match self.transport.send(request.clone()).await {
                Ok(resp) if resp.is_server_error() => Err(resp.into_error()),
                other => other,
            };
            match result {
                Ok(resp) => return Ok(resp),
                Err(e) if self.retry.should_retry(method, &e, attempt) => {
                    let delay = self.retry.backoff.delay_for_attempt(attempt);
                    tracing::debug!(url = request.url(), attempt, error = %e, ?delay, "retrying request");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Strip query and fragment and ensure a single leading slash.
fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    format!("/{}", path.trim_start_matches('/'))
}
